//! Definitions of CLI arguments and commands for the deploy scripts

use clap::{Parser, Subcommand};

use crate::{
    commands::{deploy_all, deploy_future_exchange, deploy_janex, deploy_lending},
    config::DeployConfig,
    errors::ScriptError,
    utils::Deployer,
};

/// The deploy scripts CLI
#[derive(Parser)]
pub struct Cli {
    /// Private key of the deployer
    // TODO: Better key management
    #[arg(short, long, env = "DEPLOYER_PRIVATE_KEY")]
    pub priv_key: String,

    /// Named deployment target
    #[arg(short, long, default_value = "development")]
    pub network: String,

    /// Override the deployment target's RPC endpoint
    #[arg(short, long)]
    pub rpc_url: Option<String>,

    /// Path to the deploy configuration file
    #[arg(short, long, default_value = "config/config.json")]
    pub config_path: String,

    /// Path to the directory of compiled contract artifacts
    #[arg(short, long, default_value = "build/contracts")]
    pub artifacts_path: String,

    /// Path to the `deployments.json` file
    #[arg(short, long, default_value = "deployments.json")]
    pub deployments_path: String,

    /// The migration step to run
    #[command(subcommand)]
    pub command: Command,
}

/// The migration steps runnable from the CLI
#[derive(Subcommand)]
pub enum Command {
    /// Deploy the future token factory and exchange router, wire them
    /// together and optionally seed WETH-USDC liquidity
    DeployFutureExchange,
    /// Deploy the converter and lending contracts, initiate the lending
    /// markets and optionally seed collateral and converter funds
    DeployLending,
    /// Deploy the Janex trading contract, register its exchanges and lending
    /// contract and optionally deposit funds and configure fees
    DeployJanex,
    /// Run all three migration steps in order
    DeployAll,
}

impl Command {
    /// Run the selected migration step
    pub async fn run(
        self,
        deployer: &Deployer,
        config: &DeployConfig,
    ) -> Result<(), ScriptError> {
        match self {
            Command::DeployFutureExchange => deploy_future_exchange(deployer, config).await,
            Command::DeployLending => deploy_lending(deployer, config).await,
            Command::DeployJanex => deploy_janex(deployer, config).await,
            Command::DeployAll => deploy_all(deployer, config).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_deploy_all_with_defaults() {
        let cli = Cli::try_parse_from(["janex-deploy", "--priv-key", "0xdeadbeef", "deploy-all"])
            .unwrap();
        assert!(matches!(cli.command, Command::DeployAll));
        assert_eq!(cli.network, "development");
        assert_eq!(cli.config_path, "config/config.json");
        assert_eq!(cli.deployments_path, "deployments.json");
        assert_eq!(cli.rpc_url, None);
    }

    #[test]
    fn parses_single_step_with_overrides() {
        let cli = Cli::try_parse_from([
            "janex-deploy",
            "-p",
            "0xdeadbeef",
            "-n",
            "bsc_test",
            "-r",
            "http://localhost:8545",
            "deploy-lending",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::DeployLending));
        assert_eq!(cli.network, "bsc_test");
        assert_eq!(cli.rpc_url.as_deref(), Some("http://localhost:8545"));
    }

    #[test]
    fn missing_command_is_an_error() {
        assert!(Cli::try_parse_from(["janex-deploy", "-p", "0xdeadbeef"]).is_err());
    }
}
