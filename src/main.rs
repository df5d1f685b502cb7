use clap::Parser;
use janex_scripts::{
    cli::Cli,
    config::DeployConfig,
    errors::ScriptError,
    networks::find_network,
    utils::{setup_client, Deployer},
};

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let Cli {
        priv_key,
        network,
        rpc_url,
        config_path,
        artifacts_path,
        deployments_path,
        command,
    } = Cli::parse();

    tracing_subscriber::fmt().pretty().init();

    let config = DeployConfig::load(&config_path)?;
    let target = find_network(&network)?;
    let rpc_url = rpc_url.unwrap_or_else(|| target.rpc_url.to_string());

    let (client, owner) = setup_client(&priv_key, &rpc_url)?;
    let deployer = Deployer::new(client, owner, target, artifacts_path, deployments_path);

    command.run(&deployer, &config).await
}
