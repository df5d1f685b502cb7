//! Named deployment targets and compiler settings
//!
//! These descriptors drive the outer deployment runner: they pick the RPC
//! endpoint, gas parameters and confirmation count for a run. The
//! reconciliation logic itself never consults them beyond what the CLI
//! resolves up front.

use crate::errors::ScriptError;

/// A named deployment target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkDescriptor {
    /// The name the target is selected by on the command line
    pub name: &'static str,
    /// The expected chain id, `None` to match any chain
    pub chain_id: Option<u64>,
    /// The default RPC endpoint for the target
    pub rpc_url: &'static str,
    /// The gas price (in wei) to use for deployment transactions, if pinned
    pub gas_price: Option<u128>,
    /// The gas limit to use for deployment transactions, if pinned
    pub gas_limit: Option<u64>,
    /// The number of confirmations to await after each transaction
    pub confirmations: u64,
    /// Whether the outer runner should skip its dry-run pass
    pub skip_dry_run: bool,
}

/// The solc configuration the contract artifacts are compiled with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolcSettings {
    /// The pinned compiler version
    pub version: &'static str,
    /// Whether the optimizer is enabled
    pub optimizer_enabled: bool,
    /// The optimizer run count
    pub optimizer_runs: u32,
}

/// The compiler settings used for every deployment target
pub const SOLC_SETTINGS: SolcSettings = SolcSettings {
    version: "0.8.0",
    optimizer_enabled: true,
    optimizer_runs: 200,
};

/// The deployment targets known to the scripts
pub const KNOWN_NETWORKS: [NetworkDescriptor; 9] = [
    NetworkDescriptor {
        name: "development",
        chain_id: None,
        rpc_url: "http://localhost:7545",
        gas_price: Some(1_000_000_000),
        gas_limit: None,
        confirmations: 1,
        skip_dry_run: false,
    },
    NetworkDescriptor {
        name: "localnet",
        chain_id: Some(7777),
        rpc_url: "http://127.0.0.1:8545",
        gas_price: Some(20_000_000_000),
        gas_limit: Some(7_700_000),
        confirmations: 1,
        skip_dry_run: true,
    },
    NetworkDescriptor {
        name: "mainnet",
        chain_id: Some(1),
        rpc_url: "https://mainnet.infura.io/v3/d9c7dc35d6a3442ab74338c9632800cb",
        gas_price: Some(8_000_000_000),
        gas_limit: None,
        confirmations: 1,
        skip_dry_run: false,
    },
    NetworkDescriptor {
        name: "ropsten",
        chain_id: Some(3),
        rpc_url: "https://ropsten.infura.io/v3/d9c7dc35d6a3442ab74338c9632800cb",
        gas_price: Some(8_000_000_000),
        gas_limit: None,
        confirmations: 1,
        skip_dry_run: true,
    },
    NetworkDescriptor {
        name: "rinkeby",
        chain_id: Some(4),
        rpc_url: "https://rinkeby.infura.io/v3/d9c7dc35d6a3442ab74338c9632800cb",
        gas_price: Some(8_000_000_000),
        gas_limit: None,
        confirmations: 1,
        skip_dry_run: false,
    },
    NetworkDescriptor {
        name: "goerli",
        chain_id: Some(5),
        rpc_url: "https://goerli.infura.io/v3/d9c7dc35d6a3442ab74338c9632800cb",
        gas_price: Some(8_000_000_000),
        gas_limit: None,
        confirmations: 1,
        skip_dry_run: true,
    },
    NetworkDescriptor {
        name: "kovan",
        chain_id: Some(42),
        rpc_url: "https://kovan.infura.io/v3/d9c7dc35d6a3442ab74338c9632800cb",
        gas_price: Some(8_000_000_000),
        gas_limit: None,
        confirmations: 1,
        skip_dry_run: true,
    },
    NetworkDescriptor {
        name: "bsc_test",
        chain_id: Some(97),
        rpc_url: "https://data-seed-prebsc-1-s1.binance.org:8545",
        gas_price: None,
        gas_limit: None,
        confirmations: 1,
        skip_dry_run: true,
    },
    NetworkDescriptor {
        name: "bsc_main",
        chain_id: Some(56),
        rpc_url: "https://bsc-dataseed1.binance.org",
        gas_price: None,
        gas_limit: None,
        confirmations: 1,
        skip_dry_run: true,
    },
];

/// Look up a deployment target by name
pub fn find_network(name: &str) -> Result<&'static NetworkDescriptor, ScriptError> {
    KNOWN_NETWORKS
        .iter()
        .find(|network| network.name == name)
        .ok_or_else(|| ScriptError::UnknownNetwork(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_mainnet_descriptor() {
        let network = find_network("mainnet").unwrap();
        assert_eq!(network.chain_id, Some(1));
        assert_eq!(network.gas_price, Some(8_000_000_000));
        assert!(!network.skip_dry_run);
    }

    #[test]
    fn finds_bsc_testnet_descriptor() {
        let network = find_network("bsc_test").unwrap();
        assert_eq!(network.chain_id, Some(97));
        assert_eq!(network.confirmations, 1);
        assert!(network.skip_dry_run);
    }

    #[test]
    fn localnet_pins_gas_parameters() {
        let network = find_network("localnet").unwrap();
        assert_eq!(network.gas_price, Some(20_000_000_000));
        assert_eq!(network.gas_limit, Some(7_700_000));
    }

    #[test]
    fn unknown_network_is_an_error() {
        assert!(matches!(
            find_network("arbitrum"),
            Err(ScriptError::UnknownNetwork(_))
        ));
    }

    #[test]
    fn all_networks_have_distinct_names() {
        for (i, a) in KNOWN_NETWORKS.iter().enumerate() {
            for b in &KNOWN_NETWORKS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn compiler_settings_are_pinned() {
        assert_eq!(SOLC_SETTINGS.version, "0.8.0");
        assert!(SOLC_SETTINGS.optimizer_enabled);
        assert_eq!(SOLC_SETTINGS.optimizer_runs, 200);
    }
}
