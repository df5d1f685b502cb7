//! Utilities for the deploy scripts

use std::{
    fs::{self, File},
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

use alloy::{
    network::TransactionBuilder,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use alloy_primitives::{Address, U256};
use json::JsonValue;
use rust_decimal::Decimal;
use tracing::info;

use crate::{
    constants::{
        ARTIFACT_BYTECODE_KEY, ARTIFACT_EXTENSION, DEFAULT_EXPIRY_DAYS, DEPLOYMENTS_KEY,
        SECONDS_PER_DAY,
    },
    errors::ScriptError,
    networks::NetworkDescriptor,
    solidity::ERC20,
};

/// The client type with which all contract instances are instantiated
pub type Client = DynProvider;

/// Sets up the client used for every chain interaction in a run, returning it
/// alongside the deployer account address derived from the private key
pub fn setup_client(priv_key: &str, rpc_url: &str) -> Result<(Client, Address), ScriptError> {
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let owner = signer.address();

    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let provider = ProviderBuilder::new().wallet(signer).connect_http(url);

    Ok((DynProvider::new(provider), owner))
}

/// The contract resolver shared by all migration steps.
///
/// Given a configured address it attaches without further validation; given
/// none it submits a single deployment transaction using the creation bytecode
/// from the compiled artifact and records the resulting address in the
/// deployments file. Either way the returned address is canonical for the
/// rest of the run.
pub struct Deployer {
    /// The client used for deployment transactions
    client: Client,
    /// The deployer account, used as the default owner/admin collaborator
    owner: Address,
    /// The number of confirmations to await after each transaction
    confirmations: u64,
    /// The gas price (in wei) pinned by the deployment target, if any
    gas_price: Option<u128>,
    /// The gas limit pinned by the deployment target, if any
    gas_limit: Option<u64>,
    /// The directory holding compiled contract artifacts
    artifacts_path: String,
    /// The path of the `deployments.json` file
    deployments_path: String,
}

impl Deployer {
    /// Create a deployer bound to a client and a deployment target
    pub fn new(
        client: Client,
        owner: Address,
        network: &NetworkDescriptor,
        artifacts_path: String,
        deployments_path: String,
    ) -> Self {
        Self {
            client,
            owner,
            confirmations: network.confirmations,
            gas_price: network.gas_price,
            gas_limit: network.gas_limit,
            artifacts_path,
            deployments_path,
        }
    }

    /// A clone of the underlying client, for instantiating contract handles
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// The deployer account address
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// The number of confirmations awaited after each transaction
    pub fn confirmations(&self) -> u64 {
        self.confirmations
    }

    /// The path of the `deployments.json` file
    pub fn deployments_path(&self) -> &str {
        &self.deployments_path
    }

    /// Attach to `fixed` if configured, otherwise deploy a fresh instance of
    /// the named contract with the given constructor calldata
    pub async fn resolve(
        &self,
        contract_name: &str,
        contract_key: &str,
        fixed: Option<Address>,
        constructor_calldata: Vec<u8>,
    ) -> Result<Address, ScriptError> {
        if let Some(address) = fixed {
            return Ok(address);
        }

        let mut code = read_artifact_bytecode(&self.artifacts_path, contract_name)?;
        code.extend(constructor_calldata);

        let mut tx = TransactionRequest::default().with_deploy_code(code);
        if let Some(gas_price) = self.gas_price {
            tx = tx.with_gas_price(gas_price);
        }
        if let Some(gas_limit) = self.gas_limit {
            tx = tx.with_gas_limit(gas_limit);
        }

        let receipt = self
            .client
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?
            .with_required_confirmations(self.confirmations)
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

        let address = receipt.contract_address.ok_or_else(|| {
            ScriptError::ContractDeployment(format!(
                "deployment receipt for {} carries no contract address",
                contract_name
            ))
        })?;

        write_deployed_address(&self.deployments_path, contract_key, address)?;

        Ok(address)
    }
}

/// Ensure `allowance(owner, spender) >= required`, submitting an approval for
/// the call site's fixed ceiling when the current allowance is strictly
/// insufficient. The allowance is not re-read after approving.
#[allow(clippy::too_many_arguments)]
pub async fn ensure_allowance(
    token: &ERC20::ERC20Instance<Client>,
    token_name: &str,
    owner: Address,
    spender: Address,
    spender_name: &str,
    required: U256,
    approval_ceiling: U256,
    confirmations: u64,
) -> Result<(), ScriptError> {
    let current = token
        .allowance(owner, spender)
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    if needs_approval(current, required) {
        token
            .approve(spender, approval_ceiling)
            .send()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
            .with_required_confirmations(confirmations)
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        info!("Done - Approve {} for {}", token_name, spender_name);
    }

    Ok(())
}

/// Whether an approval must be submitted before a transfer-dependent call
pub fn needs_approval(current: U256, required: U256) -> bool {
    current < required
}

/// Map the on-chain zero-address sentinel to an explicit `None`
pub fn optional_address(address: Address) -> Option<Address> {
    (address != Address::ZERO).then_some(address)
}

/// Scale a human-unit amount to token base units, truncating any precision
/// beyond the token's declared decimals
pub fn to_token_units(amount: Decimal, decimals: u32) -> Result<U256, ScriptError> {
    if amount.is_sign_negative() {
        return Err(ScriptError::CalldataConstruction(format!(
            "cannot scale negative amount {}",
            amount
        )));
    }

    let scaled = amount
        .checked_mul(Decimal::from(10u64.pow(decimals)))
        .ok_or_else(|| {
            ScriptError::CalldataConstruction(format!(
                "amount {} overflows at {} decimals",
                amount, decimals
            ))
        })?;

    U256::from_str(&scaled.trunc().to_string())
        .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))
}

/// The default future expiry relative to `now`: 30 whole days out
pub fn default_expiry(now: u64) -> u64 {
    now + DEFAULT_EXPIRY_DAYS * SECONDS_PER_DAY
}

/// The configured expiry date, or the default relative to the current time
pub fn expiry_or_default(configured: Option<u64>) -> u64 {
    configured.unwrap_or_else(|| {
        // Can `unwrap` here since the system clock is past the unix epoch
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        default_expiry(now)
    })
}

/// Parse a JSON file into a [`JsonValue`]
pub fn get_json_from_file(file_path: impl AsRef<Path>) -> Result<JsonValue, ScriptError> {
    let mut file_contents = String::new();
    File::open(file_path)
        .map_err(|e| ScriptError::ReadFile(e.to_string()))?
        .read_to_string(&mut file_contents)
        .map_err(|e| ScriptError::ReadFile(e.to_string()))?;

    json::parse(&file_contents).map_err(|e| ScriptError::ReadFile(e.to_string()))
}

/// Read the creation bytecode of the named contract from its compiled
/// artifact in the artifacts directory
pub fn read_artifact_bytecode(
    artifacts_path: &str,
    contract_name: &str,
) -> Result<Vec<u8>, ScriptError> {
    let artifact_path = PathBuf::from(artifacts_path)
        .join(contract_name)
        .with_extension(ARTIFACT_EXTENSION);
    let parsed_json = get_json_from_file(&artifact_path)
        .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;

    let bytecode_hex = parsed_json[ARTIFACT_BYTECODE_KEY].as_str().ok_or_else(|| {
        ScriptError::ArtifactParsing(format!(
            "artifact for {} carries no creation bytecode",
            contract_name
        ))
    })?;

    hex::decode(bytecode_hex.strip_prefix("0x").unwrap_or(bytecode_hex))
        .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))
}

/// Look up a contract address recorded in the deployments file
pub fn parse_addr_from_deployments_file(
    file_path: &str,
    contract_key: &str,
) -> Result<Address, ScriptError> {
    let parsed_json =
        get_json_from_file(file_path).map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;

    Address::from_str(
        parsed_json[DEPLOYMENTS_KEY][contract_key]
            .as_str()
            .ok_or_else(|| {
                ScriptError::ReadDeployments(format!(
                    "no address recorded under key {}",
                    contract_key
                ))
            })?,
    )
    .map_err(|e| ScriptError::ReadDeployments(e.to_string()))
}

/// Record a deployed contract address in the deployments file, creating the
/// file when it does not yet exist and preserving unrelated entries
pub fn write_deployed_address(
    file_path: &str,
    contract_key: &str,
    address: Address,
) -> Result<(), ScriptError> {
    // If the file doesn't exist, create it
    if !PathBuf::from(file_path).exists() {
        fs::write(file_path, "{}").map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
    }
    let mut parsed_json =
        get_json_from_file(file_path).map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;

    parsed_json[DEPLOYMENTS_KEY][contract_key] = JsonValue::String(format!("{address:#x}"));

    fs::write(file_path, json::stringify_pretty(parsed_json, 4))
        .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn scales_usdc_amounts() {
        assert_eq!(
            to_token_units(dec!(1), 6).unwrap(),
            U256::from(1_000_000u64)
        );
        assert_eq!(
            to_token_units(dec!(2500), 6).unwrap(),
            U256::from(2_500_000_000u64)
        );
    }

    #[test]
    fn scales_weth_amounts() {
        assert_eq!(
            to_token_units(dec!(0.5), 18).unwrap(),
            U256::from(500_000_000_000_000_000u64)
        );
    }

    #[test]
    fn scaling_truncates_beyond_token_precision() {
        assert_eq!(
            to_token_units(dec!(1.1234567), 6).unwrap(),
            U256::from(1_123_456u64)
        );
    }

    #[test]
    fn scaling_zero_is_zero() {
        assert_eq!(to_token_units(dec!(0), 18).unwrap(), U256::ZERO);
    }

    #[test]
    fn scaling_rejects_negative_amounts() {
        assert!(matches!(
            to_token_units(dec!(-1), 6),
            Err(ScriptError::CalldataConstruction(_))
        ));
    }

    #[test]
    fn approval_needed_iff_strictly_insufficient() {
        let required = U256::from(100u64);
        assert!(needs_approval(U256::from(99u64), required));
        assert!(!needs_approval(U256::from(100u64), required));
        assert!(!needs_approval(U256::from(101u64), required));
    }

    #[test]
    fn zero_address_is_unset() {
        assert_eq!(optional_address(Address::ZERO), None);

        let address = Address::from_str("0x1111111111111111111111111111111111111111").unwrap();
        assert_eq!(optional_address(address), Some(address));
    }

    #[test]
    fn default_expiry_is_thirty_whole_days_out() {
        assert_eq!(default_expiry(0), 30 * 86_400);
        assert_eq!(default_expiry(1_700_000_000), 1_700_000_000 + 2_592_000);
    }

    #[test]
    fn configured_expiry_passes_through() {
        assert_eq!(expiry_or_default(Some(1_735_689_600)), 1_735_689_600);
    }

    #[test]
    fn unset_expiry_defaults_relative_to_now() {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let expiry = expiry_or_default(None);
        assert!(expiry >= default_expiry(now));
        // Allow a little slack for the clock advancing between the two reads
        assert!(expiry <= default_expiry(now + 5));
    }

    #[test]
    fn deployments_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        let path = path.to_str().unwrap();

        let address = Address::from_str("0x2222222222222222222222222222222222222222").unwrap();
        write_deployed_address(path, "lending_contract", address).unwrap();

        assert_eq!(
            parse_addr_from_deployments_file(path, "lending_contract").unwrap(),
            address
        );
    }

    #[test]
    fn deployments_file_preserves_unrelated_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        let path = path.to_str().unwrap();

        let first = Address::from_str("0x3333333333333333333333333333333333333333").unwrap();
        let second = Address::from_str("0x4444444444444444444444444444444444444444").unwrap();
        write_deployed_address(path, "converter_contract", first).unwrap();
        write_deployed_address(path, "janex_contract", second).unwrap();

        assert_eq!(
            parse_addr_from_deployments_file(path, "converter_contract").unwrap(),
            first
        );
        assert_eq!(
            parse_addr_from_deployments_file(path, "janex_contract").unwrap(),
            second
        );
    }

    #[test]
    fn missing_deployment_key_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        fs::write(&path, "{}").unwrap();

        assert!(matches!(
            parse_addr_from_deployments_file(path.to_str().unwrap(), "lending_contract"),
            Err(ScriptError::ReadDeployments(_))
        ));
    }

    #[test]
    fn artifact_bytecode_parses_with_and_without_prefix() {
        let dir = tempfile::tempdir().unwrap();

        fs::write(
            dir.path().join("Prefixed.json"),
            r#"{"contractName": "Prefixed", "bytecode": "0x6080604052"}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("Bare.json"),
            r#"{"contractName": "Bare", "bytecode": "6080604052"}"#,
        )
        .unwrap();

        let artifacts = dir.path().to_str().unwrap();
        let expected = vec![0x60, 0x80, 0x60, 0x40, 0x52];
        assert_eq!(
            read_artifact_bytecode(artifacts, "Prefixed").unwrap(),
            expected
        );
        assert_eq!(read_artifact_bytecode(artifacts, "Bare").unwrap(), expected);
    }

    #[test]
    fn artifact_without_bytecode_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Headless.json"),
            r#"{"contractName": "Headless", "abi": []}"#,
        )
        .unwrap();

        assert!(matches!(
            read_artifact_bytecode(dir.path().to_str().unwrap(), "Headless"),
            Err(ScriptError::ArtifactParsing(_))
        ));
    }
}
