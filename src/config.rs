//! The deploy configuration consumed by every migration step
//!
//! The configuration is an explicit, immutable struct loaded from a JSON file
//! whose keys match the original `config/config.json` layout. It is validated
//! once at process start so that missing or nonsensical values fail before the
//! first chain call rather than partway through a run.

use std::{fs, path::Path, str::FromStr};

use alloy_primitives::Address;
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer};

use crate::errors::ScriptError;

/// The full deploy configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DeployConfig {
    // --- token & market addresses ---
    /// The USDC token address
    pub usdc: Address,
    /// The WETH token address
    pub weth: Address,
    /// The DAI token address
    pub dai: Address,
    /// The Aave-wrapped USDC token address
    pub usdc_aave: Address,
    /// The Aave-wrapped DAI token address
    pub dai_aave: Address,
    /// The Aave lending pool address
    pub aave_lending_pool: Address,
    /// The Compound comptroller address
    pub compound_comptroller: Address,
    /// The Compound USDC market address
    pub compound_usdc: Address,
    /// The Compound DAI market address
    pub compound_dai: Address,

    // --- pre-existing deployments (attach instead of deploy when set) ---
    /// The future token factory address, if already deployed
    #[serde(default, deserialize_with = "optional_address_field")]
    pub future_token_factory: Option<Address>,
    /// The future exchange router address, if already deployed
    #[serde(default, deserialize_with = "optional_address_field")]
    pub future_exchange_router: Option<Address>,
    /// The converter address, if already deployed
    #[serde(default, deserialize_with = "optional_address_field")]
    pub converter: Option<Address>,
    /// The lending contract address, if already deployed
    #[serde(default, deserialize_with = "optional_address_field")]
    pub lending: Option<Address>,
    /// The Janex contract address, if already deployed
    #[serde(default, deserialize_with = "optional_address_field")]
    pub janex: Option<Address>,

    // --- constructor collaborators (default to the deployer when unset) ---
    /// The admin account for the lending and Janex contracts
    #[serde(default, deserialize_with = "optional_address_field")]
    pub admin_address: Option<Address>,
    /// The provider account for the lending contract
    #[serde(default, deserialize_with = "optional_address_field")]
    pub provider_address: Option<Address>,
    /// The trading service account for the Janex contract
    #[serde(default, deserialize_with = "optional_address_field")]
    pub trading_service: Option<Address>,

    /// The spot exchanges to register with the Janex contract, in order
    #[serde(default)]
    pub exchanges: Vec<Address>,

    // --- feature toggles ---
    /// Whether to seed WETH-USDC liquidity on the exchange router
    #[serde(default)]
    pub do_add_liquidity: bool,
    /// Whether to send DAI collateral to the lending markets
    #[serde(default)]
    pub do_send_collateral: bool,
    /// Whether to fund the converter with USDC
    #[serde(default)]
    pub do_send_converter: bool,
    /// Whether to deposit USDC into the Janex contract
    #[serde(default)]
    pub do_deposit: bool,
    /// Whether to configure the trading and lending fees
    #[serde(default)]
    pub do_set_fee: bool,

    // --- amounts, in human units (scaled by token decimals before use) ---
    /// The WETH half of the seeded liquidity
    #[serde(default)]
    pub weth_liquidity: Decimal,
    /// The USDC half of the seeded liquidity
    #[serde(default)]
    pub usdc_liquidity: Decimal,
    /// The DAI collateral sent to the Compound market
    #[serde(default)]
    pub dai_collateral: Decimal,
    /// The Aave-DAI collateral sent to the Aave market
    #[serde(default)]
    pub dai_aave_collateral: Decimal,
    /// The USDC amount transferred to the converter
    #[serde(default)]
    pub usdc_converter: Decimal,
    /// The Aave-USDC amount transferred to the converter
    #[serde(default)]
    pub usdc_aave_converter: Decimal,
    /// The USDC amount deposited into the Janex contract
    #[serde(default)]
    pub usdc_deposit: Decimal,
    /// The trading fee, denominated in ETH
    #[serde(default)]
    pub fee_trading: Decimal,
    /// The lending fee, denominated in ETH
    #[serde(default)]
    pub fee_lending: Decimal,

    /// The expiry date (unix seconds) for seeded futures; defaults to
    /// 30 days from now when unset
    #[serde(default)]
    pub future_expiry_date: Option<u64>,
}

impl DeployConfig {
    /// Load and validate the deploy configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let contents =
            fs::read_to_string(path).map_err(|e| ScriptError::ReadFile(e.to_string()))?;
        Self::parse(&contents)
    }

    /// Parse and validate the deploy configuration from a JSON document
    pub fn parse(contents: &str) -> Result<Self, ScriptError> {
        let config: DeployConfig = serde_json::from_str(contents)
            .map_err(|e| ScriptError::ConfigValidation(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values that would otherwise fail midway
    /// through a run
    fn validate(&self) -> Result<(), ScriptError> {
        let amounts = [
            ("WETH_LIQUIDITY", self.weth_liquidity),
            ("USDC_LIQUIDITY", self.usdc_liquidity),
            ("DAI_COLLATERAL", self.dai_collateral),
            ("DAI_AAVE_COLLATERAL", self.dai_aave_collateral),
            ("USDC_CONVERTER", self.usdc_converter),
            ("USDC_AAVE_CONVERTER", self.usdc_aave_converter),
            ("USDC_DEPOSIT", self.usdc_deposit),
            ("FEE_TRADING", self.fee_trading),
            ("FEE_LENDING", self.fee_lending),
        ];
        for (key, amount) in amounts {
            if amount.is_sign_negative() {
                return Err(ScriptError::ConfigValidation(format!(
                    "{} must not be negative",
                    key
                )));
            }
        }

        if self.do_add_liquidity
            && (self.weth_liquidity.is_zero() || self.usdc_liquidity.is_zero())
        {
            return Err(ScriptError::ConfigValidation(
                "DO_ADD_LIQUIDITY requires WETH_LIQUIDITY and USDC_LIQUIDITY".to_string(),
            ));
        }

        if self.do_deposit && self.usdc_deposit.is_zero() {
            return Err(ScriptError::ConfigValidation(
                "DO_DEPOSIT requires USDC_DEPOSIT".to_string(),
            ));
        }

        if self.future_expiry_date == Some(0) {
            return Err(ScriptError::ConfigValidation(
                "FUTURE_EXPIRY_DATE must be a positive unix timestamp".to_string(),
            ));
        }

        Ok(())
    }
}

/// Deserialize an optional address field, treating a missing key, `null` and
/// the empty string all as "not configured"
fn optional_address_field<'de, D>(deserializer: D) -> Result<Option<Address>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(value) => Address::from_str(value)
            .map(Some)
            .map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// A configuration mirroring the original `config.json` layout
    const FULL_CONFIG: &str = r#"{
        "USDC": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
        "WETH": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
        "DAI": "0x6B175474E89094C44Da98b954EedeAC495271d0F",
        "USDC_AAVE": "0xBcca60bB61934080951369a648Fb03DF4F96263C",
        "DAI_AAVE": "0x028171bCA77440897B824Ca71D1c56caC55b68A3",
        "AAVE_LENDING_POOL": "0x7d2768dE32b0b80b7a3454c06BdAc94A69DDc7A9",
        "COMPOUND_COMPTROLLER": "0x3d9819210A31b4961b30EF54bE2aeD79B9c9Cd3B",
        "COMPOUND_USDC": "0x39AA39c021dfbaE8faC545936693aC917d5E7563",
        "COMPOUND_DAI": "0x5d3a536E4D6DbD6114cc1Ead35777bAB948E3643",
        "FUTURE_TOKEN_FACTORY": "",
        "FUTURE_EXCHANGE_ROUTER": "",
        "LENDING": "",
        "CONVERTER": "",
        "JANEX": "",
        "ADMIN_ADDRESS": "0x1111111111111111111111111111111111111111",
        "TRADING_SERVICE": "",
        "EXCHANGES": ["0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D"],
        "DO_ADD_LIQUIDITY": true,
        "DO_SEND_COLLATERAL": false,
        "DO_SEND_CONVERTER": false,
        "DO_DEPOSIT": false,
        "DO_SET_FEE": true,
        "WETH_LIQUIDITY": 1,
        "USDC_LIQUIDITY": 2500,
        "DAI_COLLATERAL": 0,
        "DAI_AAVE_COLLATERAL": 0,
        "USDC_CONVERTER": 0,
        "USDC_AAVE_CONVERTER": 0,
        "USDC_DEPOSIT": 0,
        "FEE_TRADING": 0.005,
        "FEE_LENDING": 0.01
    }"#;

    #[test]
    fn parses_full_config() {
        let config = DeployConfig::parse(FULL_CONFIG).unwrap();
        assert_eq!(
            config.usdc,
            Address::from_str("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48").unwrap()
        );
        assert!(config.do_add_liquidity);
        assert!(!config.do_deposit);
        assert_eq!(config.weth_liquidity, dec!(1));
        assert_eq!(config.usdc_liquidity, dec!(2500));
        assert_eq!(config.fee_trading, dec!(0.005));
        assert_eq!(config.exchanges.len(), 1);
        assert_eq!(config.future_expiry_date, None);
    }

    #[test]
    fn empty_string_addresses_are_unset() {
        let config = DeployConfig::parse(FULL_CONFIG).unwrap();
        assert_eq!(config.future_token_factory, None);
        assert_eq!(config.janex, None);
        assert_eq!(config.trading_service, None);
        assert_eq!(
            config.admin_address,
            Some(Address::from_str("0x1111111111111111111111111111111111111111").unwrap())
        );
    }

    #[test]
    fn missing_required_key_fails() {
        let without_usdc = FULL_CONFIG.replacen("\"USDC\"", "\"USDX\"", 1);
        assert!(matches!(
            DeployConfig::parse(&without_usdc),
            Err(ScriptError::ConfigValidation(_))
        ));
    }

    #[test]
    fn negative_amount_fails_validation() {
        let negative = FULL_CONFIG.replace("\"USDC_DEPOSIT\": 0", "\"USDC_DEPOSIT\": -5");
        let err = DeployConfig::parse(&negative).unwrap_err();
        assert!(err.to_string().contains("USDC_DEPOSIT"));
    }

    #[test]
    fn liquidity_toggle_requires_amounts() {
        let zeroed = FULL_CONFIG.replace("\"WETH_LIQUIDITY\": 1", "\"WETH_LIQUIDITY\": 0");
        let err = DeployConfig::parse(&zeroed).unwrap_err();
        assert!(err.to_string().contains("DO_ADD_LIQUIDITY"));
    }

    #[test]
    fn deposit_toggle_requires_amount() {
        let with_deposit = FULL_CONFIG.replace("\"DO_DEPOSIT\": false", "\"DO_DEPOSIT\": true");
        assert!(matches!(
            DeployConfig::parse(&with_deposit),
            Err(ScriptError::ConfigValidation(_))
        ));
    }

    #[test]
    fn toggles_default_to_off() {
        let trimmed = FULL_CONFIG.replace("\"DO_ADD_LIQUIDITY\": true", "\"DO_ADD_LIQUIDITY\": false");
        let config = DeployConfig::parse(&trimmed).unwrap();
        assert!(!config.do_add_liquidity);
        assert!(!config.do_send_collateral);
        assert!(!config.do_send_converter);
    }

    #[test]
    fn zero_expiry_date_is_rejected() {
        let with_expiry =
            FULL_CONFIG.replacen("{", "{\n\"FUTURE_EXPIRY_DATE\": 0,", 1);
        assert!(matches!(
            DeployConfig::parse(&with_expiry),
            Err(ScriptError::ConfigValidation(_))
        ));
    }

    #[test]
    fn explicit_expiry_date_is_kept() {
        let with_expiry =
            FULL_CONFIG.replacen("{", "{\n\"FUTURE_EXPIRY_DATE\": 1735689600,", 1);
        let config = DeployConfig::parse(&with_expiry).unwrap();
        assert_eq!(config.future_expiry_date, Some(1735689600));
    }
}
