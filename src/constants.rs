//! Constants used in the deploy scripts

/// The number of decimals in the WETH token
pub const WETH_DECIMALS: u32 = 18;

/// The number of decimals in the USDC token (and its Aave-wrapped variant)
pub const USDC_DECIMALS: u32 = 6;

/// The number of decimals in the DAI token (and its Aave-wrapped variant)
pub const DAI_DECIMALS: u32 = 18;

/// The number of decimals used for ETH-denominated fee amounts
pub const FEE_DECIMALS: u32 = 18;

/// The WETH approval ceiling (in base units) granted to the exchange router
/// when the current allowance is insufficient: 10 WETH
pub const WETH_ROUTER_APPROVAL_CEILING: u128 = 10_000_000_000_000_000_000;

/// The USDC approval ceiling (in base units) granted to the exchange router
/// when the current allowance is insufficient: 10,000,000 USDC
pub const USDC_ROUTER_APPROVAL_CEILING: u128 = 10_000_000_000_000;

/// The DAI / Aave-DAI approval ceiling (in base units) granted to the lending
/// contract when the current allowance is insufficient: 1,000,000 DAI
pub const DAI_LENDING_APPROVAL_CEILING: u128 = 1_000_000_000_000_000_000_000_000;

/// The USDC approval ceiling (in base units) granted to the Janex contract
/// when the current allowance is insufficient: 1,000 USDC
pub const USDC_JANEX_APPROVAL_CEILING: u128 = 1_000_000_000;

/// The identifier of the Aave collateral pool in the lending contract
pub const AAVE_POOL_ID: u8 = 1;

/// The identifier of the Compound collateral pool in the lending contract
pub const COMPOUND_POOL_ID: u8 = 2;

/// The number of days a future runs for when no expiry date is configured
pub const DEFAULT_EXPIRY_DAYS: u64 = 30;

/// The number of seconds in a whole day
pub const SECONDS_PER_DAY: u64 = 86_400;

/// The deployments key in the `deployments.json` file
pub const DEPLOYMENTS_KEY: &str = "deployments";

/// The future token factory contract key in the `deployments.json` file
pub const FUTURE_TOKEN_FACTORY_CONTRACT_KEY: &str = "future_token_factory_contract";

/// The future exchange router contract key in the `deployments.json` file
pub const FUTURE_EXCHANGE_ROUTER_CONTRACT_KEY: &str = "future_exchange_router_contract";

/// The converter contract key in the `deployments.json` file
pub const CONVERTER_CONTRACT_KEY: &str = "converter_contract";

/// The lending contract key in the `deployments.json` file
pub const LENDING_CONTRACT_KEY: &str = "lending_contract";

/// The Janex contract key in the `deployments.json` file
pub const JANEX_CONTRACT_KEY: &str = "janex_contract";

/// The extension of compiled contract artifact files
pub const ARTIFACT_EXTENSION: &str = "json";

/// The bytecode key in a compiled contract artifact
pub const ARTIFACT_BYTECODE_KEY: &str = "bytecode";
