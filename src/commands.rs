//! Implementations of the migration steps
//!
//! Each step is an idempotent reconciliation over the on-chain linkage state:
//! read the current value, compare it to the desired one and mutate only when
//! they differ. The toggle-gated seeding blocks (liquidity, collateral,
//! converter funding, deposit, fees) are the exception: they carry no on-chain
//! idempotency check and repeat their effect when re-run with the toggle on.

use alloy_primitives::U256;
use alloy_sol_types::SolConstructor;
use tracing::info;

use crate::{
    config::DeployConfig,
    constants::{
        AAVE_POOL_ID, COMPOUND_POOL_ID, CONVERTER_CONTRACT_KEY, DAI_DECIMALS,
        DAI_LENDING_APPROVAL_CEILING, FEE_DECIMALS, FUTURE_EXCHANGE_ROUTER_CONTRACT_KEY,
        FUTURE_TOKEN_FACTORY_CONTRACT_KEY, JANEX_CONTRACT_KEY, LENDING_CONTRACT_KEY,
        USDC_DECIMALS, USDC_JANEX_APPROVAL_CEILING, USDC_ROUTER_APPROVAL_CEILING, WETH_DECIMALS,
        WETH_ROUTER_APPROVAL_CEILING,
    },
    errors::ScriptError,
    solidity::{Converter, FutureExchangeRouter, FutureTokenFactory, Janex, Lending, ERC20},
    utils::{
        ensure_allowance, expiry_or_default, optional_address, parse_addr_from_deployments_file,
        to_token_units, Deployer,
    },
};

/// Migration step 1: deploy the future token factory and exchange router,
/// wire them together and optionally seed WETH-USDC liquidity
pub async fn deploy_future_exchange(
    deployer: &Deployer,
    config: &DeployConfig,
) -> Result<(), ScriptError> {
    let factory_address = deployer
        .resolve(
            "FutureTokenFactory",
            FUTURE_TOKEN_FACTORY_CONTRACT_KEY,
            config.future_token_factory,
            FutureTokenFactory::constructorCall {}.abi_encode(),
        )
        .await?;

    let router_address = deployer
        .resolve(
            "FutureExchangeRouter",
            FUTURE_EXCHANGE_ROUTER_CONTRACT_KEY,
            config.future_exchange_router,
            FutureExchangeRouter::constructorCall {
                futureTokenFactory: factory_address,
                weth: config.weth,
            }
            .abi_encode(),
        )
        .await?;

    info!("Deployed Future Token Factory: {factory_address:#x}");
    info!("Deployed Future Exchange Router: {router_address:#x}");

    let factory = FutureTokenFactory::new(factory_address, deployer.client());
    let exchange = factory
        .exchange()
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
    if optional_address(exchange) != Some(router_address) {
        factory
            .setExchange(router_address)
            .send()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
            .with_required_confirmations(deployer.confirmations())
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        info!("Done - Set Exchange for Future Token Factory");
    }

    if config.do_add_liquidity {
        let weth_liquidity = to_token_units(config.weth_liquidity, WETH_DECIMALS)?;
        let weth = ERC20::new(config.weth, deployer.client());
        ensure_allowance(
            &weth,
            "WETH",
            deployer.owner(),
            router_address,
            "Future Exchange Router",
            weth_liquidity,
            U256::from(WETH_ROUTER_APPROVAL_CEILING),
            deployer.confirmations(),
        )
        .await?;

        let usdc_liquidity = to_token_units(config.usdc_liquidity, USDC_DECIMALS)?;
        let usdc = ERC20::new(config.usdc, deployer.client());
        ensure_allowance(
            &usdc,
            "USDC",
            deployer.owner(),
            router_address,
            "Future Exchange Router",
            usdc_liquidity,
            U256::from(USDC_ROUTER_APPROVAL_CEILING),
            deployer.confirmations(),
        )
        .await?;

        let expiry = expiry_or_default(config.future_expiry_date);
        let router = FutureExchangeRouter::new(router_address, deployer.client());
        router
            .addLiquidityFuture(
                config.weth,
                config.usdc,
                weth_liquidity,
                usdc_liquidity,
                U256::from(expiry),
                expiry.to_string(),
            )
            .send()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
            .with_required_confirmations(deployer.confirmations())
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        info!("Done - Add liquidity WETH-USDC-{expiry} for Future Exchange Router");
    }

    Ok(())
}

/// Migration step 2: deploy the converter and lending contracts, initiate the
/// lending markets, wire the converter in and optionally seed collateral and
/// converter funds
pub async fn deploy_lending(deployer: &Deployer, config: &DeployConfig) -> Result<(), ScriptError> {
    let converter_address = deployer
        .resolve(
            "Converter",
            CONVERTER_CONTRACT_KEY,
            config.converter,
            Converter::constructorCall {}.abi_encode(),
        )
        .await?;

    let admin = config.admin_address.unwrap_or(deployer.owner());
    let provider = config.provider_address.unwrap_or(deployer.owner());
    let lending_address = deployer
        .resolve(
            "Lending",
            LENDING_CONTRACT_KEY,
            config.lending,
            Lending::constructorCall { admin, provider }.abi_encode(),
        )
        .await?;

    info!("Deployed Converter contract: {converter_address:#x}");
    info!("Deployed Lending contract: {lending_address:#x}");

    let lending = Lending::new(lending_address, deployer.client());

    let usdc = lending
        .usdc()
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
    if optional_address(usdc).is_none() {
        lending
            .initiate(
                config.usdc,
                config.dai,
                config.usdc_aave,
                config.dai_aave,
                config.aave_lending_pool,
                config.compound_comptroller,
                config.compound_usdc,
                config.compound_dai,
            )
            .send()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
            .with_required_confirmations(deployer.confirmations())
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        info!("Done - Initiate Lending contract");
    }

    let converter = lending
        .converter()
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
    if optional_address(converter) != Some(converter_address) {
        lending
            .setConverter(converter_address)
            .send()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
            .with_required_confirmations(deployer.confirmations())
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        info!("Done - Set Converter for Lending contract");
    }

    if config.do_send_collateral {
        if config.dai_aave_collateral > rust_decimal::Decimal::ZERO {
            let dai_aave_collateral = to_token_units(config.dai_aave_collateral, DAI_DECIMALS)?;
            let dai_aave = ERC20::new(config.dai_aave, deployer.client());
            ensure_allowance(
                &dai_aave,
                "DAI AAVE",
                deployer.owner(),
                lending_address,
                "Lending",
                dai_aave_collateral,
                U256::from(DAI_LENDING_APPROVAL_CEILING),
                deployer.confirmations(),
            )
            .await?;

            lending
                .sendCollateral(U256::from(AAVE_POOL_ID), config.dai_aave, dai_aave_collateral)
                .send()
                .await
                .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
                .with_required_confirmations(deployer.confirmations())
                .get_receipt()
                .await
                .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
            info!("Done - Send DAI collateral to AAVE");
        }

        if config.dai_collateral > rust_decimal::Decimal::ZERO {
            let dai_collateral = to_token_units(config.dai_collateral, DAI_DECIMALS)?;
            let dai = ERC20::new(config.dai, deployer.client());
            ensure_allowance(
                &dai,
                "DAI",
                deployer.owner(),
                lending_address,
                "Lending",
                dai_collateral,
                U256::from(DAI_LENDING_APPROVAL_CEILING),
                deployer.confirmations(),
            )
            .await?;

            lending
                .sendCollateral(U256::from(COMPOUND_POOL_ID), config.dai, dai_collateral)
                .send()
                .await
                .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
                .with_required_confirmations(deployer.confirmations())
                .get_receipt()
                .await
                .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
            info!("Done - Send DAI collateral to Compound");
        }
    }

    if config.do_send_converter {
        if config.usdc_converter > rust_decimal::Decimal::ZERO {
            let usdc_convert = to_token_units(config.usdc_converter, USDC_DECIMALS)?;
            let usdc = ERC20::new(config.usdc, deployer.client());
            usdc.transfer(converter_address, usdc_convert)
                .send()
                .await
                .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
                .with_required_confirmations(deployer.confirmations())
                .get_receipt()
                .await
                .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
            info!("Done - Send USDC to Converter");
        }

        if config.usdc_aave_converter > rust_decimal::Decimal::ZERO {
            let usdc_aave_convert = to_token_units(config.usdc_aave_converter, USDC_DECIMALS)?;
            let usdc_aave = ERC20::new(config.usdc_aave, deployer.client());
            usdc_aave
                .transfer(converter_address, usdc_aave_convert)
                .send()
                .await
                .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
                .with_required_confirmations(deployer.confirmations())
                .get_receipt()
                .await
                .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
            info!("Done - Send USDC AAVE to Converter");
        }
    }

    Ok(())
}

/// Migration step 3: deploy the Janex trading contract, register the future
/// exchange router and spot exchanges, wire in the lending contract and
/// optionally deposit USDC and configure fees
pub async fn deploy_janex(deployer: &Deployer, config: &DeployConfig) -> Result<(), ScriptError> {
    let trading_service = config.trading_service.unwrap_or(deployer.owner());
    let admin = config.admin_address.unwrap_or(deployer.owner());
    let janex_address = deployer
        .resolve(
            "Janex",
            JANEX_CONTRACT_KEY,
            config.janex,
            Janex::constructorCall {
                usdc: config.usdc,
                weth: config.weth,
                tradingService: trading_service,
                admin,
            }
            .abi_encode(),
        )
        .await?;

    info!("Deployed Janex: {janex_address:#x}");

    let janex = Janex::new(janex_address, deployer.client());

    // The router comes from configuration or from an earlier step's record;
    // when neither exists the registration is skipped entirely
    let router_address = config.future_exchange_router.or_else(|| {
        parse_addr_from_deployments_file(
            deployer.deployments_path(),
            FUTURE_EXCHANGE_ROUTER_CONTRACT_KEY,
        )
        .ok()
    });
    if let Some(router_address) = router_address {
        let registered = janex
            .isFutureExchange(router_address)
            .call()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        if !registered {
            janex
                .addFutureExchange(router_address)
                .send()
                .await
                .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
                .with_required_confirmations(deployer.confirmations())
                .get_receipt()
                .await
                .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
            info!("Done - Add Future Exchange for Janex: {router_address:#x}");
        }
    }

    // One-directional sync: missing entries are added in list order, entries
    // no longer desired are never removed
    for &exchange in &config.exchanges {
        let registered = janex
            .isExchange(exchange)
            .call()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        if !registered {
            janex
                .addExchange(exchange)
                .send()
                .await
                .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
                .with_required_confirmations(deployer.confirmations())
                .get_receipt()
                .await
                .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
            info!("Done - Add Exchange for Janex: {exchange:#x}");
        }
    }

    let lending_address = match config.lending {
        Some(address) => address,
        None => parse_addr_from_deployments_file(deployer.deployments_path(), LENDING_CONTRACT_KEY)?,
    };
    let current_lending = janex
        .lendingContract()
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
    if optional_address(current_lending) != Some(lending_address) {
        janex
            .setLending(lending_address)
            .send()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
            .with_required_confirmations(deployer.confirmations())
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        info!("Done - Set Lending for Janex: {lending_address:#x}");
    }

    if config.do_deposit {
        let usdc_deposit = to_token_units(config.usdc_deposit, USDC_DECIMALS)?;
        let usdc = ERC20::new(config.usdc, deployer.client());
        ensure_allowance(
            &usdc,
            "USDC",
            deployer.owner(),
            janex_address,
            "Janex",
            usdc_deposit,
            U256::from(USDC_JANEX_APPROVAL_CEILING),
            deployer.confirmations(),
        )
        .await?;

        janex
            .deposit(usdc_deposit)
            .send()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
            .with_required_confirmations(deployer.confirmations())
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        info!("Done - Deposit USDC to Janex");
    }

    if config.do_set_fee {
        let fee_trading = to_token_units(config.fee_trading, FEE_DECIMALS)?;
        janex
            .setFeeTradingByETH(fee_trading)
            .send()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
            .with_required_confirmations(deployer.confirmations())
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        info!("Done - Set trading fee");

        let fee_lending = to_token_units(config.fee_lending, FEE_DECIMALS)?;
        janex
            .setFeeLendingByEth(fee_lending)
            .send()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
            .with_required_confirmations(deployer.confirmations())
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        info!("Done - Set lending fee");
    }

    Ok(())
}

/// Run all three migration steps in their numeric order
pub async fn deploy_all(deployer: &Deployer, config: &DeployConfig) -> Result<(), ScriptError> {
    deploy_future_exchange(deployer, config).await?;
    deploy_lending(deployer, config).await?;
    deploy_janex(deployer, config).await
}
