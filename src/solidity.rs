//! Definitions of Solidity functions called during deployment
//!
//! Only the external call surface consumed by the migration steps is declared
//! here; the contracts themselves are compiled and supplied as artifacts.

// The `sol!` expansion carries its own (partially undocumented) items
#![allow(missing_docs)]

use alloy::sol;

sol! {
    /// The factory that mints future tokens, wired to a single exchange
    #[sol(rpc)]
    contract FutureTokenFactory {
        constructor();
        function exchange() external view returns (address);
        function setExchange(address exchange) external;
    }

    /// The AMM router for future token pairs
    #[sol(rpc)]
    contract FutureExchangeRouter {
        constructor(address futureTokenFactory, address weth);
        function addLiquidityFuture(address tokenA, address tokenB, uint256 amountA, uint256 amountB, uint256 expiryDate, string memory symbol) external;
    }

    /// The stablecoin converter funded by the lending aggregator
    #[sol(rpc)]
    contract Converter {
        constructor();
    }

    /// The lending aggregator over the Aave and Compound markets
    #[sol(rpc)]
    contract Lending {
        constructor(address admin, address provider);
        function usdc() external view returns (address);
        function converter() external view returns (address);
        function initiate(address usdc, address dai, address usdcAave, address daiAave, address aaveLendingPool, address compoundComptroller, address compoundUsdc, address compoundDai) external;
        function setConverter(address converter) external;
        function sendCollateral(uint256 pool, address token, uint256 amount) external;
    }

    /// The core Janex trading contract
    #[sol(rpc)]
    contract Janex {
        constructor(address usdc, address weth, address tradingService, address admin);
        function isFutureExchange(address exchange) external view returns (bool);
        function addFutureExchange(address exchange) external;
        function isExchange(address exchange) external view returns (bool);
        function addExchange(address exchange) external;
        function lendingContract() external view returns (address);
        function setLending(address lending) external;
        function deposit(uint256 amount) external;
        function setFeeTradingByETH(uint256 fee) external;
        function setFeeLendingByEth(uint256 fee) external;
    }

    /// The standard token surface used for allowances, approvals and transfers
    #[sol(rpc)]
    contract ERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}
