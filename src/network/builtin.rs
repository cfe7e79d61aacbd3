//! Built-in network table.

use std::collections::BTreeMap;

use alloy::primitives::{address, Address};

use crate::network::types::{ChainId, NativeToken, NetworkDescriptor, TokenDescriptor};

/// Aggregation router v5, deployed at the same address on every supported chain.
pub const AGGREGATOR_ROUTER: Address = address!("1111111254eeb25477b68fb85ed929f73a960582");

const KYBER_QUOTER: Address = address!("4d47fd5a29904Dae0Ef51b1c450C9750F15D7856");
const KYBER_ROUTER: Address = address!("F9c2b5746c946EF883ab2660BbbB1f10A5bdeAb4");

/// Keys of every built-in network, in registry order.
pub fn network_keys() -> [&'static str; 4] {
    ["ethereum", "optimism", "arbitrum", "bsc"]
}

/// All built-in networks.
pub fn networks() -> Vec<NetworkDescriptor> {
    vec![ethereum(), optimism(), arbitrum(), bsc()]
}

fn tokens(network: &str, list: &[(&str, &str, u8, Address)]) -> BTreeMap<String, TokenDescriptor> {
    list.iter()
        .map(|(symbol, name, decimals, address)| {
            (
                symbol.to_string(),
                TokenDescriptor {
                    address: *address,
                    symbol: symbol.to_string(),
                    name: name.to_string(),
                    decimals: *decimals,
                    is_custom: false,
                    network: network.to_string(),
                },
            )
        })
        .collect()
}

fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|u| u.to_string()).collect()
}

fn ethereum() -> NetworkDescriptor {
    NetworkDescriptor {
        key: "ethereum".into(),
        chain_id: ChainId(1),
        name: "Ethereum".into(),
        primary_endpoint: "https://eth.llamarpc.com".into(),
        backup_endpoints: urls(&[
            "https://rpc.ankr.com/eth",
            "https://ethereum.publicnode.com",
            "https://eth-mainnet.g.alchemy.com/v2/demo",
            "https://cloudflare-eth.com",
        ]),
        native_token: NativeToken {
            symbol: "ETH".into(),
            name: "Ethereum".into(),
            decimals: 18,
        },
        known_tokens: tokens(
            "ethereum",
            &[
                ("ETH", "Ethereum", 18, Address::ZERO),
                ("USDC", "USD Coin", 6, address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48")),
                ("USDT", "Tether", 6, address!("dAC17F958D2ee523a2206206994597C13D831ec7")),
                ("DAI", "Dai Stablecoin", 18, address!("6B175474E89094C44Da98b954EedeAC495271d0F")),
                ("WBTC", "Wrapped Bitcoin", 8, address!("2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599")),
                ("UNI", "Uniswap", 18, address!("1f9840a85d5aF5bf1D1762F925BDADdC4201F984")),
                ("LINK", "Chainlink", 18, address!("514910771AF9Ca656af840dff83E8264EcF986CA")),
            ],
        ),
        router_address: address!("C1e7dFE73E1598E3910F99b5a5c3e4c5A0A4a7f9"),
        quoter_address: address!("0D125c15D54cA1F8a813C74A81aEe34ebB508C1f"),
        aggregator_router: AGGREGATOR_ROUTER,
        multicall_address: address!("eefBa1e63905eF1D7ACbA5a8513c70307C1cE441"),
        explorer_url: "https://etherscan.io".into(),
        average_block_time_secs: 13,
    }
}

fn optimism() -> NetworkDescriptor {
    NetworkDescriptor {
        key: "optimism".into(),
        chain_id: ChainId(10),
        name: "Optimism".into(),
        primary_endpoint: "https://mainnet.optimism.io".into(),
        backup_endpoints: urls(&[
            "https://optimism.publicnode.com",
            "https://rpc.ankr.com/optimism",
            "https://optimism-mainnet.public.blastapi.io",
            "https://optimism.llamarpc.com",
            "https://optimism.blockpi.network/v1/rpc/public",
            "https://optimism-rpc.publicnode.com",
            "https://optimism.drpc.org",
        ]),
        native_token: NativeToken {
            symbol: "ETH".into(),
            name: "Ethereum".into(),
            decimals: 18,
        },
        known_tokens: tokens(
            "optimism",
            &[
                ("ETH", "Ethereum", 18, Address::ZERO),
                ("USDC", "USD Coin", 6, address!("0b2C639c533813f4Aa9D7837CAf62653d097Ff85")),
                ("USDT", "Tether", 6, address!("94b008aA00579c1307B0EF2c499aD98a8ce58e58")),
                ("DAI", "Dai Stablecoin", 18, address!("DA10009cBd5D07dd0CeCc66161FC93D7c9000da1")),
                ("WBTC", "Wrapped Bitcoin", 8, address!("68f180fcCe6836688e9084f035309E29Bf0A2095")),
                ("OP", "Optimism", 18, address!("4200000000000000000000000000000000000042")),
            ],
        ),
        router_address: KYBER_ROUTER,
        quoter_address: KYBER_QUOTER,
        aggregator_router: AGGREGATOR_ROUTER,
        multicall_address: address!("D9bfE9979e9CA4b2fe84bA5d4Cf963bBcB376974"),
        explorer_url: "https://optimistic.etherscan.io".into(),
        average_block_time_secs: 2,
    }
}

fn arbitrum() -> NetworkDescriptor {
    NetworkDescriptor {
        key: "arbitrum".into(),
        chain_id: ChainId(42161),
        name: "Arbitrum".into(),
        primary_endpoint: "https://arbitrum.llamarpc.com".into(),
        backup_endpoints: urls(&[
            "https://rpc.ankr.com/arbitrum",
            "https://arbitrum-mainnet.public.blastapi.io",
            "https://arbitrum.publicnode.com",
            "https://arb1.arbitrum.io/rpc",
        ]),
        native_token: NativeToken {
            symbol: "ETH".into(),
            name: "Ethereum".into(),
            decimals: 18,
        },
        known_tokens: tokens(
            "arbitrum",
            &[
                ("ETH", "Ethereum", 18, Address::ZERO),
                ("USDC", "USD Coin", 6, address!("FF970A61A04b1cA14834A43f5dE4533eBDDB5CC8")),
                ("USDT", "Tether", 6, address!("Fd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9")),
                ("DAI", "Dai Stablecoin", 18, address!("DA10009cBd5D07dd0CeCc66161FC93D7c9000da1")),
                ("WBTC", "Wrapped Bitcoin", 8, address!("2f2a2543B76A4166549F7aaB2e75Bef0aefC5B0f")),
                ("ARB", "Arbitrum", 18, address!("912CE59144191C1204E64559FE8253a0e49E6548")),
                ("UNI", "Uniswap", 18, address!("Fa7F8980b0f1E64A2062791cc3b0871572f1F7f0")),
            ],
        ),
        router_address: KYBER_ROUTER,
        quoter_address: KYBER_QUOTER,
        aggregator_router: AGGREGATOR_ROUTER,
        multicall_address: address!("adF885960B47eA2CD9B55E6DAc6B42b7Cb2806dB"),
        explorer_url: "https://arbiscan.io".into(),
        average_block_time_secs: 1,
    }
}

fn bsc() -> NetworkDescriptor {
    NetworkDescriptor {
        key: "bsc".into(),
        chain_id: ChainId(56),
        name: "BNB Smart Chain".into(),
        primary_endpoint: "https://bsc.llamarpc.com".into(),
        backup_endpoints: urls(&[
            "https://rpc.ankr.com/bsc",
            "https://bsc-dataseed.binance.org",
            "https://bsc.publicnode.com",
            "https://bsc-dataseed1.defibit.io",
        ]),
        native_token: NativeToken {
            symbol: "BNB".into(),
            name: "BNB".into(),
            decimals: 18,
        },
        known_tokens: tokens(
            "bsc",
            &[
                ("BNB", "BNB", 18, Address::ZERO),
                ("USDC", "USD Coin", 18, address!("8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d")),
                ("USDT", "Tether", 18, address!("55d398326f99059fF775485246999027B3197955")),
                ("DAI", "Dai Stablecoin", 18, address!("1AF3F329e8BE154074D8769D1FFa4eE058B1DBc3")),
                ("BUSD", "Binance USD", 18, address!("e9e7CEA3DedcA5984780Bafc599bD69ADd087D56")),
                ("WETH", "Wrapped Ethereum", 18, address!("2170Ed0880ac9A755fd29B2688956BD959F933F8")),
                ("CAKE", "PancakeSwap", 18, address!("0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82")),
            ],
        ),
        router_address: KYBER_ROUTER,
        quoter_address: KYBER_QUOTER,
        aggregator_router: AGGREGATOR_ROUTER,
        multicall_address: address!("fF6FD90A470Aaa0c1B8A54681746b07AcdFedc9B"),
        explorer_url: "https://bscscan.com".into(),
        average_block_time_secs: 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_match_table() {
        let keys: Vec<String> = networks().into_iter().map(|n| n.key).collect();
        assert_eq!(keys, network_keys().map(String::from).to_vec());
    }

    #[test]
    fn test_every_network_ships_native_token() {
        for network in networks() {
            let native = network
                .known_tokens
                .values()
                .find(|t| t.is_native())
                .unwrap_or_else(|| panic!("{} has no native token", network.key));
            assert_eq!(native.symbol, network.native_token.symbol);
            assert!(network.known_tokens.values().all(|t| t.network == network.key));
        }
    }
}
