use crate::storage::protocol::validate_map_name;

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "group-registry", version, about = "Cluster-shared group registry node")]
pub struct NodeConfig {
    /// Address the HTTP API listens on
    #[arg(long, env = "GROUP_REGISTRY_BIND", default_value = "127.0.0.1:9130")]
    pub bind: SocketAddr,

    /// Use the maps hosted by this peer instead of hosting them here
    #[arg(long, env = "GROUP_REGISTRY_STORE_PEER")]
    pub store_peer: Option<SocketAddr>,

    /// Shared maps to bind at startup
    #[arg(long = "map", value_parser = parse_map_name, default_values_t = [String::from("modules"), String::from("tenants")])]
    pub maps: Vec<String>,

    /// Delay before retrying a conflicting write, in milliseconds
    #[arg(long, env = "GROUP_REGISTRY_RETRY_DELAY_MS", default_value_t = 10)]
    pub retry_delay_ms: u64,

    /// Verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_map_name(name: &str) -> Result<String, String> {
    validate_map_name(name)?;
    Ok(name.to_string())
}

impl NodeConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// A node without a store peer hosts the shared maps itself.
    pub fn hosts_store(&self) -> bool {
        self.store_peer.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NodeConfig::try_parse_from(["group-registry"]).unwrap();

        assert_eq!(config.bind, "127.0.0.1:9130".parse::<SocketAddr>().unwrap());
        assert!(config.hosts_store());
        assert_eq!(config.maps, vec!["modules".to_string(), "tenants".to_string()]);
        assert_eq!(config.retry_delay(), Duration::from_millis(10));
        assert_eq!(config.verbose, 0);
    }

    #[test]
    fn test_store_peer_and_maps() {
        let config = NodeConfig::try_parse_from([
            "group-registry",
            "--bind",
            "127.0.0.1:9200",
            "--store-peer",
            "127.0.0.1:9130",
            "--map",
            "deployments",
            "--retry-delay-ms",
            "25",
            "-vv",
        ])
        .unwrap();

        assert!(!config.hosts_store());
        assert_eq!(config.maps, vec!["deployments".to_string()]);
        assert_eq!(config.retry_delay(), Duration::from_millis(25));
        assert_eq!(config.verbose, 2);
    }

    #[test]
    fn test_rejects_map_names_unsafe_in_urls() {
        for bad in ["a/b", "q?x", "frag#1", ""] {
            let result = NodeConfig::try_parse_from(["group-registry", "--map", bad]);
            assert!(result.is_err(), "{:?} should be rejected", bad);
        }

        let config =
            NodeConfig::try_parse_from(["group-registry", "--map", "tenant_v2.1-x"]).unwrap();
        assert_eq!(config.maps, vec!["tenant_v2.1-x".to_string()]);
    }

    #[test]
    fn test_rejects_bad_address() {
        let result = NodeConfig::try_parse_from(["group-registry", "--bind", "not-an-addr"]);
        assert!(result.is_err());
    }
}
