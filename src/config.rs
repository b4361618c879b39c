//! Configuration Module
//!
//! Handles loading and managing node configuration from environment
//! variables.

use std::env;

use crate::http::{DEFAULT_BASE_PATH, DEFAULT_REPLICAS};

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Byte budget for the node's cache group (0 = unbounded)
    pub cache_bytes: usize,
    /// HTTP server port
    pub server_port: u16,
    /// This node's advertised base URL
    pub self_url: String,
    /// URLs of all cluster nodes, including this one
    pub peers: Vec<String>,
    /// Virtual nodes per peer on the hash ring
    pub replicas: usize,
    /// URL prefix for the inter-node protocol
    pub base_path: String,
    /// Name of the cache group served by this node
    pub group_name: String,
    /// Directory backing the origin loader
    pub origin_dir: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_BYTES` - Cache byte budget (default: 67108864, i.e. 64 MiB)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SELF_URL` - Advertised URL (default: http://127.0.0.1:<port>)
    /// - `PEERS` - Comma-separated node URLs, including this node
    ///   (default: just this node)
    /// - `VNODE_REPLICAS` - Virtual nodes per peer (default: 50)
    /// - `BASE_PATH` - Inter-node URL prefix (default: /_hcache/)
    /// - `GROUP_NAME` - Group served by this node (default: main)
    /// - `ORIGIN_DIR` - Directory backing the loader (default: origin)
    pub fn from_env() -> Self {
        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);
        let self_url =
            env::var("SELF_URL").unwrap_or_else(|_| format!("http://127.0.0.1:{server_port}"));
        let peers = env::var("PEERS")
            .map(|v| {
                v.split(',')
                    .map(|peer| peer.trim().to_string())
                    .filter(|peer| !peer.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| vec![self_url.clone()]);

        Self {
            cache_bytes: env::var("CACHE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(64 * 1024 * 1024),
            server_port,
            self_url,
            peers,
            replicas: env::var("VNODE_REPLICAS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_REPLICAS),
            base_path: env::var("BASE_PATH").unwrap_or_else(|_| DEFAULT_BASE_PATH.to_string()),
            group_name: env::var("GROUP_NAME").unwrap_or_else(|_| "main".to_string()),
            origin_dir: env::var("ORIGIN_DIR").unwrap_or_else(|_| "origin".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_bytes: 64 * 1024 * 1024,
            server_port: 3000,
            self_url: "http://127.0.0.1:3000".to_string(),
            peers: vec!["http://127.0.0.1:3000".to_string()],
            replicas: DEFAULT_REPLICAS,
            base_path: DEFAULT_BASE_PATH.to_string(),
            group_name: "main".to_string(),
            origin_dir: "origin".to_string(),
        }
    }
}
