//! Gateway configuration with validation.
//!
//! Loaded from a JSON file (`LG_CONFIG`, default `./config.json`) whose keys
//! follow the network's `config.json` layout, then adjusted by environment
//! overrides.

use lg_tx_coordinator::{CoordinatorConfig, EndorsementPolicy, FunctionNames, QueryPolicy};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use shared_types::{ChaincodeId, ChannelId, DeploymentSpec};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "LG_CONFIG";
/// Config file used when `LG_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "./config.json";

/// Main gateway configuration
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Name of the ledger chain
    pub chain_name: String,
    #[serde(rename = "channelID")]
    pub channel_id: String,
    #[serde(rename = "chaincodeID")]
    pub chaincode_id: String,
    /// Chaincode package source used by `/deploy`
    pub chaincode_path: Option<String>,
    #[serde(rename = "dockerfile_contents")]
    pub dockerfile_contents: Option<String>,
    pub orderer: OrdererEndpoint,
    pub peers: Vec<PeerEndpoint>,
    pub events: Vec<EventEndpoint>,
    pub invoke_request: RequestTemplate,
    pub query_request: RequestTemplate,
    pub deploy_request: RequestTemplate,
    /// Commit wait time in milliseconds (number or numeric string)
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub wait_time: u64,
    /// Directory holding enrolled identities
    pub key_value_store: PathBuf,
    pub peer_request_timeout_ms: u64,
    pub endorsement_policy: EndorsementPolicy,
    pub query_policy: QueryPolicy,
    pub submitter: SubmitterConfig,
    pub http: HttpConfig,
    /// Default log filter (`RUST_LOG` takes precedence)
    pub log_level: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            chain_name: "testchainid".to_string(),
            channel_id: "mychannel".to_string(),
            chaincode_id: "gochain".to_string(),
            chaincode_path: None,
            dockerfile_contents: None,
            orderer: OrdererEndpoint {
                orderer_url: "http://localhost:7050".to_string(),
            },
            peers: vec![PeerEndpoint {
                peer_url: "http://localhost:7051".to_string(),
            }],
            events: vec![EventEndpoint {
                event_url: "http://localhost:7053".to_string(),
            }],
            invoke_request: RequestTemplate::new("invoke"),
            query_request: RequestTemplate::new("query"),
            deploy_request: RequestTemplate::new("init"),
            wait_time: 30_000,
            key_value_store: PathBuf::from("./keystore"),
            peer_request_timeout_ms: 10_000,
            endorsement_policy: EndorsementPolicy::default(),
            query_policy: QueryPolicy::default(),
            submitter: SubmitterConfig::default(),
            http: HttpConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

/// Ordering service endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdererEndpoint {
    pub orderer_url: String,
}

/// Endorsing peer endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerEndpoint {
    pub peer_url: String,
}

/// Event emitter endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEndpoint {
    pub event_url: String,
}

/// Chaincode function template for one request kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTemplate {
    pub function_name: String,
}

impl RequestTemplate {
    fn new(function_name: &str) -> Self {
        Self {
            function_name: function_name.to_string(),
        }
    }
}

/// Identity every request is submitted as
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubmitterConfig {
    pub name: String,
    pub msp_id: String,
    /// Generate and store a key when none is enrolled yet
    pub enroll_if_missing: bool,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            name: "admin".to_string(),
            msp_id: "Org1MSP".to_string(),
            enroll_if_missing: true,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 3000)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 3000,
        }
    }
}

impl GatewayConfig {
    /// Load from the file named by `LG_CONFIG` and apply environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load(Path::new(&path))?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        info!(path = %path.display(), peers = config.peers.len(), "Loaded gateway configuration");
        Ok(config)
    }

    /// Apply `LG_HTTP_PORT`, `LG_WAIT_TIME_MS` and `LG_LOG_LEVEL` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("LG_HTTP_PORT") {
            self.http.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("LG_HTTP_PORT is not a port: {port}")))?;
        }
        if let Some(wait) = lookup("LG_WAIT_TIME_MS") {
            self.wait_time = wait.parse().map_err(|_| {
                ConfigError::InvalidTimeout(format!("LG_WAIT_TIME_MS is not a number: {wait}"))
            })?;
        }
        if let Some(level) = lookup("LG_LOG_LEVEL") {
            self.log_level = level;
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.peers.is_empty() {
            return Err(ConfigError::NoPeers);
        }
        if self.peers.iter().any(|p| p.peer_url.trim().is_empty()) {
            return Err(ConfigError::Invalid("peer_url cannot be empty".into()));
        }
        if self.orderer.orderer_url.trim().is_empty() {
            return Err(ConfigError::Invalid("orderer_url cannot be empty".into()));
        }
        if self.channel_id.is_empty() || self.chaincode_id.is_empty() {
            return Err(ConfigError::Invalid(
                "channelID and chaincodeID are required".into(),
            ));
        }
        if self.wait_time == 0 {
            return Err(ConfigError::InvalidTimeout("waitTime cannot be 0".into()));
        }
        if self.peer_request_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout(
                "peerRequestTimeoutMs cannot be 0".into(),
            ));
        }
        if let EndorsementPolicy::AtLeast(n) = self.endorsement_policy {
            if n == 0 || n > self.peers.len() {
                return Err(ConfigError::InvalidPolicy(format!(
                    "atLeast {n} with {} configured peers",
                    self.peers.len()
                )));
            }
        }
        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }

    pub fn peer_request_timeout(&self) -> Duration {
        Duration::from_millis(self.peer_request_timeout_ms)
    }

    /// Coordinator settings derived from this configuration.
    pub fn to_coordinator_config(&self) -> CoordinatorConfig {
        let deployment = self.chaincode_path.as_ref().map(|path| DeploymentSpec {
            chaincode_path: path.clone(),
            dockerfile_contents: self.dockerfile_contents.clone().unwrap_or_default(),
        });

        CoordinatorConfig {
            channel_id: ChannelId(self.channel_id.clone()),
            chaincode_id: ChaincodeId(self.chaincode_id.clone()),
            functions: FunctionNames {
                invoke: self.invoke_request.function_name.clone(),
                query: self.query_request.function_name.clone(),
                deploy: self.deploy_request.function_name.clone(),
            },
            deployment,
            peer_request_timeout: self.peer_request_timeout(),
            commit_wait_time: Duration::from_millis(self.wait_time),
            endorsement_policy: self.endorsement_policy,
            query_policy: self.query_policy,
            ..CoordinatorConfig::default()
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read {path}: {reason}")]
    Read { path: PathBuf, reason: String },
    /// Config file is not valid JSON for this schema
    #[error("cannot parse configuration: {0}")]
    Parse(String),
    /// No endorsing peers configured
    #[error("at least one peer must be configured")]
    NoPeers,
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// Endorsement policy cannot be met by the configured peers
    #[error("invalid endorsement policy: {0}")]
    InvalidPolicy(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
