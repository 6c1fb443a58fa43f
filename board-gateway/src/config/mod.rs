use gateway_core::config as core_config;
use gateway_core::error::AppError;
use gateway_core::grpc::ClientConfig;
use secrecy::Secret;
use serde::Deserialize;

/// Settings for the gateway binary.
///
/// Loaded from `configuration.*` and `APP__` environment variables, e.g.
/// `APP__SERVER__PORT=8080` or `APP__SERVICES__BOARD__ENDPOINT=http://board:9000`.
#[derive(Deserialize, Clone)]
pub struct GatewaySettings {
    #[serde(default)]
    pub server: core_config::Config,
    pub auth: AuthSettings,
    pub services: ServicesSettings,
}

#[derive(Deserialize, Clone)]
pub struct AuthSettings {
    /// Expected scheme of the `Authorization` header, compared case-insensitively.
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default)]
    pub algorithm: TokenAlgorithm,
    /// Shared secret for HS256.
    #[serde(default)]
    pub secret: Option<Secret<String>>,
    /// PEM encoded public key for RS256.
    #[serde(default)]
    pub public_key_path: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default = "default_leeway_secs")]
    pub leeway_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenAlgorithm {
    #[default]
    HS256,
    RS256,
}

fn default_scheme() -> String {
    "Bearer".to_string()
}

fn default_leeway_secs() -> u64 {
    30
}

/// One entry per downstream service.
#[derive(Deserialize, Clone)]
pub struct ServicesSettings {
    pub authz: ClientConfig,
    pub user: ClientConfig,
    pub board: ClientConfig,
    pub category: ClientConfig,
    pub tag: ClientConfig,
    pub card: ClientConfig,
}

impl GatewaySettings {
    pub fn load() -> Result<Self, AppError> {
        core_config::load()
    }
}
