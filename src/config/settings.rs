use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub otel: OtelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Maximum accepted request body in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

/// Access gate configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to verify session tokens
    pub session_secret: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    /// Cookie carrying the session token (Bearer header is also accepted)
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,
    #[serde(default = "default_true")]
    pub require_session: bool,
    #[serde(default)]
    pub require_api_key: bool,
    /// Reject requests with 403 when the provider has no credentials configured
    #[serde(default = "default_true")]
    pub validate_provider_credentials: bool,
    /// Role the session must carry, if any
    pub required_role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    pub key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// `ses` or `memory`
    #[serde(default = "default_provider_backend")]
    pub backend: String,
    #[serde(default)]
    pub ses: SesConfig,
    /// Sandbox identities for the in-memory backend; empty disables the sandbox
    #[serde(default)]
    pub verified_identities: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SesConfig {
    #[serde(default = "default_region")]
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Applied to sends that do not name a configuration set
    pub configuration_set: Option<String>,
}

impl SesConfig {
    pub fn has_credentials(&self) -> bool {
        matches!(
            (&self.access_key_id, &self.secret_access_key),
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty()
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
    /// Emit log lines as JSON instead of the human-readable format
    #[serde(default)]
    pub json_logs: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_body_limit() -> usize {
    256 * 1024
}

fn default_session_cookie() -> String {
    "session".to_string()
}

fn default_true() -> bool {
    true
}

fn default_provider_backend() -> String {
    "ses".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "ses-template-console".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("provider.backend", default_provider_backend())?
            .set_default("provider.ses.region", default_region())?;

        // Standard AWS variables seed the SES section; explicit settings win.
        if let Ok(region) = env::var("AWS_REGION") {
            builder = builder.set_default("provider.ses.region", region)?;
        }
        if let Ok(key) = env::var("AWS_ACCESS_KEY_ID") {
            builder = builder.set_default("provider.ses.access_key_id", key)?;
        }
        if let Ok(secret) = env::var("AWS_SECRET_ACCESS_KEY") {
            builder = builder.set_default("provider.ses.secret_access_key", secret)?;
        }

        let builder = builder
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // CONSOLE__AUTH__SESSION_SECRET, CONSOLE__PROVIDER__SES__REGION, ...
            .add_source(
                Environment::with_prefix("CONSOLE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .with_list_parse_key("provider.verified_identities"),
            );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject combinations that would leave the access gate unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let key_configured = self.api.key.as_deref().is_some_and(|key| !key.is_empty());

        if self.auth.require_api_key && !key_configured {
            return Err(ConfigError::Message(
                "auth.require_api_key is set but api.key is not configured".to_string(),
            ));
        }

        if self.auth.require_session && self.auth.session_secret.is_empty() {
            return Err(ConfigError::Message(
                "auth.session_secret must be set when sessions are required".to_string(),
            ));
        }

        Ok(())
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            backend: default_provider_backend(),
            ses: SesConfig::default(),
            verified_identities: vec![],
        }
    }
}

impl Default for SesConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            access_key_id: None,
            secret_access_key: None,
            configuration_set: None,
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
            json_logs: false,
        }
    }
}
