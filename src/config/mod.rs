mod settings;

pub use settings::{
    ApiConfig, AuthConfig, OtelConfig, ProviderConfig, ServerConfig, SesConfig, Settings,
};
