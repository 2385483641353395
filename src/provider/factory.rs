//! Provider factory

use std::sync::Arc;

use crate::config::ProviderConfig;

use super::backend::TemplateProvider;
use super::memory_backend::InMemoryTemplateProvider;
use super::ses_backend::SesTemplateProvider;

/// Create the email provider selected by configuration.
///
/// - `"memory"`: an `InMemoryTemplateProvider`, sandboxed to
///   `verified_identities` when any are listed
/// - `"ses"` (default): an `SesTemplateProvider`
pub async fn create_provider(settings: &ProviderConfig) -> Arc<dyn TemplateProvider> {
    match settings.backend.as_str() {
        "memory" => {
            tracing::info!(
                backend = "memory",
                sandboxed = !settings.verified_identities.is_empty(),
                "Creating in-memory email provider"
            );
            Arc::new(
                InMemoryTemplateProvider::new()
                    .with_verified_identities(settings.verified_identities.clone())
                    .with_default_configuration_set(settings.ses.configuration_set.clone()),
            )
        }
        "ses" => {
            tracing::info!(backend = "ses", "Creating SES email provider");
            Arc::new(SesTemplateProvider::from_config(&settings.ses).await)
        }
        other => {
            tracing::warn!(
                backend = %other,
                "Unknown provider backend, using SES"
            );
            Arc::new(SesTemplateProvider::from_config(&settings.ses).await)
        }
    }
}
