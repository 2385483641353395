//! Backend trait for the email provider.
//!
//! This module defines the boundary to the third-party email service. The
//! service is treated as a black box: templates are stored there, and a
//! templated send is a single request/response call.

use async_trait::async_trait;
use thiserror::Error;

use crate::error::AppError;
use crate::template::{EmailTemplate, TemplateContent, TemplateMetadata};

/// Failures reported by the email provider.
///
/// Every backend maps its native errors into this closed set once, at the
/// point the call returns.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// The named template is not in the provider's store
    #[error("Template does not exist: {0}")]
    TemplateDoesNotExist(String),

    /// A template with this name is already stored
    #[error("Template already exists: {0}")]
    TemplateAlreadyExists(String),

    /// The provider refused to deliver (sandbox, unverified identity, limits)
    #[error("Message rejected: {0}")]
    MessageRejected(String),

    /// The provider rejected the request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Transport failures, timeouts and anything unclassified
    #[error("Provider error: {0}")]
    Other(String),
}

impl ProviderError {
    /// Short label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::TemplateDoesNotExist(_) => "template_not_found",
            ProviderError::TemplateAlreadyExists(_) => "template_exists",
            ProviderError::MessageRejected(_) => "message_rejected",
            ProviderError::InvalidRequest(_) => "invalid_request",
            ProviderError::Other(_) => "other",
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::TemplateDoesNotExist(name) => {
                AppError::NotFound(format!("Email template does not exist: {}", name))
            }
            ProviderError::TemplateAlreadyExists(name) => {
                AppError::Conflict(format!("Email template already exists: {}", name))
            }
            ProviderError::MessageRejected(reason) => AppError::Rejected(reason),
            ProviderError::InvalidRequest(reason) => AppError::Validation(reason),
            ProviderError::Other(detail) => AppError::Internal(detail),
        }
    }
}

/// One "send templated email" call.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplatedEmail {
    pub source: String,
    pub to: Vec<String>,
    pub template_name: String,
    /// Template data as a single JSON-encoded object
    pub template_data: String,
    pub configuration_set_name: Option<String>,
}

/// Email provider operations.
#[async_trait]
pub trait TemplateProvider: Send + Sync {
    /// Send an email rendered from a stored template; returns the message ID.
    async fn send_templated_email(&self, email: &TemplatedEmail) -> Result<String, ProviderError>;

    async fn list_templates(&self) -> Result<Vec<TemplateMetadata>, ProviderError>;

    async fn get_template(&self, name: &str) -> Result<EmailTemplate, ProviderError>;

    async fn create_template(
        &self,
        name: &str,
        content: &TemplateContent,
    ) -> Result<(), ProviderError>;

    async fn update_template(
        &self,
        name: &str,
        content: &TemplateContent,
    ) -> Result<(), ProviderError>;

    async fn delete_template(&self, name: &str) -> Result<(), ProviderError>;

    /// Whether credentials for the provider are configured
    fn credentials_configured(&self) -> bool;

    /// Configuration set applied when a send names none
    fn default_configuration_set(&self) -> Option<&str> {
        None
    }

    fn provider_name(&self) -> &'static str;
}
