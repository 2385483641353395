use std::sync::Arc;

use thiserror::Error;

use crate::provider::{ProviderError, TemplateProvider, TemplatedEmail};

use super::SendRequest;

/// Successful dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReceipt {
    /// Provider-assigned message identifier
    pub message_id: String,
}

/// Classified dispatch failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Template not found: {template_name}")]
    TemplateNotFound { template_name: String },

    #[error("Message rejected: {reason}")]
    MessageRejected { reason: String },

    #[error("Dispatch failed: {detail}")]
    Unknown { detail: String },
}

impl DispatchError {
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::TemplateNotFound { .. } => "template_not_found",
            DispatchError::MessageRejected { .. } => "message_rejected",
            DispatchError::Unknown { .. } => "unknown",
        }
    }

    fn from_provider(err: ProviderError, template_name: &str) -> Self {
        match err {
            ProviderError::TemplateDoesNotExist(_) => DispatchError::TemplateNotFound {
                template_name: template_name.to_string(),
            },
            ProviderError::MessageRejected(reason) => DispatchError::MessageRejected { reason },
            other => DispatchError::Unknown {
                detail: other.to_string(),
            },
        }
    }
}

/// Issues exactly one templated send per validated request. No retries.
pub struct TemplateSendDispatcher {
    provider: Arc<dyn TemplateProvider>,
}

impl TemplateSendDispatcher {
    pub fn new(provider: Arc<dyn TemplateProvider>) -> Self {
        Self { provider }
    }

    /// Build the provider call for a request.
    ///
    /// Template data is flattened to one JSON string. The request's
    /// configuration set wins over the provider default.
    pub fn build_email(&self, request: &SendRequest) -> Result<TemplatedEmail, DispatchError> {
        let template_data = serde_json::to_string(request.template_data()).map_err(|e| {
            DispatchError::Unknown {
                detail: format!("Failed to encode template data: {}", e),
            }
        })?;

        let configuration_set_name = request
            .configuration_set_name()
            .or_else(|| self.provider.default_configuration_set())
            .map(str::to_string);

        Ok(TemplatedEmail {
            source: request.source().to_string(),
            to: request.recipients().to_vec(),
            template_name: request.template_name().to_string(),
            template_data,
            configuration_set_name,
        })
    }

    pub async fn dispatch(&self, request: &SendRequest) -> Result<DispatchReceipt, DispatchError> {
        let email = self.build_email(request)?;

        tracing::debug!(
            provider = self.provider.provider_name(),
            template_name = %email.template_name,
            recipient_count = email.to.len(),
            configuration_set = ?email.configuration_set_name,
            "Dispatching templated email"
        );

        match self.provider.send_templated_email(&email).await {
            Ok(message_id) => Ok(DispatchReceipt { message_id }),
            Err(err) => {
                let classified = DispatchError::from_provider(err, request.template_name());

                match &classified {
                    DispatchError::Unknown { detail } => tracing::error!(
                        template_name = %request.template_name(),
                        recipient_count = request.recipients().len(),
                        detail = %detail,
                        "Templated send failed"
                    ),
                    other => tracing::warn!(
                        template_name = %request.template_name(),
                        recipient_count = request.recipients().len(),
                        kind = other.kind(),
                        error = %other,
                        "Templated send refused by provider"
                    ),
                }

                Err(classified)
            }
        }
    }
}
