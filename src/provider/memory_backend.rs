//! In-memory email provider using DashMap.
//!
//! Templates and sent messages live in memory and are lost on restart. Used
//! for local development and tests. When verified identities are configured
//! it behaves like a sandboxed account: every sender and recipient must match
//! a verified address or domain.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::template::{EmailTemplate, TemplateContent, TemplateMetadata};

use super::backend::{ProviderError, TemplateProvider, TemplatedEmail};

/// In-memory email provider.
pub struct InMemoryTemplateProvider {
    /// Stored templates keyed by name
    templates: DashMap<String, EmailTemplate>,
    /// Accepted sends keyed by message ID
    sent: DashMap<String, TemplatedEmail>,
    /// Lower-cased addresses and domains; empty disables the sandbox
    verified_identities: Vec<String>,
    default_configuration_set: Option<String>,
    send_calls: AtomicU64,
}

impl Default for InMemoryTemplateProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTemplateProvider {
    pub fn new() -> Self {
        Self {
            templates: DashMap::new(),
            sent: DashMap::new(),
            verified_identities: Vec::new(),
            default_configuration_set: None,
            send_calls: AtomicU64::new(0),
        }
    }

    /// Restrict sends to the given identities (addresses or domains).
    pub fn with_verified_identities(mut self, identities: Vec<String>) -> Self {
        self.verified_identities = identities
            .into_iter()
            .map(|identity| identity.trim().to_lowercase())
            .filter(|identity| !identity.is_empty())
            .collect();
        self
    }

    pub fn with_default_configuration_set(mut self, name: Option<String>) -> Self {
        self.default_configuration_set = name;
        self
    }

    /// Number of send calls received, successful or not
    pub fn send_calls(&self) -> u64 {
        self.send_calls.load(Ordering::Relaxed)
    }

    /// A previously accepted send, by message ID
    pub fn sent_message(&self, message_id: &str) -> Option<TemplatedEmail> {
        self.sent.get(message_id).map(|entry| entry.value().clone())
    }

    fn is_verified(&self, address: &str) -> bool {
        if self.verified_identities.is_empty() {
            return true;
        }

        let address = address.to_lowercase();
        let domain = address.rsplit_once('@').map(|(_, domain)| domain);

        self.verified_identities
            .iter()
            .any(|identity| *identity == address || Some(identity.as_str()) == domain)
    }
}

#[async_trait]
impl TemplateProvider for InMemoryTemplateProvider {
    async fn send_templated_email(&self, email: &TemplatedEmail) -> Result<String, ProviderError> {
        self.send_calls.fetch_add(1, Ordering::Relaxed);

        if !self.templates.contains_key(&email.template_name) {
            return Err(ProviderError::TemplateDoesNotExist(
                email.template_name.clone(),
            ));
        }

        let unverified: Vec<&str> = std::iter::once(email.source.as_str())
            .chain(email.to.iter().map(String::as_str))
            .filter(|address| !self.is_verified(address))
            .collect();

        if !unverified.is_empty() {
            return Err(ProviderError::MessageRejected(format!(
                "Email address is not verified. The following identities failed the check: {}",
                unverified.join(", ")
            )));
        }

        if serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&email.template_data)
            .is_err()
        {
            return Err(ProviderError::InvalidRequest(
                "Template data must be a JSON object".to_string(),
            ));
        }

        let message_id = Uuid::new_v4().to_string();
        self.sent.insert(message_id.clone(), email.clone());

        tracing::debug!(
            template_name = %email.template_name,
            message_id = %message_id,
            recipient_count = email.to.len(),
            "Templated email accepted"
        );

        Ok(message_id)
    }

    async fn list_templates(&self) -> Result<Vec<TemplateMetadata>, ProviderError> {
        let mut metadata: Vec<TemplateMetadata> = self
            .templates
            .iter()
            .map(|entry| TemplateMetadata {
                name: entry.key().clone(),
                created_at: entry.value().created_at,
            })
            .collect();

        metadata.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(metadata)
    }

    async fn get_template(&self, name: &str) -> Result<EmailTemplate, ProviderError> {
        self.templates
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ProviderError::TemplateDoesNotExist(name.to_string()))
    }

    async fn create_template(
        &self,
        name: &str,
        content: &TemplateContent,
    ) -> Result<(), ProviderError> {
        match self.templates.entry(name.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(ProviderError::TemplateAlreadyExists(name.to_string()))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let now = Utc::now();
                let mut template = EmailTemplate::new(name, content.clone());
                template.created_at = Some(now);
                template.updated_at = Some(now);
                slot.insert(template);
                Ok(())
            }
        }
    }

    async fn update_template(
        &self,
        name: &str,
        content: &TemplateContent,
    ) -> Result<(), ProviderError> {
        let mut template = self
            .templates
            .get_mut(name)
            .ok_or_else(|| ProviderError::TemplateDoesNotExist(name.to_string()))?;

        template.subject_part = content.subject.clone();
        template.html_part = content.html.clone();
        template.text_part = content.text.clone();
        template.updated_at = Some(Utc::now());

        Ok(())
    }

    async fn delete_template(&self, name: &str) -> Result<(), ProviderError> {
        self.templates
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ProviderError::TemplateDoesNotExist(name.to_string()))
    }

    fn credentials_configured(&self) -> bool {
        true
    }

    fn default_configuration_set(&self) -> Option<&str> {
        self.default_configuration_set.as_deref()
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
