//! AWS SES email provider implementation
//!
//! Talks to Simple Email Service through the v2 API. Template storage and
//! templated sends map one-to-one onto SES operations.

use async_trait::async_trait;
use aws_sdk_sesv2::{
    config::{Credentials, Region},
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    primitives::DateTime as AwsDateTime,
    types::{Destination, EmailContent, EmailTemplateContent, Template},
    Client,
};
use chrono::{DateTime, Utc};

use crate::config::SesConfig;
use crate::metrics::ProviderMetrics;
use crate::template::{EmailTemplate, TemplateContent, TemplateMetadata};

use super::backend::{ProviderError, TemplateProvider, TemplatedEmail};

/// SES error codes that mean the account or identity refused delivery.
const REJECTION_CODES: &[&str] = &[
    "MessageRejected",
    "MailFromDomainNotVerifiedException",
    "SendingPausedException",
    "AccountSuspendedException",
    "LimitExceededException",
    "TooManyRequestsException",
];

/// Page size for template listing
const LIST_PAGE_SIZE: i32 = 100;

/// AWS SES email provider
///
/// Supports explicit access key credentials or the default credential chain
/// (environment, profile, IAM role).
pub struct SesTemplateProvider {
    client: Client,
    has_explicit_credentials: bool,
    configuration_set: Option<String>,
}

impl SesTemplateProvider {
    /// Create a new SES provider from configuration
    ///
    /// This is an async operation because the AWS SDK loads credentials.
    pub async fn from_config(config: &SesConfig) -> Self {
        let region = Region::new(config.region.clone());

        let sdk_config = match (&config.access_key_id, &config.secret_access_key) {
            (Some(access_key), Some(secret_key)) if config.has_credentials() => {
                let credentials = Credentials::new(
                    access_key.clone(),
                    secret_key.clone(),
                    None,
                    None,
                    "ses-template-console",
                );

                aws_config::from_env()
                    .region(region)
                    .credentials_provider(credentials)
                    .load()
                    .await
            }
            _ => aws_config::from_env().region(region).load().await,
        };

        tracing::info!(
            region = %config.region,
            explicit_credentials = config.has_credentials(),
            "SES client configured"
        );

        Self {
            client: Client::new(&sdk_config),
            has_explicit_credentials: config.has_credentials(),
            configuration_set: config.configuration_set.clone(),
        }
    }
}

/// Map a failed SES call into the provider error set.
fn classify<E, R>(err: SdkError<E, R>, template_name: &str) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let detail = DisplayErrorContext(&err).to_string();
    classify_code(err.code(), err.message(), template_name, detail)
}

fn classify_code(
    code: Option<&str>,
    message: Option<&str>,
    template_name: &str,
    detail: String,
) -> ProviderError {
    let message = message.unwrap_or_default();

    match code {
        Some("NotFoundException") | Some("TemplateDoesNotExist") => {
            ProviderError::TemplateDoesNotExist(template_name.to_string())
        }
        Some("AlreadyExistsException") => {
            ProviderError::TemplateAlreadyExists(template_name.to_string())
        }
        Some(code) if REJECTION_CODES.contains(&code) => {
            ProviderError::MessageRejected(if message.is_empty() {
                code.to_string()
            } else {
                message.to_string()
            })
        }
        // SES reports some missing-template sends as a bad request
        Some("BadRequestException") if message.contains("does not exist") => {
            ProviderError::TemplateDoesNotExist(template_name.to_string())
        }
        Some("BadRequestException") => ProviderError::InvalidRequest(message.to_string()),
        _ => ProviderError::Other(detail),
    }
}

fn to_chrono(timestamp: &AwsDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
}

fn template_content(content: &TemplateContent) -> EmailTemplateContent {
    EmailTemplateContent::builder()
        .subject(&content.subject)
        .html(&content.html)
        .text(&content.text)
        .build()
}

#[async_trait]
impl TemplateProvider for SesTemplateProvider {
    async fn send_templated_email(&self, email: &TemplatedEmail) -> Result<String, ProviderError> {
        let _timer = ProviderMetrics::start_timer("send_email");

        let destination = Destination::builder()
            .set_to_addresses(Some(email.to.clone()))
            .build();

        let template = Template::builder()
            .template_name(&email.template_name)
            .template_data(&email.template_data)
            .build();

        let content = EmailContent::builder().template(template).build();

        let response = self
            .client
            .send_email()
            .from_email_address(&email.source)
            .destination(destination)
            .content(content)
            .set_configuration_set_name(email.configuration_set_name.clone())
            .send()
            .await
            .map_err(|e| classify(e, &email.template_name))
            .inspect_err(|e| ProviderMetrics::record_error("send_email", e))?;

        response
            .message_id()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::Other("SES response carried no message ID".to_string()))
    }

    async fn list_templates(&self) -> Result<Vec<TemplateMetadata>, ProviderError> {
        let _timer = ProviderMetrics::start_timer("list_templates");

        let mut templates = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let page = self
                .client
                .list_email_templates()
                .page_size(LIST_PAGE_SIZE)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| classify(e, ""))
                .inspect_err(|e| ProviderMetrics::record_error("list_templates", e))?;

            templates.extend(page.templates_metadata().iter().filter_map(|meta| {
                meta.template_name().map(|name| TemplateMetadata {
                    name: name.to_string(),
                    created_at: meta.created_timestamp().and_then(to_chrono),
                })
            }));

            match page.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(templates)
    }

    async fn get_template(&self, name: &str) -> Result<EmailTemplate, ProviderError> {
        let _timer = ProviderMetrics::start_timer("get_template");

        let response = self
            .client
            .get_email_template()
            .template_name(name)
            .send()
            .await
            .map_err(|e| classify(e, name))
            .inspect_err(|e| ProviderMetrics::record_error("get_template", e))?;

        let content = response
            .template_content()
            .map(|c| TemplateContent {
                subject: c.subject().unwrap_or_default().to_string(),
                html: c.html().unwrap_or_default().to_string(),
                text: c.text().unwrap_or_default().to_string(),
            })
            .unwrap_or_default();

        Ok(EmailTemplate::new(name, content))
    }

    async fn create_template(
        &self,
        name: &str,
        content: &TemplateContent,
    ) -> Result<(), ProviderError> {
        let _timer = ProviderMetrics::start_timer("create_template");

        self.client
            .create_email_template()
            .template_name(name)
            .template_content(template_content(content))
            .send()
            .await
            .map(|_| ())
            .map_err(|e| classify(e, name))
            .inspect_err(|e| ProviderMetrics::record_error("create_template", e))
    }

    async fn update_template(
        &self,
        name: &str,
        content: &TemplateContent,
    ) -> Result<(), ProviderError> {
        let _timer = ProviderMetrics::start_timer("update_template");

        self.client
            .update_email_template()
            .template_name(name)
            .template_content(template_content(content))
            .send()
            .await
            .map(|_| ())
            .map_err(|e| classify(e, name))
            .inspect_err(|e| ProviderMetrics::record_error("update_template", e))
    }

    async fn delete_template(&self, name: &str) -> Result<(), ProviderError> {
        let _timer = ProviderMetrics::start_timer("delete_template");

        self.client
            .delete_email_template()
            .template_name(name)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| classify(e, name))
            .inspect_err(|e| ProviderMetrics::record_error("delete_template", e))
    }

    fn credentials_configured(&self) -> bool {
        self.has_explicit_credentials
    }

    fn default_configuration_set(&self) -> Option<&str> {
        self.configuration_set.as_deref()
    }

    fn provider_name(&self) -> &'static str {
        "ses"
    }
}
