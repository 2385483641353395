//! Template types exchanged with the console UI

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// An email template as stored by the provider.
///
/// Field casing follows the console UI, which mirrors the provider's own
/// `TemplateName` / `SubjectPart` naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailTemplate {
    /// Same as `template_name`; the UI routes by it
    pub id: String,

    #[serde(rename = "TemplateName")]
    pub template_name: String,

    #[serde(rename = "SubjectPart")]
    pub subject_part: String,

    #[serde(rename = "HtmlPart", default)]
    pub html_part: String,

    #[serde(rename = "TextPart", default)]
    pub text_part: String,

    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl EmailTemplate {
    pub fn new(name: impl Into<String>, content: TemplateContent) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            template_name: name,
            subject_part: content.subject,
            html_part: content.html,
            text_part: content.text,
            created_at: None,
            updated_at: None,
        }
    }

    /// Fill missing timestamps from the provider's listing entry.
    ///
    /// Only a creation time is listed, so it also stands in for `updatedAt`.
    pub fn with_listed_timestamp(mut self, created_at: Option<DateTime<Utc>>) -> Self {
        if self.created_at.is_none() {
            self.created_at = created_at;
        }
        if self.updated_at.is_none() {
            self.updated_at = self.created_at;
        }
        self
    }

    pub fn content(&self) -> TemplateContent {
        TemplateContent {
            subject: self.subject_part.clone(),
            html: self.html_part.clone(),
            text: self.text_part.clone(),
        }
    }
}

/// Subject and bodies of a template, as sent to the provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateContent {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Name and creation time, as returned by a template listing.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateMetadata {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Request to create a new template
#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    #[serde(rename = "TemplateName")]
    pub template_name: Option<String>,

    #[serde(rename = "SubjectPart")]
    pub subject_part: Option<String>,

    #[serde(rename = "HtmlPart")]
    pub html_part: Option<String>,

    #[serde(rename = "TextPart")]
    pub text_part: Option<String>,
}

impl CreateTemplateRequest {
    /// Check required fields and the name format, yielding the name and content.
    pub fn into_parts(self) -> Result<(String, TemplateContent), AppError> {
        let name = self.template_name.unwrap_or_default();
        let subject = self.subject_part.unwrap_or_default();

        if name.trim().is_empty() || subject.trim().is_empty() {
            return Err(AppError::Validation(
                "Template name and subject are required".to_string(),
            ));
        }

        validate_template_name(&name)?;

        Ok((
            name,
            TemplateContent {
                subject,
                html: self.html_part.unwrap_or_default(),
                text: self.text_part.unwrap_or_default(),
            },
        ))
    }
}

/// Request to update an existing template; absent fields keep their value
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTemplateRequest {
    #[serde(rename = "SubjectPart")]
    pub subject_part: Option<String>,

    #[serde(rename = "HtmlPart")]
    pub html_part: Option<String>,

    #[serde(rename = "TextPart")]
    pub text_part: Option<String>,
}

impl UpdateTemplateRequest {
    pub fn apply(self, mut content: TemplateContent) -> Result<TemplateContent, AppError> {
        if let Some(subject) = self.subject_part {
            content.subject = subject;
        }

        if let Some(html) = self.html_part {
            content.html = html;
        }

        if let Some(text) = self.text_part {
            content.text = text;
        }

        if content.subject.trim().is_empty() {
            return Err(AppError::Validation("Template subject is required".to_string()));
        }

        Ok(content)
    }
}

/// Response for listing templates
#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<EmailTemplate>,
    pub count: usize,
}

/// Provider template names: 1-64 characters of alphanumeric, dash, underscore.
pub fn validate_template_name(name: &str) -> Result<(), AppError> {
    if name.is_empty() || name.len() > 64 {
        return Err(AppError::Validation(
            "Template name must be 1-64 characters".to_string(),
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::Validation(
            "Template name must contain only alphanumeric, dash, or underscore".to_string(),
        ));
    }

    Ok(())
}
