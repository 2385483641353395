//! Send request parsing and validation.
//!
//! A raw JSON body is turned into a [`SendRequest`] in one step; every problem
//! found is reported together in a single [`ValidationError`].

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

lazy_static! {
    /// `local@domain.tld` shape; deliberately looser than RFC 5322.
    static ref EMAIL_PATTERN: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// Address syntax check used for sender and recipients.
pub fn is_valid_email(address: &str) -> bool {
    EMAIL_PATTERN.is_match(address)
}

/// Send request body as received from the console.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailBody {
    pub template_name: Option<String>,
    pub source: Option<String>,
    pub to: Option<Vec<String>>,
    pub template_data: Option<serde_json::Value>,
    pub configuration_set_name: Option<String>,
}

/// One problem with one request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: &'static str,
    pub message: String,
}

/// Every problem found in a send request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render_issues(.issues))]
pub struct ValidationError {
    issues: Vec<FieldIssue>,
}

fn render_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    /// Whether any issue concerns the given field
    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }
}

/// A send request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SendRequest {
    template_name: String,
    source: String,
    recipients: Vec<String>,
    template_data: serde_json::Map<String, serde_json::Value>,
    configuration_set_name: Option<String>,
}

impl SendRequest {
    /// Validate a raw body. Runs every check and reports all failures at once.
    pub fn parse(body: SendEmailBody) -> Result<Self, ValidationError> {
        let mut issues = Vec::new();

        let template_name = body
            .template_name
            .filter(|name| !name.trim().is_empty());
        if template_name.is_none() {
            issues.push(FieldIssue {
                field: "templateName",
                message: "templateName is required".to_string(),
            });
        }

        let source = body.source.filter(|source| !source.is_empty());
        match &source {
            None => issues.push(FieldIssue {
                field: "source",
                message: "source email address is required".to_string(),
            }),
            Some(source) if !is_valid_email(source) => issues.push(FieldIssue {
                field: "source",
                message: format!("Invalid source email address: {}", source),
            }),
            Some(_) => {}
        }

        let recipients = body.to.unwrap_or_default();
        if recipients.is_empty() {
            issues.push(FieldIssue {
                field: "to",
                message: "to must contain at least one recipient email address".to_string(),
            });
        } else {
            let invalid: Vec<&str> = recipients
                .iter()
                .map(String::as_str)
                .filter(|address| !is_valid_email(address))
                .collect();

            if !invalid.is_empty() {
                issues.push(FieldIssue {
                    field: "to",
                    message: format!(
                        "Invalid recipient email address(es): {}",
                        invalid.join(", ")
                    ),
                });
            }
        }

        let template_data = match body.template_data {
            None | Some(serde_json::Value::Null) => serde_json::Map::new(),
            Some(serde_json::Value::Object(map)) => map,
            Some(_) => {
                issues.push(FieldIssue {
                    field: "templateData",
                    message: "templateData must be a JSON object".to_string(),
                });
                serde_json::Map::new()
            }
        };

        if !issues.is_empty() {
            return Err(ValidationError { issues });
        }

        match (template_name, source) {
            (Some(template_name), Some(source)) => Ok(Self {
                template_name,
                source,
                recipients,
                template_data,
                configuration_set_name: body
                    .configuration_set_name
                    .filter(|name| !name.is_empty()),
            }),
            // Both were checked above
            _ => Err(ValidationError { issues }),
        }
    }

    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    pub fn template_data(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.template_data
    }

    pub fn configuration_set_name(&self) -> Option<&str> {
        self.configuration_set_name.as_deref()
    }
}

impl TryFrom<SendEmailBody> for SendRequest {
    type Error = ValidationError;

    fn try_from(body: SendEmailBody) -> Result<Self, Self::Error> {
        SendRequest::parse(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: serde_json::Value) -> SendEmailBody {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_email_syntax_accepts_lite_shape() {
        for address in ["a@b.com", "first.last+tag@sub.example.co", "x@y.z", "a@b.c.d"] {
            assert!(is_valid_email(address), "{} should be valid", address);
        }
    }

    #[test]
    fn test_email_syntax_rejects_other_shapes() {
        for address in [
            "",
            "not-an-email",
            "a@b",
            "@b.com",
            "a@.com",
            "a@b.",
            "a b@c.com",
            "a@b@c.com",
            " a@b.com",
            "a@b.com ",
        ] {
            assert!(!is_valid_email(address), "{:?} should be invalid", address);
        }
    }

    #[test]
    fn test_parse_valid_request() {
        let request = SendRequest::parse(body(json!({
            "templateName": "welcome",
            "source": "a@b.com",
            "to": ["c@d.com", "e@f.org"],
            "templateData": { "name": "Ann", "count": 3 },
            "configurationSetName": "tracking"
        })))
        .unwrap();

        assert_eq!(request.template_name(), "welcome");
        assert_eq!(request.source(), "a@b.com");
        assert_eq!(request.recipients(), ["c@d.com", "e@f.org"]);
        assert_eq!(request.template_data()["count"], 3);
        assert_eq!(request.configuration_set_name(), Some("tracking"));
    }

    #[test]
    fn test_template_data_defaults_to_empty_object() {
        let request = SendRequest::parse(body(json!({
            "templateName": "welcome",
            "source": "a@b.com",
            "to": ["c@d.com"],
            "configurationSetName": ""
        })))
        .unwrap();

        assert!(request.template_data().is_empty());
        assert_eq!(request.configuration_set_name(), None);
    }

    #[test]
    fn test_zero_recipients_always_rejected() {
        let err = SendRequest::parse(body(json!({
            "templateName": "welcome",
            "source": "a@b.com",
            "to": []
        })))
        .unwrap_err();

        assert!(err.has_field("to"));
        assert_eq!(err.issues().len(), 1);
        assert!(err.to_string().contains("at least one recipient"));

        let err = SendRequest::parse(body(json!({
            "templateName": "welcome",
            "source": "a@b.com"
        })))
        .unwrap_err();
        assert!(err.has_field("to"));
    }

    #[test]
    fn test_every_invalid_recipient_named() {
        let err = SendRequest::parse(body(json!({
            "templateName": "welcome",
            "source": "a@b.com",
            "to": ["bad-one", "ok@example.com", "bad@two"]
        })))
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("bad-one"));
        assert!(message.contains("bad@two"));
        assert!(!message.contains("ok@example.com"));
    }

    #[test]
    fn test_invalid_source_named() {
        let err = SendRequest::parse(body(json!({
            "templateName": "welcome",
            "source": "not-an-email",
            "to": ["c@d.com"]
        })))
        .unwrap_err();

        assert!(err.has_field("source"));
        assert!(err.to_string().contains("source"));
        assert!(err.to_string().contains("not-an-email"));
    }

    #[test]
    fn test_all_issues_reported_together() {
        let err = SendRequest::parse(SendEmailBody {
            template_data: Some(json!(["not", "an", "object"])),
            ..Default::default()
        })
        .unwrap_err();

        let fields: Vec<&str> = err.issues().iter().map(|issue| issue.field).collect();
        assert_eq!(fields, vec!["templateName", "source", "to", "templateData"]);
    }

    #[test]
    fn test_blank_template_name_rejected() {
        let err = SendRequest::try_from(body(json!({
            "templateName": "   ",
            "source": "a@b.com",
            "to": ["c@d.com"]
        })))
        .unwrap_err();

        assert!(err.has_field("templateName"));
    }
}
