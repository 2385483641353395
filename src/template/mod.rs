//! Email template model.
//!
//! This module provides:
//! - Template types in the casing the console UI expects
//! - Create/update request validation
//! - Placeholder discovery for `{{variable}}` markers
//!
//! Templates themselves live in the provider's store; see [`crate::provider`].

mod placeholders;
mod types;

pub use placeholders::{extract_placeholders, PlaceholderSet};
pub use types::{
    validate_template_name, CreateTemplateRequest, EmailTemplate, TemplateContent,
    TemplateListResponse, TemplateMetadata, UpdateTemplateRequest,
};
