//! Email provider boundary.
//!
//! This module provides:
//! - The `TemplateProvider` trait and the closed `ProviderError` set
//! - `SesTemplateProvider` backed by the AWS SES v2 API
//! - `InMemoryTemplateProvider` for local development and tests
//! - A factory selecting the backend from configuration

mod backend;
mod factory;
mod memory_backend;
mod ses_backend;

pub use backend::{ProviderError, TemplateProvider, TemplatedEmail};
pub use factory::create_provider;
pub use memory_backend::InMemoryTemplateProvider;
pub use ses_backend::SesTemplateProvider;
