//! API layer - HTTP endpoint handlers organized by domain.

mod extract;
mod health;
mod metrics;
mod routes;
mod send;
mod templates;

pub use extract::{AppJson, AppPath, AppQuery};
pub use health::{health, HealthResponse};
pub use metrics::prometheus_metrics;
pub use routes::{api_routes, public_routes};
pub use send::send_templated_email;
pub use templates::{
    create_template, delete_template, get_template, list_templates, template_placeholders,
    update_template, PlaceholdersResponse, TemplateQuery,
};
