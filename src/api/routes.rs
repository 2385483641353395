use axum::{
    routing::{get, post},
    Router,
};

use crate::server::AppState;

use super::health::health;
use super::metrics::prometheus_metrics;
use super::send::send_templated_email;
use super::templates::{
    create_template, delete_template, get_template, list_templates, template_placeholders,
    update_template,
};

/// Routes outside the access gate
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
}

/// Routes nested under `/api`; the caller layers the access gate on top
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/templates", get(list_templates).post(create_template))
        // Static segment takes priority over `{name}`
        .route("/templates/send", post(send_templated_email))
        .route(
            "/templates/{name}",
            get(get_template).put(update_template).delete(delete_template),
        )
        .route("/templates/{name}/placeholders", get(template_placeholders))
}
