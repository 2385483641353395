//! Templated send endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};

use crate::auth::AuthContext;
use crate::error::AppError;
use crate::metrics::SendMetrics;
use crate::send::{process_send, SendEmailBody, SendEmailResponse, SendOutcome};
use crate::server::AppState;

/// POST /api/templates/send - Send an email rendered from a stored template
#[tracing::instrument(
    name = "http.send_templated_email",
    skip(state, context, body),
    fields(request_id = %context.request_id)
)]
pub async fn send_templated_email(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    body: Result<Json<SendEmailBody>, JsonRejection>,
) -> Result<(StatusCode, Json<SendEmailResponse>), AppError> {
    let Json(body) = body.map_err(|rejection| {
        SendMetrics::record_outcome(SendOutcome::ValidationRejected.as_str());
        tracing::warn!(
            client_ip = %context.client_ip,
            error = %rejection.body_text(),
            "Malformed send request body"
        );
        AppError::from(rejection)
    })?;

    let response = process_send(&context, body, &state.dispatcher).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
