use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::AppState;
use crate::auth::resolve_client_ip;

/// Access gate middleware for `/api` routes.
///
/// Runs before body extraction, so a rejected request never reaches the
/// validator or the provider. Admitted requests carry an `AuthContext`
/// extension.
pub async fn access_gate(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // ConnectInfo is absent when the router is driven without a listener
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client_ip = resolve_client_ip(req.headers(), peer);

    match state.gate.authenticate(req.headers(), client_ip) {
        Ok(context) => {
            req.extensions_mut().insert(context);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}
