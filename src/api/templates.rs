//! Template administration endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::server::AppState;
use crate::template::{
    extract_placeholders, validate_template_name, CreateTemplateRequest, EmailTemplate,
    PlaceholderSet, TemplateListResponse, TemplateMetadata, UpdateTemplateRequest,
};

use super::extract::{AppJson, AppPath, AppQuery};

#[derive(Debug, Default, Deserialize)]
pub struct TemplateQuery {
    /// Case-insensitive substring of the template name
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholdersResponse {
    pub template_name: String,
    pub placeholders: PlaceholderSet,
    pub count: usize,
}

/// GET /api/templates - List templates with full content
///
/// A template that cannot be fetched is logged and left out.
#[tracing::instrument(name = "http.list_templates", skip(state, query))]
pub async fn list_templates(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<TemplateQuery>,
) -> Result<Json<TemplateListResponse>, AppError> {
    let search = query
        .search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let listed: Vec<TemplateMetadata> = state
        .provider
        .list_templates()
        .await?
        .into_iter()
        .filter(|meta| match &search {
            Some(term) => meta.name.to_lowercase().contains(term),
            None => true,
        })
        .collect();

    let mut templates = Vec::with_capacity(listed.len());
    for meta in listed {
        match state.provider.get_template(&meta.name).await {
            // SES fetches carry no timestamps; the listing does
            Ok(template) => templates.push(template.with_listed_timestamp(meta.created_at)),
            Err(e) => {
                tracing::warn!(template_name = %meta.name, error = %e, "Skipping unreadable template");
            }
        }
    }

    let count = templates.len();
    Ok(Json(TemplateListResponse { templates, count }))
}

/// POST /api/templates - Create a new template
#[tracing::instrument(name = "http.create_template", skip(state, request))]
pub async fn create_template(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<EmailTemplate>), AppError> {
    let (name, content) = request.into_parts()?;

    state.provider.create_template(&name, &content).await?;
    tracing::info!(template_name = %name, "Template created");

    let mut template = EmailTemplate::new(name, content);
    let now = chrono::Utc::now();
    template.created_at = Some(now);
    template.updated_at = Some(now);

    Ok((StatusCode::CREATED, Json(template)))
}

/// GET /api/templates/{name} - Get a specific template
#[tracing::instrument(name = "http.get_template", skip(state))]
pub async fn get_template(
    State(state): State<AppState>,
    AppPath(name): AppPath<String>,
) -> Result<Json<EmailTemplate>, AppError> {
    validate_template_name(&name)?;
    let template = state.provider.get_template(&name).await?;
    Ok(Json(template))
}

/// PUT /api/templates/{name} - Update an existing template
///
/// Absent fields keep their stored value.
#[tracing::instrument(name = "http.update_template", skip(state, request))]
pub async fn update_template(
    State(state): State<AppState>,
    AppPath(name): AppPath<String>,
    AppJson(request): AppJson<UpdateTemplateRequest>,
) -> Result<Json<EmailTemplate>, AppError> {
    validate_template_name(&name)?;

    let existing = state.provider.get_template(&name).await?;
    let content = request.apply(existing.content())?;

    state.provider.update_template(&name, &content).await?;
    tracing::info!(template_name = %name, "Template updated");

    let mut template = EmailTemplate::new(name, content);
    template.created_at = existing.created_at;
    template.updated_at = Some(chrono::Utc::now());

    Ok(Json(template))
}

/// DELETE /api/templates/{name} - Delete a template
#[tracing::instrument(name = "http.delete_template", skip(state))]
pub async fn delete_template(
    State(state): State<AppState>,
    AppPath(name): AppPath<String>,
) -> Result<StatusCode, AppError> {
    validate_template_name(&name)?;
    state.provider.delete_template(&name).await?;
    tracing::info!(template_name = %name, "Template deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/templates/{name}/placeholders - Variables a send must supply
#[tracing::instrument(name = "http.template_placeholders", skip(state))]
pub async fn template_placeholders(
    State(state): State<AppState>,
    AppPath(name): AppPath<String>,
) -> Result<Json<PlaceholdersResponse>, AppError> {
    validate_template_name(&name)?;
    let template = state.provider.get_template(&name).await?;
    let placeholders = extract_placeholders(&template.html_part, &template.text_part);

    Ok(Json(PlaceholdersResponse {
        template_name: template.template_name,
        count: placeholders.len(),
        placeholders,
    }))
}
