//! End-to-end tests for the console router
//!
//! These drive the full router (gate middleware, handlers, error envelope)
//! with `oneshot` requests against the in-memory provider. No network or
//! AWS credentials are needed.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use ses_template_console::auth::SessionClaims;
use ses_template_console::config::{
    ApiConfig, AuthConfig, OtelConfig, ProviderConfig, ServerConfig, Settings,
};
use ses_template_console::provider::{
    InMemoryTemplateProvider, ProviderError, TemplateProvider, TemplatedEmail,
};
use ses_template_console::send::{MESSAGE_REJECTED_MESSAGE, TEMPLATE_NOT_FOUND_MESSAGE};
use ses_template_console::server::{create_app, AppState};
use ses_template_console::template::{EmailTemplate, TemplateContent, TemplateMetadata};

const SECRET: &str = "integration-test-secret";

fn test_settings() -> Settings {
    Settings {
        server: ServerConfig::default(),
        auth: AuthConfig {
            session_secret: SECRET.to_string(),
            issuer: None,
            audience: None,
            session_cookie: "session".to_string(),
            require_session: true,
            require_api_key: false,
            validate_provider_credentials: true,
            required_role: None,
        },
        api: ApiConfig::default(),
        provider: ProviderConfig {
            backend: "memory".to_string(),
            ..ProviderConfig::default()
        },
        otel: OtelConfig::default(),
    }
}

fn session_token() -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = SessionClaims {
        sub: "operator-42".to_string(),
        exp: now + 600,
        iat: now,
        email: Some("operator@example.com".to_string()),
        roles: vec!["template-admin".to_string()],
        extra: Default::default(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

struct TestEnvironment {
    app: Router,
    provider: Arc<InMemoryTemplateProvider>,
}

impl TestEnvironment {
    fn new(provider: InMemoryTemplateProvider) -> Self {
        Self::with_settings(test_settings(), provider)
    }

    fn with_settings(settings: Settings, provider: InMemoryTemplateProvider) -> Self {
        let provider = Arc::new(provider);
        let state = AppState::new(settings, provider.clone() as Arc<dyn TemplateProvider>);
        Self {
            app: create_app(state),
            provider,
        }
    }

    async fn with_welcome_template() -> Self {
        let env = Self::new(InMemoryTemplateProvider::new());
        env.provider
            .create_template(
                "welcome",
                &TemplateContent {
                    subject: "Welcome {{name}}".to_string(),
                    html: "<p>Hi {{name}}, your code is {{code}}</p>".to_string(),
                    text: "Hi {{name}}. Reply to {{support_email}}".to_string(),
                },
            )
            .await
            .unwrap();
        env
    }

    async fn call(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }
}

fn authed(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", session_token()))
        .header("x-forwarded-for", "203.0.113.9");

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

// ============================================================================
// Send pipeline
// ============================================================================

#[tokio::test]
async fn test_send_success_returns_message_id() {
    let env = TestEnvironment::with_welcome_template().await;

    let (status, body) = env
        .call(authed(
            "POST",
            "/api/templates/send",
            Some(json!({
                "templateName": "welcome",
                "source": "a@b.com",
                "to": ["c@d.com"],
                "templateData": { "name": "Ann" }
            })),
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let message_id = body["messageId"].as_str().unwrap();
    assert!(!message_id.is_empty());

    let sent = env.provider.sent_message(message_id).unwrap();
    assert_eq!(sent.template_name, "welcome");
    assert_eq!(env.provider.send_calls(), 1);
}

#[tokio::test]
async fn test_invalid_source_is_rejected_before_provider() {
    let env = TestEnvironment::with_welcome_template().await;

    let (status, body) = env
        .call(authed(
            "POST",
            "/api/templates/send",
            Some(json!({
                "templateName": "welcome",
                "source": "not-an-email",
                "to": ["c@d.com"]
            })),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["message"].as_str().unwrap().contains("source"));
    assert_eq!(env.provider.send_calls(), 0);
}

#[tokio::test]
async fn test_empty_recipients_rejected() {
    let env = TestEnvironment::with_welcome_template().await;

    let (status, body) = env
        .call(authed(
            "POST",
            "/api/templates/send",
            Some(json!({ "templateName": "welcome", "source": "a@b.com", "to": [] })),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("at least one recipient"));
    assert_eq!(env.provider.send_calls(), 0);
}

#[tokio::test]
async fn test_missing_template_is_not_found() {
    let env = TestEnvironment::new(InMemoryTemplateProvider::new());

    let (status, body) = env
        .call(authed(
            "POST",
            "/api/templates/send",
            Some(json!({
                "templateName": "missing-template",
                "source": "a@b.com",
                "to": ["c@d.com"]
            })),
        ))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], TEMPLATE_NOT_FOUND_MESSAGE);
    assert_eq!(env.provider.send_calls(), 1);
}

#[tokio::test]
async fn test_sandbox_rejection_carries_guidance() {
    let env = TestEnvironment::new(
        InMemoryTemplateProvider::new().with_verified_identities(vec!["b.com".to_string()]),
    );
    env.provider
        .create_template("welcome", &TemplateContent::default())
        .await
        .unwrap();

    let (status, body) = env
        .call(authed(
            "POST",
            "/api/templates/send",
            Some(json!({ "templateName": "welcome", "source": "a@b.com", "to": ["c@d.com"] })),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "MESSAGE_REJECTED");
    assert_eq!(body["error"]["message"], MESSAGE_REJECTED_MESSAGE);
}

#[tokio::test]
async fn test_unauthenticated_send_never_reaches_provider() {
    let env = TestEnvironment::with_welcome_template().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/templates/send")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "templateName": "welcome", "source": "a@b.com", "to": ["c@d.com"] })
                .to_string(),
        ))
        .unwrap();

    let (status, body) = env.call(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    assert_eq!(env.provider.send_calls(), 0);
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let env = TestEnvironment::with_welcome_template().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/templates/send")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, format!("session={}", session_token()))
        .body(Body::from(
            json!({ "templateName": "welcome", "source": "a@b.com", "to": ["c@d.com"] })
                .to_string(),
        ))
        .unwrap();

    let (status, _) = env.call(request).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_malformed_body_uses_error_envelope() {
    let env = TestEnvironment::with_welcome_template().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/templates/send")
        .header(header::AUTHORIZATION, format!("Bearer {}", session_token()))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let (status, body) = env.call(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(env.provider.send_calls(), 0);
}

#[tokio::test]
async fn test_required_role_is_enforced() {
    let mut settings = test_settings();
    settings.auth.required_role = Some("super-admin".to_string());
    let env = TestEnvironment::with_settings(settings, InMemoryTemplateProvider::new());

    let (status, body) = env.call(authed("GET", "/api/templates", None)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

// ============================================================================
// Template administration
// ============================================================================

#[tokio::test]
async fn test_template_lifecycle() {
    let env = TestEnvironment::new(InMemoryTemplateProvider::new());

    let (status, created) = env
        .call(authed(
            "POST",
            "/api/templates",
            Some(json!({
                "TemplateName": "order-shipped",
                "SubjectPart": "Your order {{order_id}} shipped",
                "HtmlPart": "<p>Tracking: {{tracking}}</p>"
            })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["TemplateName"], "order-shipped");
    assert_eq!(created["id"], "order-shipped");

    let (status, _) = env
        .call(authed(
            "POST",
            "/api/templates",
            Some(json!({ "TemplateName": "order-shipped", "SubjectPart": "Again" })),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = env
        .call(authed(
            "PUT",
            "/api/templates/order-shipped",
            Some(json!({ "TextPart": "Tracking: {{tracking}}" })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["SubjectPart"], "Your order {{order_id}} shipped");
    assert_eq!(updated["TextPart"], "Tracking: {{tracking}}");

    let (status, fetched) = env
        .call(authed("GET", "/api/templates/order-shipped", None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["HtmlPart"], "<p>Tracking: {{tracking}}</p>");

    let (status, _) = env
        .call(authed("DELETE", "/api/templates/order-shipped", None))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = env
        .call(authed("GET", "/api/templates/order-shipped", None))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_requires_name_and_subject() {
    let env = TestEnvironment::new(InMemoryTemplateProvider::new());

    let (status, body) = env
        .call(authed(
            "POST",
            "/api/templates",
            Some(json!({ "TemplateName": "no-subject" })),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_list_with_search_filter() {
    let env = TestEnvironment::new(InMemoryTemplateProvider::new());
    for name in ["Welcome-Email", "password-reset", "welcome-back"] {
        env.provider
            .create_template(
                name,
                &TemplateContent {
                    subject: format!("Subject for {}", name),
                    ..TemplateContent::default()
                },
            )
            .await
            .unwrap();
    }

    let (status, all) = env.call(authed("GET", "/api/templates", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["count"], 3);

    let (status, filtered) = env
        .call(authed("GET", "/api/templates?search=WELCOME", None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(filtered["count"], 2);

    let mut names: Vec<&str> = filtered["templates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["TemplateName"].as_str().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Welcome-Email", "welcome-back"]);
}

#[tokio::test]
async fn test_placeholders_endpoint() {
    let env = TestEnvironment::with_welcome_template().await;

    let (status, body) = env
        .call(authed("GET", "/api/templates/welcome/placeholders", None))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["templateName"], "welcome");
    assert_eq!(body["placeholders"], json!(["name", "code", "support_email"]));
    assert_eq!(body["count"], 3);
}

#[tokio::test]
async fn test_malformed_template_bodies_use_error_envelope() {
    let env = TestEnvironment::with_welcome_template().await;

    for (method, uri) in [("POST", "/api/templates"), ("PUT", "/api/templates/welcome")] {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", session_token()))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = env.call(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", method, uri);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR", "{} {}", method, uri);
    }

    let request = Request::builder()
        .method("POST")
        .uri("/api/templates")
        .header(header::AUTHORIZATION, format!("Bearer {}", session_token()))
        .body(Body::from(json!({ "TemplateName": "x", "SubjectPart": "y" }).to_string()))
        .unwrap();
    let (status, body) = env.call(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body"));
}

/// Backend whose fetches carry no timestamps and whose listing does, like SES
struct ListingOnlyTimestamps {
    inner: InMemoryTemplateProvider,
    listed_at: chrono::DateTime<chrono::Utc>,
}

#[async_trait]
impl TemplateProvider for ListingOnlyTimestamps {
    async fn send_templated_email(&self, email: &TemplatedEmail) -> Result<String, ProviderError> {
        self.inner.send_templated_email(email).await
    }

    async fn list_templates(&self) -> Result<Vec<TemplateMetadata>, ProviderError> {
        let mut listed = self.inner.list_templates().await?;
        for meta in &mut listed {
            meta.created_at = Some(self.listed_at);
        }
        Ok(listed)
    }

    async fn get_template(&self, name: &str) -> Result<EmailTemplate, ProviderError> {
        let template = self.inner.get_template(name).await?;
        Ok(EmailTemplate::new(name, template.content()))
    }

    async fn create_template(
        &self,
        name: &str,
        content: &TemplateContent,
    ) -> Result<(), ProviderError> {
        self.inner.create_template(name, content).await
    }

    async fn update_template(
        &self,
        name: &str,
        content: &TemplateContent,
    ) -> Result<(), ProviderError> {
        self.inner.update_template(name, content).await
    }

    async fn delete_template(&self, name: &str) -> Result<(), ProviderError> {
        self.inner.delete_template(name).await
    }

    fn credentials_configured(&self) -> bool {
        true
    }

    fn provider_name(&self) -> &'static str {
        "listing-only-timestamps"
    }
}

#[tokio::test]
async fn test_list_fills_timestamps_from_listing() {
    let listed_at = chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    let provider = ListingOnlyTimestamps {
        inner: InMemoryTemplateProvider::new(),
        listed_at,
    };
    provider
        .create_template(
            "welcome",
            &TemplateContent {
                subject: "Hi".to_string(),
                ..TemplateContent::default()
            },
        )
        .await
        .unwrap();

    let state = AppState::new(test_settings(), Arc::new(provider));
    let app = create_app(state);

    let response = app.oneshot(authed("GET", "/api/templates", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let template = &body["templates"][0];

    let expected = serde_json::to_value(listed_at).unwrap();
    assert_eq!(template["createdAt"], expected);
    assert_eq!(template["updatedAt"], expected);
}

// ============================================================================
// Public endpoints
// ============================================================================

#[tokio::test]
async fn test_health_needs_no_session() {
    let env = TestEnvironment::new(InMemoryTemplateProvider::new());

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = env.call(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["provider"]["backend"], "memory");
}

#[tokio::test]
async fn test_metrics_exposes_send_outcomes() {
    let env = TestEnvironment::with_welcome_template().await;

    env.call(authed(
        "POST",
        "/api/templates/send",
        Some(json!({ "templateName": "welcome", "source": "a@b.com", "to": ["c@d.com"] })),
    ))
    .await;

    let response = env
        .app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain; version=0.0.4"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("ses_console_send_requests_total"));
}
