use std::sync::Arc;
use std::time::Instant;

use crate::auth::AccessGate;
use crate::config::Settings;
use crate::provider::TemplateProvider;
use crate::send::TemplateSendDispatcher;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub gate: Arc<AccessGate>,
    pub provider: Arc<dyn TemplateProvider>,
    pub dispatcher: Arc<TemplateSendDispatcher>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: Settings, provider: Arc<dyn TemplateProvider>) -> Self {
        let gate = Arc::new(AccessGate::new(
            &settings.auth,
            &settings.api,
            provider.credentials_configured(),
        ));
        let dispatcher = Arc::new(TemplateSendDispatcher::new(provider.clone()));

        Self {
            settings: Arc::new(settings),
            gate,
            provider,
            dispatcher,
            start_time: Instant::now(),
        }
    }
}
