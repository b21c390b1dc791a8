use crate::config::AppConfig;
use crate::credentials::CredentialDirectory;
use crate::upstream::NutritionSource;
use std::sync::Arc;

/// Shared, read-only request context.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub credentials: Arc<CredentialDirectory>,
    pub source: Arc<dyn NutritionSource>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        credentials: CredentialDirectory,
        source: Arc<dyn NutritionSource>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            credentials: Arc::new(credentials),
            source,
        }
    }
}
