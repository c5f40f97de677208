use std::sync::Arc;

use crate::api::ApiClient;
use crate::auth::session::{FileSessionStore, Session};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub session: Session,
    pub api: ApiClient,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = FileSessionStore::new(&config.session_file);
        tracing::debug!(path = %store.path().display(), "opening session");
        let session = Session::open(Arc::new(store))?;
        Self::from_parts(config, session)
    }

    pub fn from_parts(config: Arc<AppConfig>, session: Session) -> anyhow::Result<Self> {
        let api = ApiClient::new(&config.api_base_url, config.timeout, session.clone())?;
        Ok(Self {
            config,
            session,
            api,
        })
    }

    #[cfg(test)]
    pub fn fake(base_url: &str) -> Self {
        use crate::config::{DEFAULT_PAGE_SIZE, DEFAULT_REDIRECT_DELAY_MS};
        use std::time::Duration;

        let config = Arc::new(AppConfig {
            api_base_url: base_url.trim_end_matches('/').to_string(),
            session_file: "session.json".into(),
            timeout: Duration::from_secs(5),
            page_size: DEFAULT_PAGE_SIZE,
            redirect_delay: Duration::from_millis(DEFAULT_REDIRECT_DELAY_MS),
        });
        Self::from_parts(config, Session::in_memory()).expect("fake state")
    }
}
