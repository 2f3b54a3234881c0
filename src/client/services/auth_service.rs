use std::sync::Arc;

use log::info;

use crate::client::services::api_client::ApiClient;
use crate::client::utils::session_store::SessionStore;
use crate::common::errors::{ConsoleError, Result};

pub struct AuthService {
    api: ApiClient,
    session: Arc<SessionStore>,
}

impl AuthService {
    pub fn new(api: ApiClient, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    /// Signs in and stores the returned user id.
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        if username.trim().is_empty() || password.trim().is_empty() {
            return Err(ConsoleError::Validation("all credentials are required to proceed".to_string()));
        }
        let user_id = self.api.login(username, password).await?;
        self.session.save(&user_id)?;
        info!("Signed in as {}", username);
        Ok(user_id)
    }

    pub fn logout(&self) -> Result<()> {
        self.session.clear()?;
        info!("Session cleared");
        Ok(())
    }

    pub fn current_user(&self) -> Option<String> {
        self.session.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::utils::local_store::{LocalStore, MemoryStore};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session() -> Arc<SessionStore> {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        Arc::new(SessionStore::local(store))
    }

    #[tokio::test]
    async fn blank_credentials_never_hit_the_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).and(path("/login")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let auth = AuthService::new(ApiClient::new(&server.uri()), session());
        assert!(auth.login("  ", "pw").await.unwrap_err().is_validation());
        assert!(auth.login("root", "").await.unwrap_err().is_validation());
        assert_eq!(auth.current_user(), None);
    }

    #[tokio::test]
    async fn login_then_logout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"userId": "u-7"})))
            .mount(&server)
            .await;

        let auth = AuthService::new(ApiClient::new(&server.uri()), session());
        assert_eq!(auth.login("root", "pw").await.unwrap(), "u-7");
        assert_eq!(auth.current_user().as_deref(), Some("u-7"));

        auth.logout().unwrap();
        assert_eq!(auth.current_user(), None);
    }

    #[tokio::test]
    async fn failed_login_stores_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).and(path("/login")).respond_with(ResponseTemplate::new(403)).mount(&server).await;

        let auth = AuthService::new(ApiClient::new(&server.uri()), session());
        assert!(auth.login("root", "pw").await.unwrap_err().is_network());
        assert_eq!(auth.current_user(), None);
    }
}
