use std::sync::Arc;

use log::info;

use crate::client::models::draft::Draft;
use crate::client::services::api_client::ApiClient;
use crate::client::utils::session_store::SessionStore;
use crate::common::errors::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub total_subscribers: u64,
    pub total_emails_sent: u64,
}

/// Campaign sending and the dashboard counters. Every call needs a session.
pub struct NewsletterService {
    api: ApiClient,
    session: Arc<SessionStore>,
}

impl NewsletterService {
    pub fn new(api: ApiClient, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    pub async fn stats(&self) -> Result<DashboardStats> {
        let user_id = self.session.require_user_id()?;
        let total_subscribers = self.api.total_subscribers().await?;
        let total_emails_sent = self.api.total_emails_sent(&user_id).await?;
        Ok(DashboardStats { total_subscribers, total_emails_sent })
    }

    pub async fn send(&self, draft: &Draft) -> Result<()> {
        draft.validate()?;
        let user_id = self.session.require_user_id()?;
        self.api.send_email(&user_id, &draft.subject, &draft.content).await?;
        info!("Newsletter '{}' sent ({} chars)", draft.subject, draft.char_count());
        Ok(())
    }

    pub async fn send_test(&self, draft: &Draft) -> Result<()> {
        draft.validate()?;
        let user_id = self.session.require_user_id()?;
        self.api.send_test_email(&user_id, &draft.subject, &draft.content).await?;
        info!("Test newsletter '{}' sent", draft.subject);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::utils::local_store::{LocalStore, MemoryStore};
    use crate::common::errors::ConsoleError;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn signed_in(user_id: Option<&str>) -> Arc<SessionStore> {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        let session = SessionStore::local(store);
        if let Some(id) = user_id {
            session.save(id).unwrap();
        }
        Arc::new(session)
    }

    #[tokio::test]
    async fn stats_need_a_session() {
        let server = MockServer::start().await;
        let svc = NewsletterService::new(ApiClient::new(&server.uri()), signed_in(None));
        assert!(matches!(svc.stats().await, Err(ConsoleError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn stats_combine_both_counters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/total-subscribers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"totalSubscribers": 42})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/total-emails"))
            .and(query_param("userId", "u-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"totalEmails": 3})))
            .mount(&server)
            .await;

        let svc = NewsletterService::new(ApiClient::new(&server.uri()), signed_in(Some("u-1")));
        assert_eq!(svc.stats().await.unwrap(), DashboardStats { total_subscribers: 42, total_emails_sent: 3 });
    }

    #[tokio::test]
    async fn invalid_draft_is_not_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let svc = NewsletterService::new(ApiClient::new(&server.uri()), signed_in(Some("u-1")));
        assert!(svc.send(&Draft::new("", "body")).await.unwrap_err().is_validation());
        assert!(svc.send_test(&Draft::new("subject", " ")).await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn send_and_test_send_use_their_endpoints() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send-email"))
            .and(body_json(serde_json::json!({"userId": "u-1", "subject": "Weekly", "body": "news"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"sent": 42})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/send-test-email"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let svc = NewsletterService::new(ApiClient::new(&server.uri()), signed_in(Some("u-1")));
        let draft = Draft::new("Weekly", "news");
        svc.send(&draft).await.unwrap();
        svc.send_test(&draft).await.unwrap();
    }
}
