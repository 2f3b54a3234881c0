//! REST client for the console backend.
//!
//! All endpoints speak camelCase JSON. Any transport failure, non-2xx status
//! or undecodable body is reported as [`ConsoleError::Network`].

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::client::models::wallpaper::Wallpaper;
use crate::client::services::moderation::WallpaperSource;
use crate::common::config::ConsoleConfig;
use crate::common::errors::{ConsoleError, Result};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscribersResponse {
    total_subscribers: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmailsResponse {
    total_emails: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailRequest<'a> {
    user_id: &'a str,
    subject: &'a str,
    body: &'a str,
}

// the list endpoint has been seen both bare and wrapped
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WallpaperList {
    Bare(Vec<Wallpaper>),
    Wrapped { wallpapers: Vec<Wallpaper> },
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self { client: Client::new(), base_url: base_url.trim_end_matches('/').to_string() }
    }

    pub fn from_config(config: &ConsoleConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| ConsoleError::Config(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.api_base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if !status.is_success() {
            let url = response.url().path().to_string();
            return Err(ConsoleError::Network(format!("HTTP {} from {}", status, url)));
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let response = Self::check(response)?;
        response
            .json::<T>()
            .await
            .map_err(|e| ConsoleError::Network(format!("invalid response body: {}", e)))
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let resp = self
            .client
            .post(self.url("/login"))
            .json(&LoginRequest { username, password })
            .send()
            .await?;
        let body: LoginResponse = Self::decode(resp).await?;
        Ok(body.user_id)
    }

    pub async fn total_subscribers(&self) -> Result<u64> {
        let resp = self.client.get(self.url("/total-subscribers")).send().await?;
        let body: SubscribersResponse = Self::decode(resp).await?;
        Ok(body.total_subscribers)
    }

    pub async fn total_emails_sent(&self, user_id: &str) -> Result<u64> {
        let resp = self
            .client
            .get(self.url("/total-emails"))
            .query(&[("userId", user_id)])
            .send()
            .await?;
        let body: EmailsResponse = Self::decode(resp).await?;
        Ok(body.total_emails)
    }

    pub async fn send_email(&self, user_id: &str, subject: &str, body: &str) -> Result<()> {
        self.post_email("/send-email", user_id, subject, body).await
    }

    pub async fn send_test_email(&self, user_id: &str, subject: &str, body: &str) -> Result<()> {
        self.post_email("/send-test-email", user_id, subject, body).await
    }

    async fn post_email(&self, path: &str, user_id: &str, subject: &str, body: &str) -> Result<()> {
        let resp = self
            .client
            .post(self.url(path))
            .json(&SendEmailRequest { user_id, subject, body })
            .send()
            .await?;
        Self::check(resp)?;
        Ok(())
    }

    pub async fn list_wallpapers(&self) -> Result<Vec<Wallpaper>> {
        let resp = self.client.get(self.url("/wallpapers")).send().await?;
        let list: WallpaperList = Self::decode(resp).await?;
        let items = match list {
            WallpaperList::Bare(items) => items,
            WallpaperList::Wrapped { wallpapers } => wallpapers,
        };
        debug!("Fetched {} wallpapers", items.len());
        Ok(items)
    }

    /// `/wallpapers/{id}/approve` with the id as a single encoded segment.
    fn approve_url(&self, id: &str) -> Result<Url> {
        // dot segments would be resolved away by the server
        if id == "." || id == ".." {
            return Err(ConsoleError::Validation(format!("'{}' is not a usable wallpaper identifier", id)));
        }
        let mut url = Url::parse(&self.url("/wallpapers"))
            .map_err(|e| ConsoleError::Config(format!("API base URL '{}': {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ConsoleError::Config(format!("API base URL '{}' cannot carry a path", self.base_url)))?
            .push(id)
            .push("approve");
        Ok(url)
    }

    pub async fn approve_wallpaper(&self, id: &str) -> Result<()> {
        let url = self.approve_url(id)?;
        let resp = self.client.post(url).send().await?;
        Self::check(resp)?;
        Ok(())
    }
}

#[async_trait]
impl WallpaperSource for ApiClient {
    async fn list_items(&self) -> Result<Vec<Wallpaper>> {
        self.list_wallpapers().await
    }

    async fn approve_item(&self, id: &str) -> Result<()> {
        self.approve_wallpaper(id).await
    }
}
