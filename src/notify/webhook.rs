use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, instrument, warn};

use super::{Announcement, Notifier};

/// Posts announcements as `{"embeds": [...]}` to every configured webhook URL
pub struct WebhookNotifier {
    client: Client,
    urls: Vec<String>,
}

impl WebhookNotifier {
    pub fn new(client: Client, urls: Vec<String>) -> Self {
        Self { client, urls }
    }

    async fn post(&self, url: &str, payload: &serde_json::Value) {
        match self.client.post(url).json(payload).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(url = %url, "Announcement delivered");
            }
            Ok(response) => {
                warn!(url = %url, status = %response.status(), "Announcement rejected by destination");
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Announcement delivery failed");
            }
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    #[instrument(skip(self, announcement), fields(title = %announcement.title, destinations = self.urls.len()))]
    async fn broadcast(&self, announcement: &Announcement) {
        if self.urls.is_empty() {
            debug!("No broadcast destination configured, skipping announcement");
            return;
        }

        let payload = json!({ "embeds": [announcement] });
        join_all(self.urls.iter().map(|url| self.post(url, &payload))).await;
    }
}
