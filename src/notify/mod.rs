pub mod embeds;
mod webhook;

pub use webhook::WebhookNotifier;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Embed-like message broadcast to the configured destinations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub title: String,
    pub description: String,
    pub color: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<AnnouncementField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnouncementField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

/// Broadcast sink. Delivery is best effort: failures are logged by the
/// implementation and never reach the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn broadcast(&self, announcement: &Announcement);
}
