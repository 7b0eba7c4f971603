//! Broadcast endpoints.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::client::ConvertKitClient;
use crate::error::ApiError;
use crate::pagination::{ListOptions, Pagination};
use crate::request::RequestSpec;

/// A broadcast email.
#[derive(Debug, Clone, Deserialize)]
pub struct Broadcast {
    /// Broadcast ID.
    pub id: i64,
    /// Subject line.
    #[serde(default)]
    pub subject: Option<String>,
    /// Preview text shown in inboxes.
    #[serde(default)]
    pub preview_text: Option<String>,
    /// Internal description.
    #[serde(default)]
    pub description: Option<String>,
    /// HTML content.
    #[serde(default)]
    pub content: Option<String>,
    /// Whether the broadcast is publicly listed.
    #[serde(default)]
    pub public: Option<bool>,
    /// Publication time.
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Scheduled send time.
    #[serde(default)]
    pub send_at: Option<DateTime<Utc>>,
    /// Sender email address.
    #[serde(default)]
    pub email_address: Option<String>,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Envelope around a single broadcast.
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastResponse {
    /// The broadcast.
    pub broadcast: Broadcast,
}

/// One page of broadcasts.
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastList {
    /// Broadcasts on this page.
    pub broadcasts: Vec<Broadcast>,
    /// Cursor envelope.
    pub pagination: Pagination,
}

/// Delivery statistics for a broadcast.
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastStats {
    /// Recipient count.
    #[serde(default)]
    pub recipients: Option<i64>,
    /// Open rate percentage.
    #[serde(default)]
    pub open_rate: Option<f64>,
    /// Click rate percentage.
    #[serde(default)]
    pub click_rate: Option<f64>,
    /// Unsubscribes attributed to the broadcast.
    #[serde(default)]
    pub unsubscribes: Option<i64>,
    /// Total clicks.
    #[serde(default)]
    pub total_clicks: Option<i64>,
    /// Delivery status.
    #[serde(default)]
    pub status: Option<String>,
    /// Send progress percentage.
    #[serde(default)]
    pub progress: Option<f64>,
}

/// Stats envelope keyed by broadcast.
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastStatsEntry {
    /// Broadcast ID.
    pub id: i64,
    /// The statistics.
    pub stats: BroadcastStats,
}

/// Response of the broadcast stats endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastStatsResponse {
    /// The broadcast with its statistics.
    pub broadcast: BroadcastStatsEntry,
}

/// Fields for creating or updating a broadcast. Absent fields are left to
/// API defaults (create) or unchanged (update).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastOptions {
    /// Subject line.
    pub subject: Option<String>,
    /// HTML content.
    pub content: Option<String>,
    /// Internal description.
    pub description: Option<String>,
    /// Publicly list the broadcast.
    pub public: Option<bool>,
    /// Publication time.
    pub published_at: Option<DateTime<Utc>>,
    /// Scheduled send time; absent drafts are not sent.
    pub send_at: Option<DateTime<Utc>>,
    /// Sender email address.
    pub email_address: Option<String>,
    /// Email template to render with.
    pub email_template_id: Option<i64>,
    /// Preview text shown in inboxes.
    pub preview_text: Option<String>,
    /// Subscriber filter; absent targets all subscribers.
    pub subscriber_filter: Option<Value>,
}

impl BroadcastOptions {
    fn to_body(&self) -> Value {
        fn timestamp(value: &DateTime<Utc>) -> Value {
            json!(value.to_rfc3339_opts(SecondsFormat::Secs, true))
        }

        let mut body = Map::new();
        if let Some(subject) = &self.subject {
            body.insert("subject".into(), json!(subject));
        }
        if let Some(content) = &self.content {
            body.insert("content".into(), json!(content));
        }
        if let Some(description) = &self.description {
            body.insert("description".into(), json!(description));
        }
        if let Some(public) = self.public {
            body.insert("public".into(), json!(public));
        }
        if let Some(published_at) = &self.published_at {
            body.insert("published_at".into(), timestamp(published_at));
        }
        if let Some(send_at) = &self.send_at {
            body.insert("send_at".into(), timestamp(send_at));
        }
        if let Some(email_address) = &self.email_address {
            body.insert("email_address".into(), json!(email_address));
        }
        if let Some(email_template_id) = self.email_template_id {
            body.insert("email_template_id".into(), json!(email_template_id));
        }
        if let Some(preview_text) = &self.preview_text {
            body.insert("preview_text".into(), json!(preview_text));
        }
        if let Some(subscriber_filter) = &self.subscriber_filter {
            body.insert("subscriber_filter".into(), subscriber_filter.clone());
        }
        Value::Object(body)
    }
}

impl ConvertKitClient {
    /// List broadcasts.
    pub async fn get_broadcasts(&self, options: &ListOptions) -> Result<BroadcastList, ApiError> {
        let spec = options.apply_to(RequestSpec::get("broadcasts"))?;
        self.execute_json(spec).await
    }

    /// Create a broadcast. Without `send_at` the broadcast stays a draft.
    pub async fn create_broadcast(
        &self,
        options: &BroadcastOptions,
    ) -> Result<BroadcastResponse, ApiError> {
        let spec = RequestSpec::post("broadcasts").body(options.to_body());
        self.execute_json(spec).await
    }

    /// Fetch one broadcast.
    pub async fn get_broadcast(&self, broadcast_id: i64) -> Result<BroadcastResponse, ApiError> {
        self.execute_json(RequestSpec::get(format!("broadcasts/{broadcast_id}")))
            .await
    }

    /// Update a broadcast.
    pub async fn update_broadcast(
        &self,
        broadcast_id: i64,
        options: &BroadcastOptions,
    ) -> Result<BroadcastResponse, ApiError> {
        let spec =
            RequestSpec::put(format!("broadcasts/{broadcast_id}")).body(options.to_body());
        self.execute_json(spec).await
    }

    /// Delete a broadcast.
    pub async fn delete_broadcast(&self, broadcast_id: i64) -> Result<(), ApiError> {
        self.execute_json(RequestSpec::delete(format!("broadcasts/{broadcast_id}")))
            .await
    }

    /// Fetch delivery statistics for a broadcast.
    pub async fn get_broadcast_stats(
        &self,
        broadcast_id: i64,
    ) -> Result<BroadcastStatsResponse, ApiError> {
        self.execute_json(RequestSpec::get(format!("broadcasts/{broadcast_id}/stats")))
            .await
    }
}
