//! Sequence endpoints.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::client::ConvertKitClient;
use crate::error::ApiError;
use crate::pagination::{ListOptions, Pagination};
use crate::request::RequestSpec;
use crate::resources::subscribers::{SubscriberList, SubscriberResponse};
use crate::resources::{validate_email, SubscriptionFilter};

/// An email sequence.
#[derive(Debug, Clone, Deserialize)]
pub struct Sequence {
    /// Sequence ID.
    pub id: i64,
    /// Sequence name.
    pub name: String,
    /// Whether new subscriptions are held.
    #[serde(default)]
    pub hold: Option<bool>,
    /// Whether subscribers can repeat the sequence.
    #[serde(default)]
    pub repeat: Option<bool>,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One page of sequences.
#[derive(Debug, Clone, Deserialize)]
pub struct SequenceList {
    /// Sequences on this page.
    pub sequences: Vec<Sequence>,
    /// Cursor envelope.
    pub pagination: Pagination,
}

impl ConvertKitClient {
    /// List sequences.
    pub async fn get_sequences(&self, options: &ListOptions) -> Result<SequenceList, ApiError> {
        let spec = options.apply_to(RequestSpec::get("sequences"))?;
        self.execute_json(spec).await
    }

    /// Add an existing subscriber to a sequence.
    pub async fn add_subscriber_to_sequence(
        &self,
        sequence_id: i64,
        subscriber_id: i64,
    ) -> Result<SubscriberResponse, ApiError> {
        let spec =
            RequestSpec::post(format!("sequences/{sequence_id}/subscribers/{subscriber_id}"));
        self.execute_json(spec).await
    }

    /// Add a subscriber to a sequence by email address, creating the
    /// subscriber if needed.
    pub async fn add_subscriber_to_sequence_by_email(
        &self,
        sequence_id: i64,
        email_address: &str,
    ) -> Result<SubscriberResponse, ApiError> {
        validate_email(email_address)?;

        let spec = RequestSpec::post(format!("sequences/{sequence_id}/subscribers"))
            .body(json!({"email_address": email_address}));
        self.execute_json(spec).await
    }

    /// List the subscribers in a sequence.
    pub async fn get_sequence_subscriptions(
        &self,
        sequence_id: i64,
        filter: &SubscriptionFilter,
        options: &ListOptions,
    ) -> Result<SubscriberList, ApiError> {
        let spec =
            filter.apply_to(RequestSpec::get(format!("sequences/{sequence_id}/subscribers")));
        let spec = options.apply_to(spec)?;
        self.execute_json(self.with_secret(spec)?).await
    }
}
