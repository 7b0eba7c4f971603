//! Tag endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::ConvertKitClient;
use crate::error::ApiError;
use crate::pagination::{ListOptions, Pagination};
use crate::request::RequestSpec;
use crate::resources::subscribers::{SubscriberList, SubscriberResponse};
use crate::resources::{date_param, validate_email, SubscriberState};

/// A tag.
#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    /// Tag ID.
    pub id: i64,
    /// Tag name.
    pub name: String,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Envelope around a single tag.
#[derive(Debug, Clone, Deserialize)]
pub struct TagResponse {
    /// The tag.
    pub tag: Tag,
}

/// One page of tags.
#[derive(Debug, Clone, Deserialize)]
pub struct TagList {
    /// Tags on this page.
    pub tags: Vec<Tag>,
    /// Cursor envelope.
    pub pagination: Pagination,
}

/// Outcome of a bulk tag creation.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkTagsResponse {
    /// Tags that were created.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Per-entry failures reported by the API.
    #[serde(default)]
    pub failures: Vec<Value>,
}

/// Filter accepted by tag subscription listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagSubscriptionFilter {
    /// Restrict to one subscriber state (API default: active).
    pub status: Option<SubscriberState>,
    /// Tagged on or after this date.
    pub tagged_after: Option<NaiveDate>,
    /// Tagged on or before this date.
    pub tagged_before: Option<NaiveDate>,
    /// Subscriber created on or after this date.
    pub created_after: Option<NaiveDate>,
    /// Subscriber created on or before this date.
    pub created_before: Option<NaiveDate>,
}

impl TagSubscriptionFilter {
    fn apply_to(&self, spec: RequestSpec) -> RequestSpec {
        spec.query_opt("status", self.status.map(SubscriberState::as_str))
            .query_opt("tagged_after", self.tagged_after.map(date_param))
            .query_opt("tagged_before", self.tagged_before.map(date_param))
            .query_opt("created_after", self.created_after.map(date_param))
            .query_opt("created_before", self.created_before.map(date_param))
    }
}

impl ConvertKitClient {
    /// List tags.
    pub async fn get_tags(&self, options: &ListOptions) -> Result<TagList, ApiError> {
        let spec = options.apply_to(RequestSpec::get("tags"))?;
        self.execute_json(spec).await
    }

    /// Create a tag.
    pub async fn create_tag(&self, name: &str) -> Result<TagResponse, ApiError> {
        if name.trim().is_empty() {
            return Err(ApiError::InvalidArgument("tag name must not be blank".into()));
        }

        let spec = RequestSpec::post("tags").body(json!({"name": name}));
        self.execute_json(spec).await
    }

    /// Create several tags in one call.
    pub async fn create_tags(&self, names: &[String]) -> Result<BulkTagsResponse, ApiError> {
        if names.is_empty() {
            return Err(ApiError::InvalidArgument(
                "at least one tag name is required".into(),
            ));
        }

        let body = json!({
            "tags": names.iter().map(|name| json!({"name": name})).collect::<Vec<_>>(),
        });
        self.execute_json(RequestSpec::post("bulk/tags").body(body))
            .await
    }

    /// Rename a tag.
    pub async fn update_tag(&self, tag_id: i64, name: &str) -> Result<TagResponse, ApiError> {
        if name.trim().is_empty() {
            return Err(ApiError::InvalidArgument("tag name must not be blank".into()));
        }

        let spec = RequestSpec::put(format!("tags/{tag_id}")).body(json!({"name": name}));
        self.execute_json(spec).await
    }

    /// Tag a subscriber by subscriber ID.
    pub async fn tag_subscriber(
        &self,
        tag_id: i64,
        subscriber_id: i64,
    ) -> Result<SubscriberResponse, ApiError> {
        let spec = RequestSpec::post(format!("tags/{tag_id}/subscribers/{subscriber_id}"));
        self.execute_json(spec).await
    }

    /// Tag a subscriber by email address, creating the subscriber if
    /// needed.
    pub async fn tag_subscriber_by_email(
        &self,
        tag_id: i64,
        email_address: &str,
    ) -> Result<SubscriberResponse, ApiError> {
        validate_email(email_address)?;

        let spec = RequestSpec::post(format!("tags/{tag_id}/subscribers"))
            .body(json!({"email_address": email_address}));
        self.execute_json(spec).await
    }

    /// Remove a tag from a subscriber.
    pub async fn remove_tag_from_subscriber(
        &self,
        tag_id: i64,
        subscriber_id: i64,
    ) -> Result<(), ApiError> {
        let spec = RequestSpec::delete(format!("tags/{tag_id}/subscribers/{subscriber_id}"));
        self.execute_json(spec).await
    }

    /// Remove a tag from the subscriber with the given email address.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidArgument`] when no subscriber exists with the
    /// given address.
    pub async fn remove_tag_from_subscriber_by_email(
        &self,
        tag_id: i64,
        email_address: &str,
    ) -> Result<(), ApiError> {
        let subscriber_id = self.get_subscriber_id(email_address).await?.ok_or_else(|| {
            ApiError::InvalidArgument(format!(
                "no subscriber found with email address {email_address}"
            ))
        })?;
        self.remove_tag_from_subscriber(tag_id, subscriber_id).await
    }

    /// List the subscribers carrying a tag.
    pub async fn get_tag_subscriptions(
        &self,
        tag_id: i64,
        filter: &TagSubscriptionFilter,
        options: &ListOptions,
    ) -> Result<SubscriberList, ApiError> {
        let spec = filter.apply_to(RequestSpec::get(format!("tags/{tag_id}/subscribers")));
        let spec = options.apply_to(spec)?;
        self.execute_json(self.with_secret(spec)?).await
    }
}
