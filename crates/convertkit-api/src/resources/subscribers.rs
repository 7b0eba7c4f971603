//! Subscriber endpoints.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::client::ConvertKitClient;
use crate::error::ApiError;
use crate::pagination::{ListOptions, Pagination};
use crate::request::RequestSpec;
use crate::resources::tags::TagList;
use crate::resources::{
    date_param, validate_email, SortOrder, SubscriberSortField, SubscriberState,
};

/// A subscriber record.
#[derive(Debug, Clone, Deserialize)]
pub struct Subscriber {
    /// Subscriber ID.
    pub id: i64,
    /// First name, when captured.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Email address.
    pub email_address: String,
    /// Lifecycle state (`active`, `bounced`, ...).
    #[serde(default)]
    pub state: Option<String>,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Custom field values keyed by field key.
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

/// Envelope around a single subscriber.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriberResponse {
    /// The subscriber.
    pub subscriber: Subscriber,
}

/// One page of subscribers.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriberList {
    /// Subscribers on this page.
    pub subscribers: Vec<Subscriber>,
    /// Cursor envelope.
    pub pagination: Pagination,
}

/// Outcome of a bulk subscriber creation.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkSubscribersResponse {
    /// Subscribers that were created.
    #[serde(default)]
    pub subscribers: Vec<Subscriber>,
    /// Per-entry failures reported by the API.
    #[serde(default)]
    pub failures: Vec<Value>,
}

/// Filter for [`ConvertKitClient::get_subscribers`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriberFilter {
    /// Exact email address to look up.
    pub email_address: Option<String>,
    /// Restrict to one lifecycle state (API default: active).
    pub status: Option<SubscriberState>,
    /// Created on or after this date.
    pub created_after: Option<NaiveDate>,
    /// Created on or before this date.
    pub created_before: Option<NaiveDate>,
    /// Updated on or after this date.
    pub updated_after: Option<NaiveDate>,
    /// Updated on or before this date.
    pub updated_before: Option<NaiveDate>,
    /// Sort field (API default: id).
    pub sort_field: Option<SubscriberSortField>,
    /// Sort direction (API default: descending).
    pub sort_order: Option<SortOrder>,
}

/// Fields for creating one subscriber.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateSubscriberOptions {
    /// Email address (required).
    pub email_address: String,
    /// First name.
    pub first_name: Option<String>,
    /// Initial lifecycle state.
    pub state: Option<SubscriberState>,
    /// Custom field values keyed by field key.
    pub fields: Option<HashMap<String, String>>,
}

impl CreateSubscriberOptions {
    /// Options for a bare email subscription.
    pub fn new(email_address: impl Into<String>) -> Self {
        Self {
            email_address: email_address.into(),
            ..Self::default()
        }
    }

    fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("email_address".into(), json!(self.email_address));
        if let Some(first_name) = &self.first_name {
            body.insert("first_name".into(), json!(first_name));
        }
        if let Some(state) = self.state {
            body.insert("state".into(), json!(state.as_str()));
        }
        if let Some(fields) = &self.fields {
            body.insert("fields".into(), json!(fields));
        }
        Value::Object(body)
    }
}

/// Changes for [`ConvertKitClient::update_subscriber`]. Absent fields are
/// left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSubscriberOptions {
    /// New first name.
    pub first_name: Option<String>,
    /// New email address.
    pub email_address: Option<String>,
    /// Custom field values to set, keyed by field key.
    pub fields: Option<HashMap<String, String>>,
}

impl ConvertKitClient {
    /// List subscribers.
    pub async fn get_subscribers(
        &self,
        filter: &SubscriberFilter,
        options: &ListOptions,
    ) -> Result<SubscriberList, ApiError> {
        if let Some(email) = &filter.email_address {
            validate_email(email)?;
        }

        let spec = RequestSpec::get("subscribers")
            .query_opt("email_address", filter.email_address.as_deref())
            .query_opt("status", filter.status.map(SubscriberState::as_str))
            .query_opt("created_after", filter.created_after.map(date_param))
            .query_opt("created_before", filter.created_before.map(date_param))
            .query_opt("updated_after", filter.updated_after.map(date_param))
            .query_opt("updated_before", filter.updated_before.map(date_param))
            .query_opt("sort_field", filter.sort_field.map(SubscriberSortField::as_str))
            .query_opt("sort_order", filter.sort_order.map(SortOrder::as_str));
        let spec = options.apply_to(spec)?;

        self.execute_json(self.with_secret(spec)?).await
    }

    /// Create a subscriber.
    pub async fn create_subscriber(
        &self,
        options: &CreateSubscriberOptions,
    ) -> Result<SubscriberResponse, ApiError> {
        validate_email(&options.email_address)?;

        let spec = RequestSpec::post("subscribers").body(options.to_body());
        self.execute_json(spec).await
    }

    /// Create several subscribers in one call.
    pub async fn create_subscribers(
        &self,
        subscribers: &[CreateSubscriberOptions],
    ) -> Result<BulkSubscribersResponse, ApiError> {
        if subscribers.is_empty() {
            return Err(ApiError::InvalidArgument(
                "at least one subscriber is required".into(),
            ));
        }
        for subscriber in subscribers {
            validate_email(&subscriber.email_address)?;
        }

        let body = json!({
            "subscribers": subscribers
                .iter()
                .map(CreateSubscriberOptions::to_body)
                .collect::<Vec<_>>(),
        });
        self.execute_json(RequestSpec::post("bulk/subscribers").body(body))
            .await
    }

    /// Look up the subscriber ID for an email address. `Ok(None)` means no
    /// subscriber exists with that address; failures remain errors.
    pub async fn get_subscriber_id(&self, email_address: &str) -> Result<Option<i64>, ApiError> {
        validate_email(email_address)?;

        let filter = SubscriberFilter {
            email_address: Some(email_address.to_string()),
            ..SubscriberFilter::default()
        };
        let list = self.get_subscribers(&filter, &ListOptions::new()).await?;
        Ok(list.subscribers.first().map(|subscriber| subscriber.id))
    }

    /// Fetch one subscriber by ID.
    pub async fn get_subscriber(&self, subscriber_id: i64) -> Result<SubscriberResponse, ApiError> {
        let spec = RequestSpec::get(format!("subscribers/{subscriber_id}"));
        self.execute_json(self.with_secret(spec)?).await
    }

    /// Update a subscriber.
    pub async fn update_subscriber(
        &self,
        subscriber_id: i64,
        changes: &UpdateSubscriberOptions,
    ) -> Result<SubscriberResponse, ApiError> {
        if let Some(email) = &changes.email_address {
            validate_email(email)?;
        }

        let mut body = Map::new();
        if let Some(first_name) = &changes.first_name {
            body.insert("first_name".into(), json!(first_name));
        }
        if let Some(email_address) = &changes.email_address {
            body.insert("email_address".into(), json!(email_address));
        }
        if let Some(fields) = &changes.fields {
            body.insert("fields".into(), json!(fields));
        }

        let spec =
            RequestSpec::put(format!("subscribers/{subscriber_id}")).body(Value::Object(body));
        self.execute_json(spec).await
    }

    /// Unsubscribe a subscriber by ID.
    pub async fn unsubscribe(&self, subscriber_id: i64) -> Result<(), ApiError> {
        let spec = RequestSpec::post(format!("subscribers/{subscriber_id}/unsubscribe"));
        self.execute_json(self.with_secret(spec)?).await
    }

    /// Unsubscribe a subscriber by email address.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidArgument`] when no subscriber exists with the
    /// given address.
    pub async fn unsubscribe_by_email(&self, email_address: &str) -> Result<(), ApiError> {
        let subscriber_id = self.get_subscriber_id(email_address).await?.ok_or_else(|| {
            ApiError::InvalidArgument(format!(
                "no subscriber found with email address {email_address}"
            ))
        })?;
        self.unsubscribe(subscriber_id).await
    }

    /// List the tags on a subscriber.
    pub async fn get_subscriber_tags(
        &self,
        subscriber_id: i64,
        options: &ListOptions,
    ) -> Result<TagList, ApiError> {
        let spec = RequestSpec::get(format!("subscribers/{subscriber_id}/tags"));
        let spec = options.apply_to(spec)?;
        self.execute_json(self.with_secret(spec)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_options_serialize_only_present_fields() {
        let options = CreateSubscriberOptions::new("owner@name.com");
        assert_eq!(options.to_body(), json!({"email_address": "owner@name.com"}));

        let options = CreateSubscriberOptions {
            email_address: "owner@name.com".into(),
            first_name: Some("Owner".into()),
            state: Some(SubscriberState::Inactive),
            fields: Some(HashMap::from([("last_name".to_string(), "Name".to_string())])),
        };
        assert_eq!(
            options.to_body(),
            json!({
                "email_address": "owner@name.com",
                "first_name": "Owner",
                "state": "inactive",
                "fields": {"last_name": "Name"},
            })
        );
    }

    #[test]
    fn subscriber_decodes_with_minimal_fields() {
        let subscriber: Subscriber = serde_json::from_value(json!({
            "id": 42,
            "email_address": "owner@name.com",
        }))
        .unwrap();
        assert_eq!(subscriber.id, 42);
        assert!(subscriber.first_name.is_none());
        assert!(subscriber.fields.is_empty());
    }
}
