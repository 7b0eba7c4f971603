//! Form and landing page endpoints.
//!
//! Landing pages share the forms endpoint; they are forms of type `hosted`.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::client::ConvertKitClient;
use crate::error::ApiError;
use crate::pagination::{ListOptions, Pagination};
use crate::request::RequestSpec;
use crate::resources::subscribers::{Subscriber, SubscriberList, SubscriberResponse};
use crate::resources::{validate_email, SubscriptionFilter};

/// Form visibility states accepted by the listing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStatus {
    /// Live forms (API default).
    Active,
    /// Archived forms.
    Archived,
    /// Deleted forms.
    Trashed,
    /// Every form regardless of state.
    All,
}

impl FormStatus {
    fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
            Self::Trashed => "trashed",
            Self::All => "all",
        }
    }
}

/// A form or landing page.
#[derive(Debug, Clone, Deserialize)]
pub struct Form {
    /// Form ID.
    pub id: i64,
    /// Form name.
    pub name: String,
    /// `embed` for forms, `hosted` for landing pages.
    #[serde(rename = "type", default)]
    pub form_type: Option<String>,
    /// Form format (inline, modal, ...).
    #[serde(default)]
    pub format: Option<String>,
    /// Public embed URL.
    #[serde(default)]
    pub embed_url: Option<String>,
    /// Embed JavaScript snippet URL.
    #[serde(default)]
    pub embed_js: Option<String>,
    /// Whether the form is archived.
    #[serde(default)]
    pub archived: Option<bool>,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One page of forms.
#[derive(Debug, Clone, Deserialize)]
pub struct FormList {
    /// Forms on this page.
    pub forms: Vec<Form>,
    /// Cursor envelope.
    pub pagination: Pagination,
}

/// One form/subscriber pair for bulk form subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormSubscription {
    /// Target form.
    pub form_id: i64,
    /// Subscriber to add.
    pub subscriber_id: i64,
}

/// Outcome of a bulk form subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkFormSubscriptionsResponse {
    /// Subscribers that were added.
    #[serde(default)]
    pub subscribers: Vec<Subscriber>,
    /// Per-entry failures reported by the API.
    #[serde(default)]
    pub failures: Vec<Value>,
}

impl ConvertKitClient {
    /// List forms.
    pub async fn get_forms(
        &self,
        status: Option<FormStatus>,
        options: &ListOptions,
    ) -> Result<FormList, ApiError> {
        self.list_forms("embed", status, options).await
    }

    /// List landing pages.
    pub async fn get_landing_pages(
        &self,
        status: Option<FormStatus>,
        options: &ListOptions,
    ) -> Result<FormList, ApiError> {
        self.list_forms("hosted", status, options).await
    }

    async fn list_forms(
        &self,
        form_type: &str,
        status: Option<FormStatus>,
        options: &ListOptions,
    ) -> Result<FormList, ApiError> {
        let spec = RequestSpec::get("forms")
            .query("type", form_type)
            .query_opt("status", status.map(FormStatus::as_str));
        let spec = options.apply_to(spec)?;
        self.execute_json(spec).await
    }

    /// List the subscribers added through a form.
    pub async fn get_form_subscriptions(
        &self,
        form_id: i64,
        filter: &SubscriptionFilter,
        options: &ListOptions,
    ) -> Result<SubscriberList, ApiError> {
        let spec = filter.apply_to(RequestSpec::get(format!("forms/{form_id}/subscribers")));
        let spec = options.apply_to(spec)?;
        self.execute_json(self.with_secret(spec)?).await
    }

    /// Add an existing subscriber to a form.
    pub async fn add_subscriber_to_form(
        &self,
        form_id: i64,
        subscriber_id: i64,
        referrer: Option<&str>,
    ) -> Result<SubscriberResponse, ApiError> {
        let mut body = Map::new();
        if let Some(referrer) = referrer {
            body.insert("referrer".into(), json!(referrer));
        }

        let spec = RequestSpec::post(format!("forms/{form_id}/subscribers/{subscriber_id}"))
            .body(Value::Object(body));
        self.execute_json(spec).await
    }

    /// Add a subscriber to a form by email address, creating the subscriber
    /// if needed.
    pub async fn add_subscriber_to_form_by_email(
        &self,
        form_id: i64,
        email_address: &str,
        referrer: Option<&str>,
    ) -> Result<SubscriberResponse, ApiError> {
        validate_email(email_address)?;

        let mut body = Map::new();
        body.insert("email_address".into(), json!(email_address));
        if let Some(referrer) = referrer {
            body.insert("referrer".into(), json!(referrer));
        }

        let spec =
            RequestSpec::post(format!("forms/{form_id}/subscribers")).body(Value::Object(body));
        self.execute_json(spec).await
    }

    /// Add several subscribers to forms in one call.
    pub async fn add_subscribers_to_forms(
        &self,
        additions: &[FormSubscription],
    ) -> Result<BulkFormSubscriptionsResponse, ApiError> {
        if additions.is_empty() {
            return Err(ApiError::InvalidArgument(
                "at least one form subscription is required".into(),
            ));
        }

        let body = json!({
            "additions": additions
                .iter()
                .map(|addition| {
                    json!({
                        "form_id": addition.form_id,
                        "subscriber_id": addition.subscriber_id,
                    })
                })
                .collect::<Vec<_>>(),
        });
        self.execute_json(RequestSpec::post("bulk/forms/subscribers").body(body))
            .await
    }
}
