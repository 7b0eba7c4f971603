//! Webhook endpoints.
//!
//! Webhook events are a closed set; modeling them as an enum makes an
//! unknown event unrepresentable, and events that require an initiator
//! (form, tag, ...) carry it in their variant.

use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::client::ConvertKitClient;
use crate::error::ApiError;
use crate::pagination::{ListOptions, Pagination};
use crate::request::RequestSpec;

/// Events a webhook can subscribe to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    /// A subscriber confirmed their subscription.
    SubscriberActivate,
    /// A subscriber unsubscribed.
    SubscriberUnsubscribe,
    /// Delivery to a subscriber bounced.
    SubscriberBounce,
    /// A subscriber filed a spam complaint.
    SubscriberComplain,
    /// A subscriber joined the given form.
    FormSubscribe {
        /// Initiating form.
        form_id: i64,
    },
    /// A subscriber joined the given sequence.
    CourseSubscribe {
        /// Initiating sequence.
        course_id: i64,
    },
    /// A subscriber finished the given sequence.
    CourseComplete {
        /// Initiating sequence.
        course_id: i64,
    },
    /// A subscriber clicked the given link.
    LinkClick {
        /// URL of the tracked link.
        initiator_value: String,
    },
    /// A subscriber purchased the given product.
    ProductPurchase {
        /// Initiating product.
        product_id: i64,
    },
    /// The given tag was added to a subscriber.
    TagAdd {
        /// Initiating tag.
        tag_id: i64,
    },
    /// The given tag was removed from a subscriber.
    TagRemove {
        /// Initiating tag.
        tag_id: i64,
    },
    /// A purchase was recorded.
    PurchaseCreate,
}

impl WebhookEvent {
    /// Event name on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SubscriberActivate => "subscriber_activate",
            Self::SubscriberUnsubscribe => "subscriber_unsubscribe",
            Self::SubscriberBounce => "subscriber_bounce",
            Self::SubscriberComplain => "subscriber_complain",
            Self::FormSubscribe { .. } => "form_subscribe",
            Self::CourseSubscribe { .. } => "course_subscribe",
            Self::CourseComplete { .. } => "course_complete",
            Self::LinkClick { .. } => "link_click",
            Self::ProductPurchase { .. } => "product_purchase",
            Self::TagAdd { .. } => "tag_add",
            Self::TagRemove { .. } => "tag_remove",
            Self::PurchaseCreate => "purchase_create",
        }
    }

    fn to_body(&self) -> Value {
        match self {
            Self::FormSubscribe { form_id } => {
                json!({"name": self.name(), "form_id": form_id})
            }
            Self::CourseSubscribe { course_id } | Self::CourseComplete { course_id } => {
                json!({"name": self.name(), "course_id": course_id})
            }
            Self::LinkClick { initiator_value } => {
                json!({"name": self.name(), "initiator_value": initiator_value})
            }
            Self::ProductPurchase { product_id } => {
                json!({"name": self.name(), "product_id": product_id})
            }
            Self::TagAdd { tag_id } | Self::TagRemove { tag_id } => {
                json!({"name": self.name(), "tag_id": tag_id})
            }
            _ => json!({"name": self.name()}),
        }
    }
}

/// A registered webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct Webhook {
    /// Webhook ID.
    pub id: i64,
    /// Delivery URL.
    pub target_url: String,
    /// Subscribed event, as returned by the API.
    #[serde(default)]
    pub event: Option<Value>,
    /// Account the webhook belongs to.
    #[serde(default)]
    pub account_id: Option<i64>,
}

/// Envelope around a single webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookResponse {
    /// The webhook.
    pub webhook: Webhook,
}

/// One page of webhooks.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookList {
    /// Webhooks on this page.
    pub webhooks: Vec<Webhook>,
    /// Cursor envelope.
    pub pagination: Pagination,
}

impl ConvertKitClient {
    /// List webhooks.
    pub async fn get_webhooks(&self, options: &ListOptions) -> Result<WebhookList, ApiError> {
        let spec = options.apply_to(RequestSpec::get("webhooks"))?;
        self.execute_json(self.with_secret(spec)?).await
    }

    /// Register a webhook.
    pub async fn create_webhook(
        &self,
        target_url: &str,
        event: WebhookEvent,
    ) -> Result<WebhookResponse, ApiError> {
        let parsed = Url::parse(target_url)
            .map_err(|_| ApiError::InvalidArgument(format!("invalid webhook URL: {target_url}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidArgument(format!(
                "invalid webhook URL: {target_url}"
            )));
        }

        let body = json!({
            "target_url": target_url,
            "event": event.to_body(),
        });
        let spec = RequestSpec::post("webhooks").body(body);
        self.execute_json(self.with_secret(spec)?).await
    }

    /// Delete a webhook.
    pub async fn delete_webhook(&self, webhook_id: i64) -> Result<(), ApiError> {
        let spec = RequestSpec::delete(format!("webhooks/{webhook_id}"));
        self.execute_json(self.with_secret(spec)?).await
    }
}
