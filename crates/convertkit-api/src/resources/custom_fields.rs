//! Custom field endpoints.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::ConvertKitClient;
use crate::error::ApiError;
use crate::pagination::{ListOptions, Pagination};
use crate::request::RequestSpec;

/// A custom subscriber field.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomField {
    /// Field ID.
    pub id: i64,
    /// Machine name derived from the label.
    #[serde(default)]
    pub name: Option<String>,
    /// Key used in subscriber `fields` maps.
    #[serde(default)]
    pub key: Option<String>,
    /// Human-readable label.
    pub label: String,
}

/// Envelope around a single custom field.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomFieldResponse {
    /// The custom field.
    pub custom_field: CustomField,
}

/// One page of custom fields.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomFieldList {
    /// Custom fields on this page.
    pub custom_fields: Vec<CustomField>,
    /// Cursor envelope.
    pub pagination: Pagination,
}

/// Outcome of a bulk custom field creation.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkCustomFieldsResponse {
    /// Custom fields that were created.
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
    /// Per-entry failures reported by the API.
    #[serde(default)]
    pub failures: Vec<Value>,
}

impl ConvertKitClient {
    /// List custom fields.
    pub async fn get_custom_fields(
        &self,
        options: &ListOptions,
    ) -> Result<CustomFieldList, ApiError> {
        let spec = options.apply_to(RequestSpec::get("custom_fields"))?;
        self.execute_json(spec).await
    }

    /// Create a custom field.
    pub async fn create_custom_field(&self, label: &str) -> Result<CustomFieldResponse, ApiError> {
        if label.trim().is_empty() {
            return Err(ApiError::InvalidArgument(
                "custom field label must not be blank".into(),
            ));
        }

        let spec = RequestSpec::post("custom_fields").body(json!({"label": label}));
        self.execute_json(spec).await
    }

    /// Create several custom fields in one call.
    pub async fn create_custom_fields(
        &self,
        labels: &[String],
    ) -> Result<BulkCustomFieldsResponse, ApiError> {
        if labels.is_empty() {
            return Err(ApiError::InvalidArgument(
                "at least one custom field label is required".into(),
            ));
        }

        let body = json!({
            "custom_fields": labels
                .iter()
                .map(|label| json!({"label": label}))
                .collect::<Vec<_>>(),
        });
        self.execute_json(RequestSpec::post("bulk/custom_fields").body(body))
            .await
    }

    /// Relabel a custom field.
    pub async fn update_custom_field(
        &self,
        custom_field_id: i64,
        label: &str,
    ) -> Result<CustomFieldResponse, ApiError> {
        if label.trim().is_empty() {
            return Err(ApiError::InvalidArgument(
                "custom field label must not be blank".into(),
            ));
        }

        let spec = RequestSpec::put(format!("custom_fields/{custom_field_id}"))
            .body(json!({"label": label}));
        self.execute_json(spec).await
    }

    /// Delete a custom field. Values stored on subscribers are removed with
    /// it.
    pub async fn delete_custom_field(&self, custom_field_id: i64) -> Result<(), ApiError> {
        self.execute_json(RequestSpec::delete(format!("custom_fields/{custom_field_id}")))
            .await
    }
}
