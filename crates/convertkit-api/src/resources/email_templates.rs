//! Email template endpoints.

use serde::Deserialize;

use crate::client::ConvertKitClient;
use crate::error::ApiError;
use crate::pagination::{ListOptions, Pagination};
use crate::request::RequestSpec;

/// An email template.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailTemplate {
    /// Template ID.
    pub id: i64,
    /// Template name.
    pub name: String,
    /// Whether this is the account default.
    #[serde(default)]
    pub is_default: Option<bool>,
    /// Template category.
    #[serde(default)]
    pub category: Option<String>,
}

/// One page of email templates.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailTemplateList {
    /// Templates on this page.
    pub email_templates: Vec<EmailTemplate>,
    /// Cursor envelope.
    pub pagination: Pagination,
}

impl ConvertKitClient {
    /// List email templates.
    pub async fn get_email_templates(
        &self,
        options: &ListOptions,
    ) -> Result<EmailTemplateList, ApiError> {
        let spec = options.apply_to(RequestSpec::get("email_templates"))?;
        self.execute_json(spec).await
    }
}
