//! Account endpoints.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use crate::client::ConvertKitClient;
use crate::error::ApiError;
use crate::request::RequestSpec;
use crate::resources::date_param;

/// The authenticated account.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    /// Account display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Billing plan.
    #[serde(default)]
    pub plan_type: Option<String>,
    /// Primary email address on the account.
    #[serde(default)]
    pub primary_email_address: Option<String>,
}

/// The user attached to the account.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountUser {
    /// Login email address.
    #[serde(default)]
    pub email: Option<String>,
}

/// Response of the account endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountResponse {
    /// The user owning the credentials.
    #[serde(default)]
    pub user: Option<AccountUser>,
    /// The account.
    pub account: Account,
}

/// Brand colors configured on the account.
#[derive(Debug, Clone, Deserialize)]
pub struct ColorsResponse {
    /// Hex color values.
    pub colors: Vec<String>,
}

/// Public creator profile.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatorProfile {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Byline shown under the name.
    #[serde(default)]
    pub byline: Option<String>,
    /// Biography text.
    #[serde(default)]
    pub bio: Option<String>,
    /// Avatar image URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Public profile URL.
    #[serde(default)]
    pub profile_url: Option<String>,
}

/// Response of the creator profile endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatorProfileResponse {
    /// The profile.
    pub profile: CreatorProfile,
}

/// Aggregate email statistics.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailStats {
    /// Emails sent.
    #[serde(default)]
    pub sent: Option<i64>,
    /// Emails clicked.
    #[serde(default)]
    pub clicked: Option<i64>,
    /// Emails opened.
    #[serde(default)]
    pub opened: Option<i64>,
    /// Statistic aggregation mode.
    #[serde(default)]
    pub email_stats_mode: Option<String>,
    /// Whether open tracking is enabled.
    #[serde(default)]
    pub open_tracking_enabled: Option<bool>,
    /// Whether click tracking is enabled.
    #[serde(default)]
    pub click_tracking_enabled: Option<bool>,
    /// Window start.
    #[serde(default)]
    pub starting: Option<String>,
    /// Window end.
    #[serde(default)]
    pub ending: Option<String>,
}

/// Response of the email stats endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailStatsResponse {
    /// The statistics.
    pub stats: EmailStats,
}

/// Subscriber growth statistics over a window.
#[derive(Debug, Clone, Deserialize)]
pub struct GrowthStats {
    /// Cancellations in the window.
    #[serde(default)]
    pub cancellations: Option<i64>,
    /// Net new subscribers in the window.
    #[serde(default)]
    pub net_new_subscribers: Option<i64>,
    /// New subscribers in the window.
    #[serde(default)]
    pub new_subscribers: Option<i64>,
    /// Total subscribers at window end.
    #[serde(default)]
    pub subscribers: Option<i64>,
    /// Window start.
    #[serde(default)]
    pub starting: Option<String>,
    /// Window end.
    #[serde(default)]
    pub ending: Option<String>,
}

/// Response of the growth stats endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GrowthStatsResponse {
    /// The statistics.
    pub stats: GrowthStats,
}

impl ConvertKitClient {
    /// Fetch the authenticated account.
    pub async fn get_account(&self) -> Result<AccountResponse, ApiError> {
        let spec = RequestSpec::get("account");
        self.execute_json(self.with_secret(spec)?).await
    }

    /// Fetch the account's brand colors.
    pub async fn get_account_colors(&self) -> Result<ColorsResponse, ApiError> {
        self.execute_json(RequestSpec::get("account/colors")).await
    }

    /// Replace the account's brand colors.
    pub async fn update_account_colors(
        &self,
        colors: &[String],
    ) -> Result<ColorsResponse, ApiError> {
        if colors.is_empty() {
            return Err(ApiError::InvalidArgument(
                "at least one color is required".into(),
            ));
        }

        let spec = RequestSpec::put("account/colors").body(json!({"colors": colors}));
        self.execute_json(spec).await
    }

    /// Fetch the public creator profile.
    pub async fn get_creator_profile(&self) -> Result<CreatorProfileResponse, ApiError> {
        self.execute_json(RequestSpec::get("account/creator_profile"))
            .await
    }

    /// Fetch aggregate email statistics.
    pub async fn get_email_stats(&self) -> Result<EmailStatsResponse, ApiError> {
        self.execute_json(RequestSpec::get("account/email_stats"))
            .await
    }

    /// Fetch growth statistics, optionally bounded to a date window. The API
    /// defaults to the trailing 90 days.
    pub async fn get_growth_stats(
        &self,
        starting: Option<NaiveDate>,
        ending: Option<NaiveDate>,
    ) -> Result<GrowthStatsResponse, ApiError> {
        let spec = RequestSpec::get("account/growth_stats")
            .query_opt("starting", starting.map(date_param))
            .query_opt("ending", ending.map(date_param));
        self.execute_json(spec).await
    }
}
