//! Typed resource wrappers over the request engine.
//!
//! Each module holds one resource's endpoint methods and response structs.
//! The methods are deliberately thin: validate arguments locally, build a
//! [`crate::request::RequestSpec`], delegate to the engine.

pub mod account;
pub mod broadcasts;
pub mod custom_fields;
pub mod email_templates;
pub mod forms;
pub mod purchases;
pub mod segments;
pub mod sequences;
pub mod subscribers;
pub mod tags;
pub mod webhooks;

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::ApiError;
use crate::request::RequestSpec;

/// Anchored email syntax check applied before any network call.
const EMAIL_PATTERN: &str = r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// Validate email syntax locally; invalid addresses never reach the wire.
pub(crate) fn validate_email(email: &str) -> Result<(), ApiError> {
    if email_regex().is_match(email) {
        Ok(())
    } else {
        Err(ApiError::InvalidArgument(format!(
            "invalid email address: {email}"
        )))
    }
}

/// Serialize a date parameter the way the API expects filter bounds.
pub(crate) fn date_param(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Subscriber lifecycle state used by list filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberState {
    /// Confirmed and receiving emails.
    Active,
    /// Imported but never confirmed.
    Inactive,
    /// Delivery to the address failed.
    Bounced,
    /// The address filed a spam complaint.
    Complained,
    /// Unsubscribed.
    Cancelled,
}

impl SubscriberState {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Bounced => "bounced",
            Self::Complained => "complained",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Sort direction for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Sortable subscriber fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberSortField {
    /// Subscriber ID.
    Id,
    /// Last update time.
    UpdatedAt,
    /// Cancellation time.
    CancelledAt,
}

impl SubscriberSortField {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::UpdatedAt => "updated_at",
            Self::CancelledAt => "cancelled_at",
        }
    }
}

/// Filter accepted by form/sequence subscription listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    /// Restrict to one subscriber state (API default: active).
    pub status: Option<SubscriberState>,
    /// Subscribed on or after this date.
    pub added_after: Option<NaiveDate>,
    /// Subscribed on or before this date.
    pub added_before: Option<NaiveDate>,
    /// Subscriber created on or after this date.
    pub created_after: Option<NaiveDate>,
    /// Subscriber created on or before this date.
    pub created_before: Option<NaiveDate>,
}

impl SubscriptionFilter {
    pub(crate) fn apply_to(&self, spec: RequestSpec) -> RequestSpec {
        spec.query_opt("status", self.status.map(SubscriberState::as_str))
            .query_opt("added_after", self.added_after.map(date_param))
            .query_opt("added_before", self.added_before.map(date_param))
            .query_opt("created_after", self.created_after.map(date_param))
            .query_opt("created_before", self.created_before.map(date_param))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plausible_addresses() {
        assert!(validate_email("owner@name.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.co").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in ["", "not-an-email", "missing@tld", "@example.com", "a b@c.de"] {
            assert!(
                matches!(validate_email(email), Err(ApiError::InvalidArgument(_))),
                "expected {email:?} to be rejected"
            );
        }
    }

    #[test]
    fn filter_serializes_only_present_fields() {
        let filter = SubscriptionFilter {
            status: Some(SubscriberState::Bounced),
            added_after: Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            ..SubscriptionFilter::default()
        };

        let spec = filter.apply_to(RequestSpec::get("forms/1/subscribers"));
        let keys: Vec<&str> = spec.query.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["status", "added_after"]);
    }

    #[test]
    fn date_param_uses_calendar_format() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(date_param(date), "2024-03-09");
    }
}
