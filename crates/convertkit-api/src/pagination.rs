//! Cursor pagination protocol for list endpoints.
//!
//! Cursors are opaque tokens; they are meaningful only when passed back as
//! `after_cursor`/`before_cursor` on a subsequent call in the same
//! direction.

use serde::Deserialize;

use crate::error::ApiError;
use crate::request::RequestSpec;

/// Options accepted by every list endpoint.
///
/// `after_cursor` and `before_cursor` are mutually exclusive; supplying both
/// is rejected locally before any network call. `per_page` is forwarded
/// verbatim — out-of-range values are rejected by the API, not clamped here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Fetch the page after this cursor.
    pub after_cursor: Option<String>,
    /// Fetch the page before this cursor.
    pub before_cursor: Option<String>,
    /// Requested page size.
    pub per_page: Option<u32>,
    /// Ask the API to include `total_count` in the pagination envelope.
    pub include_total_count: bool,
}

impl ListOptions {
    /// Options with all defaults (first page, API-default page size).
    pub fn new() -> Self {
        Self::default()
    }

    /// Page following `cursor`.
    pub fn after(cursor: impl Into<String>) -> Self {
        Self {
            after_cursor: Some(cursor.into()),
            ..Self::default()
        }
    }

    /// Page preceding `cursor`.
    pub fn before(cursor: impl Into<String>) -> Self {
        Self {
            before_cursor: Some(cursor.into()),
            ..Self::default()
        }
    }

    /// Set the requested page size.
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Request the total result count.
    pub fn with_total_count(mut self) -> Self {
        self.include_total_count = true;
        self
    }

    fn validate(&self) -> Result<(), ApiError> {
        if self.after_cursor.is_some() && self.before_cursor.is_some() {
            return Err(ApiError::InvalidArgument(
                "after_cursor and before_cursor are mutually exclusive".into(),
            ));
        }
        Ok(())
    }

    /// Validate the options and append them to a request's query string.
    pub(crate) fn apply_to(&self, spec: RequestSpec) -> Result<RequestSpec, ApiError> {
        self.validate()?;

        Ok(spec
            .query_opt("after_cursor", self.after_cursor.as_deref())
            .query_opt("before_cursor", self.before_cursor.as_deref())
            .query_opt("per_page", self.per_page)
            .query_opt(
                "include_total_count",
                self.include_total_count.then_some(true),
            ))
    }
}

/// Pagination envelope returned alongside every resource list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    /// Whether a page precedes this one.
    pub has_previous_page: bool,
    /// Whether a page follows this one.
    pub has_next_page: bool,
    /// Opaque cursor of the first item. Only meaningful as a `before_cursor`
    /// when `has_previous_page` is true.
    #[serde(default)]
    pub start_cursor: Option<String>,
    /// Opaque cursor of the last item. Only meaningful as an `after_cursor`
    /// when `has_next_page` is true.
    #[serde(default)]
    pub end_cursor: Option<String>,
    /// Page size used by the API.
    pub per_page: u32,
    /// Total result count; present only when the caller requested it.
    #[serde(default)]
    pub total_count: Option<u64>,
}

impl Pagination {
    /// Cursor for the next page, when one exists.
    pub fn next_cursor(&self) -> Option<&str> {
        if self.has_next_page {
            self.end_cursor.as_deref()
        } else {
            None
        }
    }

    /// Cursor for the previous page, when one exists.
    pub fn previous_cursor(&self) -> Option<&str> {
        if self.has_previous_page {
            self.start_cursor.as_deref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::request::ParamValue;

    #[test]
    fn both_cursors_rejected_locally() {
        let options = ListOptions {
            after_cursor: Some("a".into()),
            before_cursor: Some("b".into()),
            ..ListOptions::default()
        };

        let result = options.apply_to(RequestSpec::get("tags"));
        assert!(matches!(result, Err(ApiError::InvalidArgument(_))));
    }

    #[test]
    fn options_serialize_onto_query_string() {
        let options = ListOptions::after("cursor123")
            .per_page(25)
            .with_total_count();

        let spec = options.apply_to(RequestSpec::get("tags")).unwrap();
        assert_eq!(
            spec.query,
            vec![
                ("after_cursor".to_string(), ParamValue::Str("cursor123".into())),
                ("per_page".to_string(), ParamValue::Int(25)),
                ("include_total_count".to_string(), ParamValue::Bool(true)),
            ]
        );
    }

    #[test]
    fn default_options_add_no_parameters() {
        let spec = ListOptions::new().apply_to(RequestSpec::get("tags")).unwrap();
        assert!(spec.query.is_empty());
    }

    #[test]
    fn envelope_decodes_with_and_without_total_count() {
        let envelope: Pagination = serde_json::from_value(json!({
            "has_previous_page": false,
            "has_next_page": true,
            "start_cursor": "start",
            "end_cursor": "end",
            "per_page": 50,
        }))
        .unwrap();
        assert_eq!(envelope.total_count, None);
        assert_eq!(envelope.next_cursor(), Some("end"));
        assert_eq!(envelope.previous_cursor(), None);

        let envelope: Pagination = serde_json::from_value(json!({
            "has_previous_page": true,
            "has_next_page": false,
            "start_cursor": "start",
            "end_cursor": "end",
            "per_page": 50,
            "total_count": 312,
        }))
        .unwrap();
        assert_eq!(envelope.total_count, Some(312));
        assert_eq!(envelope.next_cursor(), None);
        assert_eq!(envelope.previous_cursor(), Some("start"));
    }
}
