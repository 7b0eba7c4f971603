//! Segment endpoints.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::client::ConvertKitClient;
use crate::error::ApiError;
use crate::pagination::{ListOptions, Pagination};
use crate::request::RequestSpec;

/// A subscriber segment.
#[derive(Debug, Clone, Deserialize)]
pub struct Segment {
    /// Segment ID.
    pub id: i64,
    /// Segment name.
    pub name: String,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One page of segments.
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentList {
    /// Segments on this page.
    pub segments: Vec<Segment>,
    /// Cursor envelope.
    pub pagination: Pagination,
}

impl ConvertKitClient {
    /// List segments.
    pub async fn get_segments(&self, options: &ListOptions) -> Result<SegmentList, ApiError> {
        let spec = options.apply_to(RequestSpec::get("segments"))?;
        self.execute_json(spec).await
    }
}
