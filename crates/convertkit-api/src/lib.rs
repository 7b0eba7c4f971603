//! ConvertKit (Kit) v4 API client.
//!
//! The crate is organized around a small request engine
//! ([`ConvertKitClient::execute`]) that every typed resource method funnels
//! through: it derives headers from the configured [`Credential`], encodes
//! GET parameters into the query string and write-verb parameters as a JSON
//! body, classifies failures into a typed [`ApiError`] taxonomy, and retains
//! the last response envelope for diagnostics.
//!
//! Two authentication modes are supported, chosen once at construction: the
//! legacy API key/secret pair and OAuth bearer tokens with an
//! authorization-code/refresh lifecycle. Optional masked debug logging
//! writes request/response events to a configurable sink without ever
//! persisting raw credentials or email addresses.
//!
//! ```rust,ignore
//! use convertkit_api::{ConvertKitClient, Credential, ListOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), convertkit_api::ApiError> {
//!     let client = ConvertKitClient::new(Credential::oauth(
//!         std::env::var("CONVERTKIT_OAUTH_CLIENT_ID").unwrap(),
//!         std::env::var("CONVERTKIT_OAUTH_CLIENT_SECRET").unwrap(),
//!         std::env::var("CONVERTKIT_OAUTH_ACCESS_TOKEN").unwrap(),
//!         None,
//!     ))?;
//!
//!     let account = client.get_account().await?;
//!     println!("{:?}", account.account.name);
//!
//!     let mut options = ListOptions::new().per_page(100);
//!     loop {
//!         let page = client.get_subscribers(&Default::default(), &options).await?;
//!         for subscriber in &page.subscribers {
//!             println!("{}", subscriber.email_address);
//!         }
//!         match page.pagination.next_cursor() {
//!             Some(cursor) => options = ListOptions::after(cursor).per_page(100),
//!             None => break,
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod logging;
pub mod markup;
pub mod oauth;
pub mod pagination;
pub mod request;
pub mod resources;
pub mod response;

pub use auth::{build_headers, Credential, USER_AGENT_VALUE};
pub use client::{ClientBuilder, ClientConfig, ConvertKitClient};
pub use error::ApiError;
pub use http::{HttpTransport, Transport};
pub use logging::{DebugLog, LogEntry, LogLevel, Masker};
pub use markup::MarkupCacheConfig;
pub use oauth::{authorize_url, TokenSet};
pub use pagination::{ListOptions, Pagination};
pub use request::{ParamValue, RequestSpec, RequestTarget};
pub use resources::{
    SortOrder, SubscriberSortField, SubscriberState, SubscriptionFilter,
};
pub use response::ResponseEnvelope;
