//! Purchase endpoints.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::client::ConvertKitClient;
use crate::error::ApiError;
use crate::pagination::{ListOptions, Pagination};
use crate::request::RequestSpec;
use crate::resources::validate_email;

/// A line item on a purchase.
#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseProduct {
    /// Product name.
    pub name: String,
    /// Seller's product ID.
    #[serde(default)]
    pub pid: Option<String>,
    /// Seller's line item ID.
    #[serde(default)]
    pub lid: Option<String>,
    /// Stock keeping unit.
    #[serde(default)]
    pub sku: Option<String>,
    /// Unit price.
    #[serde(default)]
    pub unit_price: Option<f64>,
    /// Quantity purchased.
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// A purchase record.
#[derive(Debug, Clone, Deserialize)]
pub struct Purchase {
    /// Purchase ID.
    pub id: i64,
    /// Seller's transaction ID.
    #[serde(default)]
    pub transaction_id: Option<String>,
    /// Payment status.
    #[serde(default)]
    pub status: Option<String>,
    /// Buyer email address.
    #[serde(default)]
    pub email_address: Option<String>,
    /// ISO currency code.
    #[serde(default)]
    pub currency: Option<String>,
    /// Pre-tax subtotal.
    #[serde(default)]
    pub subtotal: Option<f64>,
    /// Tax amount.
    #[serde(default)]
    pub tax: Option<f64>,
    /// Shipping amount.
    #[serde(default)]
    pub shipping: Option<f64>,
    /// Discount amount.
    #[serde(default)]
    pub discount: Option<f64>,
    /// Grand total.
    #[serde(default)]
    pub total: Option<f64>,
    /// Time of the transaction.
    #[serde(default)]
    pub transaction_time: Option<DateTime<Utc>>,
    /// Purchased products.
    #[serde(default)]
    pub products: Vec<PurchaseProduct>,
}

/// Envelope around a single purchase.
#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseResponse {
    /// The purchase.
    pub purchase: Purchase,
}

/// One page of purchases.
#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseList {
    /// Purchases on this page.
    pub purchases: Vec<Purchase>,
    /// Cursor envelope.
    pub pagination: Pagination,
}

/// A product line for [`CreatePurchaseOptions`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewPurchaseProduct {
    /// Product name.
    pub name: String,
    /// Seller's product ID.
    pub pid: Option<String>,
    /// Seller's line item ID.
    pub lid: Option<String>,
    /// Stock keeping unit.
    pub sku: Option<String>,
    /// Unit price.
    pub unit_price: f64,
    /// Quantity purchased.
    pub quantity: i64,
}

impl NewPurchaseProduct {
    fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("name".into(), json!(self.name));
        if let Some(pid) = &self.pid {
            body.insert("pid".into(), json!(pid));
        }
        if let Some(lid) = &self.lid {
            body.insert("lid".into(), json!(lid));
        }
        if let Some(sku) = &self.sku {
            body.insert("sku".into(), json!(sku));
        }
        body.insert("unit_price".into(), json!(self.unit_price));
        body.insert("quantity".into(), json!(self.quantity));
        Value::Object(body)
    }
}

/// Fields for recording a purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatePurchaseOptions {
    /// Buyer email address.
    pub email_address: String,
    /// Seller's transaction ID.
    pub transaction_id: String,
    /// Payment status.
    pub status: Option<String>,
    /// ISO currency code.
    pub currency: Option<String>,
    /// Pre-tax subtotal.
    pub subtotal: Option<f64>,
    /// Tax amount.
    pub tax: Option<f64>,
    /// Shipping amount.
    pub shipping: Option<f64>,
    /// Discount amount.
    pub discount: Option<f64>,
    /// Grand total.
    pub total: Option<f64>,
    /// Time of the transaction.
    pub transaction_time: Option<DateTime<Utc>>,
    /// Purchased products (at least one required).
    pub products: Vec<NewPurchaseProduct>,
    /// Buyer first name.
    pub first_name: Option<String>,
}

impl CreatePurchaseOptions {
    /// Minimal purchase with one product line.
    pub fn new(
        email_address: impl Into<String>,
        transaction_id: impl Into<String>,
        products: Vec<NewPurchaseProduct>,
    ) -> Self {
        Self {
            email_address: email_address.into(),
            transaction_id: transaction_id.into(),
            status: None,
            currency: None,
            subtotal: None,
            tax: None,
            shipping: None,
            discount: None,
            total: None,
            transaction_time: None,
            products,
            first_name: None,
        }
    }

    fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("email_address".into(), json!(self.email_address));
        body.insert("transaction_id".into(), json!(self.transaction_id));
        if let Some(status) = &self.status {
            body.insert("status".into(), json!(status));
        }
        if let Some(currency) = &self.currency {
            body.insert("currency".into(), json!(currency));
        }
        if let Some(subtotal) = self.subtotal {
            body.insert("subtotal".into(), json!(subtotal));
        }
        if let Some(tax) = self.tax {
            body.insert("tax".into(), json!(tax));
        }
        if let Some(shipping) = self.shipping {
            body.insert("shipping".into(), json!(shipping));
        }
        if let Some(discount) = self.discount {
            body.insert("discount".into(), json!(discount));
        }
        if let Some(total) = self.total {
            body.insert("total".into(), json!(total));
        }
        if let Some(transaction_time) = &self.transaction_time {
            body.insert(
                "transaction_time".into(),
                json!(transaction_time.to_rfc3339_opts(SecondsFormat::Secs, true)),
            );
        }
        body.insert(
            "products".into(),
            Value::Array(self.products.iter().map(NewPurchaseProduct::to_body).collect()),
        );
        if let Some(first_name) = &self.first_name {
            body.insert("first_name".into(), json!(first_name));
        }
        Value::Object(body)
    }
}

impl ConvertKitClient {
    /// List purchases.
    pub async fn get_purchases(&self, options: &ListOptions) -> Result<PurchaseList, ApiError> {
        let spec = options.apply_to(RequestSpec::get("purchases"))?;
        self.execute_json(self.with_secret(spec)?).await
    }

    /// Fetch one purchase.
    pub async fn get_purchase(&self, purchase_id: i64) -> Result<PurchaseResponse, ApiError> {
        let spec = RequestSpec::get(format!("purchases/{purchase_id}"));
        self.execute_json(self.with_secret(spec)?).await
    }

    /// Record a purchase.
    pub async fn create_purchase(
        &self,
        options: &CreatePurchaseOptions,
    ) -> Result<PurchaseResponse, ApiError> {
        validate_email(&options.email_address)?;
        if options.transaction_id.trim().is_empty() {
            return Err(ApiError::InvalidArgument(
                "transaction_id must not be blank".into(),
            ));
        }
        if options.products.is_empty() {
            return Err(ApiError::InvalidArgument(
                "at least one product is required".into(),
            ));
        }

        let spec = RequestSpec::post("purchases").body(options.to_body());
        self.execute_json(self.with_secret(spec)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_body_includes_products_and_identity() {
        let options = CreatePurchaseOptions::new(
            "owner@name.com",
            "txn-1001",
            vec![NewPurchaseProduct {
                name: "Course".into(),
                pid: Some("course-1".into()),
                lid: None,
                sku: None,
                unit_price: 99.0,
                quantity: 1,
            }],
        );

        assert_eq!(
            options.to_body(),
            json!({
                "email_address": "owner@name.com",
                "transaction_id": "txn-1001",
                "products": [{
                    "name": "Course",
                    "pid": "course-1",
                    "unit_price": 99.0,
                    "quantity": 1,
                }],
            })
        );
    }
}
