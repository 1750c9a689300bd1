//! CRM domain entities and the typed requests the gateway accepts.
//!
//! Entities decode from upstream payloads and ignore unknown fields. Request
//! types carry their field constraints as `validator` rules, checked by the
//! inbound layer before a request reaches the client.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use validator::{Validate, ValidationError};

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Page size accepted by the upstream list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageLimit {
    #[default]
    Twenty,
    Fifty,
    Hundred,
}

impl PageLimit {
    pub fn as_u32(self) -> u32 {
        match self {
            PageLimit::Twenty => 20,
            PageLimit::Fifty => 50,
            PageLimit::Hundred => 100,
        }
    }
}

impl TryFrom<u64> for PageLimit {
    type Error = String;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            20 => Ok(PageLimit::Twenty),
            50 => Ok(PageLimit::Fifty),
            100 => Ok(PageLimit::Hundred),
            other => Err(format!("limit must be one of 20, 50, 100 (got {})", other)),
        }
    }
}

impl Serialize for PageLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.as_u32())
    }
}

// Query strings carry the limit as text, JSON as a number.
impl<'de> Deserialize<'de> for PageLimit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LimitVisitor;

        impl serde::de::Visitor<'_> for LimitVisitor {
            type Value = PageLimit;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("one of 20, 50, 100")
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<PageLimit, E> {
                PageLimit::try_from(v).map_err(E::custom)
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<PageLimit, E> {
                let v = u64::try_from(v).map_err(|_| E::custom("limit must be positive"))?;
                self.visit_u64(v)
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<PageLimit, E> {
                let v: u64 = v
                    .trim()
                    .parse()
                    .map_err(|_| E::custom(format!("invalid limit '{}'", v)))?;
                self.visit_u64(v)
            }
        }

        deserializer.deserialize_any(LimitVisitor)
    }
}

fn default_page() -> u32 {
    1
}

/// Page selection shared by list requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PageParams {
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "must be greater than or equal to 1"))]
    pub page: u32,
    #[serde(default)]
    pub limit: PageLimit,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: PageLimit::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub limit: u32,
    pub total_count: u64,
    pub current_page: u32,
    pub total_page_count: u32,
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
    pub number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub external_id: Option<String>,
    pub is_contact: bool,
    #[serde(with = "crm_datetime")]
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phones: Option<Vec<Phone>>,
}

/// A page of customers. Serialized to gateway callers as `clients`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomersPage {
    pub pagination: Pagination,
    #[serde(rename(serialize = "clients", deserialize = "customers"))]
    pub customers: Vec<Customer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: u64,
    #[serde(default)]
    pub summ: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub order_type: Option<String>,
    #[serde(default)]
    pub order_method: Option<String>,
    #[serde(with = "crm_datetime")]
    pub created_at: NaiveDateTime,
    #[serde(default, with = "crm_datetime::option")]
    pub status_updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub total_summ: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdersPage {
    pub pagination: Pagination,
    pub orders: Vec<Order>,
}

/// Identifier of a freshly created customer, order or payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
    pub id: u64,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Filters for listing customers.
// Page fields are inlined rather than flattened: query-string decoding
// cannot parse numbers through `#[serde(flatten)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "check_signup_range"))]
pub struct CustomerFilter {
    #[serde(default)]
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(
        email(message = "is not a valid email address"),
        length(max = 255, message = "must be at most 255 characters")
    )]
    pub email: Option<String>,
    #[serde(default)]
    pub date_of_signup_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_of_signup_to: Option<NaiveDate>,
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "must be greater than or equal to 1"))]
    pub page: u32,
    #[serde(default)]
    pub limit: PageLimit,
}

impl Default for CustomerFilter {
    fn default() -> Self {
        Self {
            name: None,
            email: None,
            date_of_signup_from: None,
            date_of_signup_to: None,
            page: default_page(),
            limit: PageLimit::default(),
        }
    }
}

fn check_signup_range(filter: &CustomerFilter) -> Result<(), ValidationError> {
    match (filter.date_of_signup_from, filter.date_of_signup_to) {
        (Some(from), Some(to)) if from > to => Err(ValidationError::new("signup_range").with_message(
            "'date_of_signup_from' should be lower or equal to 'date_of_signup_to'".into(),
        )),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub last_name: Option<String>,
    #[serde(default)]
    #[validate(
        email(message = "is not a valid email address"),
        length(max = 255, message = "must be at most 255 characters")
    )]
    pub email: Option<String>,
    #[serde(default)]
    pub phones: Vec<Phone>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub is_contact: Option<bool>,
}

/// Orders of one customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerOrdersQuery {
    pub client_id: u64,
    pub page: PageParams,
}

/// Inline customer details for an order without a customer id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderClientData {
    #[serde(default)]
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub first_name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub last_name: Option<String>,
    #[serde(default)]
    #[validate(
        email(message = "is not a valid email address"),
        length(max = 255, message = "must be at most 255 characters")
    )]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub initial_price: f64,
    pub product_name: String,
}

/// New order. Exactly one of `client_id` and `client_data` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "check_customer_reference"))]
pub struct NewOrder {
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub number: String,
    #[serde(default)]
    pub client_id: Option<u64>,
    #[serde(default)]
    #[validate(nested)]
    pub client_data: Option<OrderClientData>,
    pub items: Vec<OrderItem>,
}

fn check_customer_reference(order: &NewOrder) -> Result<(), ValidationError> {
    if order.client_id.is_some() == order.client_data.is_some() {
        return Err(ValidationError::new("customer_reference")
            .with_message("Either 'client_id' or 'client_data' should be provided".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentType {
    #[default]
    BankCard,
    Cash,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub order_id: u64,
    pub payment_amount: f64,
    #[serde(default)]
    pub payment_type: PaymentType,
    #[serde(default)]
    pub payment_comment: Option<String>,
}

/// Upstream timestamps: `YYYY-MM-DD HH:MM:SS`, with RFC 3339 accepted too.
/// Re-serialized in ISO 8601 form.
pub mod crm_datetime {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const CRM_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
    const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn parse(value: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(value, CRM_FORMAT)
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.naive_local()))
            .or_else(|| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").ok())
    }

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(ISO_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw)))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) => parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw))),
            }
        }
    }
}
