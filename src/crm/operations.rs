//! Upstream request shapes, one per business operation.
//!
//! Each builder maps a gateway request onto the CRM's exact field names and
//! nesting, producing a `RequestDescriptor` for the generic encoder.

use chrono::NaiveDate;
use serde::Serialize;

use crate::crm::encoder::RequestDescriptor;
use crate::crm::error::CrmResult;
use crate::crm::types::{
    CustomerFilter, CustomerOrdersQuery, NewCustomer, NewOrder, NewPayment, OrderItem, PageLimit,
    PaymentType, Phone,
};

pub const CUSTOMERS_PATH: &str = "/customers";
pub const CREATE_CUSTOMER_PATH: &str = "/customers/create";
pub const ORDERS_PATH: &str = "/orders";
pub const CREATE_ORDER_PATH: &str = "/orders/create";
pub const CREATE_PAYMENT_PATH: &str = "/orders/payments/create";
pub const PAYMENT_TYPES_PATH: &str = "/reference/payment-types";

#[derive(Serialize)]
struct CustomersQuery<'a> {
    #[serde(rename = "filter[name]")]
    name: Option<&'a str>,
    #[serde(rename = "filter[email]")]
    email: Option<&'a str>,
    #[serde(rename = "filter[dateFrom]")]
    date_from: Option<NaiveDate>,
    #[serde(rename = "filter[dateTo]")]
    date_to: Option<NaiveDate>,
    page: u32,
    limit: PageLimit,
}

#[derive(Serialize)]
struct OrdersQuery {
    page: u32,
    limit: PageLimit,
    #[serde(rename = "filter[customerId]")]
    customer_id: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomerPayload<'a> {
    external_id: Option<&'a str>,
    is_contact: Option<bool>,
    first_name: &'a str,
    last_name: Option<&'a str>,
    email: Option<&'a str>,
    phones: &'a [Phone],
}

#[derive(Serialize)]
struct CustomerRef {
    id: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderPayload<'a> {
    number: &'a str,
    customer: CustomerRef,
    first_name: Option<&'a str>,
    last_name: Option<&'a str>,
    email: Option<&'a str>,
    phone: Option<&'a str>,
    items: &'a [OrderItem],
}

#[derive(Serialize)]
struct OrderRef {
    id: u64,
}

#[derive(Serialize)]
struct PaymentPayload<'a> {
    amount: f64,
    comment: Option<&'a str>,
    order: OrderRef,
    #[serde(rename = "type")]
    kind: PaymentType,
}

/// Body of every create call: the site code plus one entity under its key.
#[derive(Serialize)]
struct SiteBody<'a, T: Serialize> {
    site: &'a str,
    #[serde(flatten)]
    entity: T,
}

#[derive(Serialize)]
struct CustomerEntity<'a> {
    customer: CustomerPayload<'a>,
}

#[derive(Serialize)]
struct OrderEntity<'a> {
    order: OrderPayload<'a>,
}

#[derive(Serialize)]
struct PaymentEntity<'a> {
    payment: PaymentPayload<'a>,
}

pub fn list_customers(filter: &CustomerFilter) -> CrmResult<RequestDescriptor> {
    RequestDescriptor::get(CUSTOMERS_PATH).with_query(&CustomersQuery {
        name: filter.name.as_deref(),
        email: filter.email.as_deref(),
        date_from: filter.date_of_signup_from,
        date_to: filter.date_of_signup_to,
        page: filter.page,
        limit: filter.limit,
    })
}

pub fn create_customer(site: &str, customer: &NewCustomer) -> CrmResult<RequestDescriptor> {
    RequestDescriptor::post(CREATE_CUSTOMER_PATH).with_body(&SiteBody {
        site,
        entity: CustomerEntity {
            customer: CustomerPayload {
                external_id: customer.external_id.as_deref(),
                is_contact: customer.is_contact,
                first_name: &customer.first_name,
                last_name: customer.last_name.as_deref(),
                email: customer.email.as_deref(),
                phones: &customer.phones,
            },
        },
    })
}

pub fn list_customer_orders(query: &CustomerOrdersQuery) -> CrmResult<RequestDescriptor> {
    RequestDescriptor::get(ORDERS_PATH).with_query(&OrdersQuery {
        page: query.page.page,
        limit: query.page.limit,
        customer_id: query.client_id,
    })
}

pub fn create_order(site: &str, order: &NewOrder) -> CrmResult<RequestDescriptor> {
    let client = order.client_data.as_ref();
    RequestDescriptor::post(CREATE_ORDER_PATH).with_body(&SiteBody {
        site,
        entity: OrderEntity {
            order: OrderPayload {
                number: &order.number,
                customer: CustomerRef {
                    id: order.client_id,
                },
                first_name: client.and_then(|c| c.first_name.as_deref()),
                last_name: client.and_then(|c| c.last_name.as_deref()),
                email: client.and_then(|c| c.email.as_deref()),
                phone: client.and_then(|c| c.phone.as_deref()),
                items: &order.items,
            },
        },
    })
}

pub fn create_payment(site: &str, payment: &NewPayment) -> CrmResult<RequestDescriptor> {
    RequestDescriptor::post(CREATE_PAYMENT_PATH).with_body(&SiteBody {
        site,
        entity: PaymentEntity {
            payment: PaymentPayload {
                amount: payment.payment_amount,
                comment: payment.payment_comment.as_deref(),
                order: OrderRef {
                    id: payment.order_id,
                },
                kind: payment.payment_type,
            },
        },
    })
}

pub fn payment_types() -> RequestDescriptor {
    RequestDescriptor::get(PAYMENT_TYPES_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crm::encoder::encode;
    use crate::crm::types::{OrderClientData, PageParams};
    use serde_json::{json, Value};

    fn form_value(form: &[(String, String)], key: &str) -> Option<Value> {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| serde_json::from_str(v).unwrap_or_else(|_| Value::String(v.clone())))
    }

    fn new_customer(phones: Vec<Phone>) -> NewCustomer {
        NewCustomer {
            first_name: "Ivan".to_string(),
            last_name: None,
            email: Some("ivan@example.com".to_string()),
            phones,
            external_id: None,
            is_contact: Some(true),
        }
    }

    #[test]
    fn test_list_customers_query_fields() {
        let filter = CustomerFilter {
            name: Some("Ivan".to_string()),
            date_of_signup_from: NaiveDate::from_ymd_opt(2023, 1, 21),
            ..CustomerFilter::default()
        };
        let encoded = encode(&list_customers(&filter).unwrap());
        let mut query = encoded.query.clone();
        query.sort();
        assert_eq!(
            query,
            vec![
                ("filter[dateFrom]".to_string(), "2023-01-21".to_string()),
                ("filter[name]".to_string(), "Ivan".to_string()),
                ("limit".to_string(), "20".to_string()),
                ("page".to_string(), "1".to_string()),
            ]
        );
        assert!(encoded.form.is_empty());
    }

    #[test]
    fn test_create_customer_serializes_phones() {
        let d = create_customer(
            "acme",
            &new_customer(vec![Phone {
                number: "+79990000000".to_string(),
            }]),
        )
        .unwrap();
        let encoded = encode(&d);
        assert_eq!(form_value(&encoded.form, "site"), Some(json!("acme")));

        let raw = &encoded.form.iter().find(|(k, _)| k == "customer").unwrap().1;
        assert!(raw.contains(r#""phones":[{"number":"+79990000000"}]"#));

        let customer = form_value(&encoded.form, "customer").unwrap();
        assert_eq!(customer["firstName"], "Ivan");
        assert_eq!(customer["isContact"], true);
    }

    #[test]
    fn test_create_customer_keeps_empty_phones() {
        let encoded = encode(&create_customer("acme", &new_customer(vec![])).unwrap());
        let customer = form_value(&encoded.form, "customer").unwrap();
        assert_eq!(customer["phones"], json!([]));
    }

    #[test]
    fn test_customer_orders_query() {
        let encoded = encode(
            &list_customer_orders(&CustomerOrdersQuery {
                client_id: 42,
                page: PageParams {
                    page: 2,
                    limit: PageLimit::Fifty,
                },
            })
            .unwrap(),
        );
        let mut query = encoded.query;
        query.sort();
        assert_eq!(
            query,
            vec![
                ("filter[customerId]".to_string(), "42".to_string()),
                ("limit".to_string(), "50".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_create_order_with_inline_client() {
        let order = NewOrder {
            number: "A-1".to_string(),
            client_id: None,
            client_data: Some(OrderClientData {
                first_name: Some("Anna".to_string()),
                phone: Some("+7000".to_string()),
                ..OrderClientData::default()
            }),
            items: vec![OrderItem {
                initial_price: 99.5,
                product_name: "Tea".to_string(),
            }],
        };
        let encoded = encode(&create_order("acme", &order).unwrap());
        let body = form_value(&encoded.form, "order").unwrap();
        assert_eq!(body["number"], "A-1");
        assert_eq!(body["customer"], json!({"id": null}));
        assert_eq!(body["firstName"], "Anna");
        assert_eq!(body["phone"], "+7000");
        assert_eq!(body["items"], json!([{"initialPrice": 99.5, "productName": "Tea"}]));
    }

    #[test]
    fn test_create_payment_body() {
        let payment = NewPayment {
            order_id: 9,
            payment_amount: 150.0,
            payment_type: PaymentType::Cash,
            payment_comment: None,
        };
        let d = create_payment("acme", &payment).unwrap();
        assert_eq!(d.path, CREATE_PAYMENT_PATH);
        let body = form_value(&encode(&d).form, "payment").unwrap();
        assert_eq!(
            body,
            json!({"amount": 150.0, "comment": null, "order": {"id": 9}, "type": "cash"})
        );
    }
}
