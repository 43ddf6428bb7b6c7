use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Payment API error: {status} - {message}")]
    Api { status: StatusCode, message: String },

    #[error("Checkout session not found")]
    SessionNotFound,
}

/// Checkout session as reported by the payment processor.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted payment page; present on freshly created sessions.
    pub url: Option<String>,
    pub payment_status: String, // "paid", "unpaid" or "no_payment_required"
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }
}

pub struct CreateCheckoutParams<'a> {
    pub product_name: &'a str,
    pub quantity: i32,
    pub unit_amount_cents: i64,
    pub success_url: &'a str,
    pub cancel_url: &'a str,
    /// Carried back verbatim when the session is retrieved later.
    pub metadata: Vec<(&'a str, String)>,
}

/// Opens a hosted checkout session at the processor
pub async fn create_checkout_session(
    api_base_url: &str,
    secret_key: &str,
    params: CreateCheckoutParams<'_>,
) -> Result<CheckoutSession, PaymentError> {
    let client = Client::new();

    let mut form: Vec<(String, String)> = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), params.success_url.to_string()),
        ("cancel_url".to_string(), params.cancel_url.to_string()),
        (
            "line_items[0][quantity]".to_string(),
            params.quantity.to_string(),
        ),
        (
            "line_items[0][price_data][currency]".to_string(),
            "usd".to_string(),
        ),
        (
            "line_items[0][price_data][unit_amount]".to_string(),
            params.unit_amount_cents.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]".to_string(),
            params.product_name.to_string(),
        ),
    ];
    for (key, value) in params.metadata {
        form.push((format!("metadata[{}]", key), value));
    }

    let response = client
        .post(format!("{}/v1/checkout/sessions", api_base_url))
        .basic_auth(secret_key, None::<&str>)
        .form(&form)
        .send()
        .await?;

    parse_session_response(response).await
}

/// Retrieves a checkout session; the caller reads back `payment_status`
/// and the metadata bag attached at creation time
pub async fn retrieve_checkout_session(
    api_base_url: &str,
    secret_key: &str,
    session_id: &str,
) -> Result<CheckoutSession, PaymentError> {
    let client = Client::new();

    let response = client
        .get(format!(
            "{}/v1/checkout/sessions/{}",
            api_base_url, session_id
        ))
        .basic_auth(secret_key, None::<&str>)
        .send()
        .await?;

    parse_session_response(response).await
}

/// Cheap reachability probe used by the health endpoint
pub async fn check_api_health(api_base_url: &str, secret_key: &str) -> Result<(), PaymentError> {
    let client = Client::new();

    let response = client
        .get(format!("{}/v1/checkout/sessions?limit=1", api_base_url))
        .basic_auth(secret_key, None::<&str>)
        .send()
        .await?;

    if response.status().is_success() {
        Ok(())
    } else {
        let status = response.status();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(PaymentError::Api { status, message })
    }
}

async fn parse_session_response(
    response: reqwest::Response,
) -> Result<CheckoutSession, PaymentError> {
    match response.status() {
        StatusCode::OK => response
            .json::<CheckoutSession>()
            .await
            .map_err(PaymentError::Http),
        StatusCode::NOT_FOUND => Err(PaymentError::SessionNotFound),
        other => {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(PaymentError::Api {
                status: other,
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn retrieve_parses_paid_session_with_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_test_paid"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_test_paid",
                "payment_status": "paid",
                "metadata": {
                    "quantity": "3",
                    "raffleId": "8d6e0b3e-1111-2222-3333-444444444444",
                    "userId": "u_1"
                }
            })))
            .mount(&server)
            .await;

        let session = retrieve_checkout_session(&server.uri(), "sk_test", "cs_test_paid")
            .await
            .expect("session should parse");

        assert!(session.is_paid());
        assert_eq!(session.id, "cs_test_paid");
        assert_eq!(
            session.metadata.get("quantity").map(String::as_str),
            Some("3")
        );
    }

    #[tokio::test]
    async fn retrieve_reports_unpaid_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_test_unpaid"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_test_unpaid",
                "payment_status": "unpaid"
            })))
            .mount(&server)
            .await;

        let session = retrieve_checkout_session(&server.uri(), "sk_test", "cs_test_unpaid")
            .await
            .expect("session should parse");

        assert!(!session.is_paid());
        assert!(session.metadata.is_empty());
    }

    #[tokio::test]
    async fn retrieve_maps_missing_session_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = retrieve_checkout_session(&server.uri(), "sk_test", "cs_gone").await;

        assert!(matches!(result, Err(PaymentError::SessionNotFound)));
    }

    #[tokio::test]
    async fn create_sends_metadata_and_returns_hosted_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(body_string_contains("metadata%5BuserId%5D=u_1"))
            .and(body_string_contains("line_items%5B0%5D%5Bquantity%5D=2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_new",
                "url": "https://pay.example.com/cs_new",
                "payment_status": "unpaid"
            })))
            .mount(&server)
            .await;

        let session = create_checkout_session(
            &server.uri(),
            "sk_test",
            CreateCheckoutParams {
                product_name: "Spring Raffle ticket",
                quantity: 2,
                unit_amount_cents: 1000,
                success_url: "https://example.com/done",
                cancel_url: "https://example.com/cancel",
                metadata: vec![("userId", "u_1".to_string())],
            },
        )
        .await
        .expect("session should be created");

        assert_eq!(session.id, "cs_new");
        assert_eq!(
            session.url.as_deref(),
            Some("https://pay.example.com/cs_new")
        );
    }

    #[tokio::test]
    async fn api_errors_surface_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_boom"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let result = retrieve_checkout_session(&server.uri(), "sk_test", "cs_boom").await;

        match result {
            Err(PaymentError::Api { status, message }) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(message, "upstream exploded");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn health_probe_lists_sessions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": []
            })))
            .mount(&server)
            .await;

        assert!(check_api_health(&server.uri(), "sk_test").await.is_ok());
    }
}
