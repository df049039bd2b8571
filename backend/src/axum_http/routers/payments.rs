use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};
use crates::domain::{
    repositories::payment_gateway::PaymentGateway, value_objects::payments::CreatePaymentRequest,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    axum_http::{
        error_responses::ApiError,
        webhook_guard::{WebhookGuard, require_webhook_token},
    },
    usecases::payments::PaymentUseCase,
};

#[derive(Debug, Default, Deserialize)]
pub struct CancelPaymentParams {
    pub reason: Option<String>,
}

pub fn routes<G>(payment_gateway: Arc<G>, webhook_guard: Arc<WebhookGuard>) -> Router
where
    G: PaymentGateway + Send + Sync + 'static,
{
    let payment_usecase = PaymentUseCase::new(payment_gateway);

    let webhook = Router::new()
        .route("/webhook", post(process_webhook::<G>))
        .route_layer(middleware::from_fn_with_state(
            webhook_guard,
            require_webhook_token,
        ));

    Router::new()
        .route("/create", post(create_payment::<G>))
        .route("/status/:transaction_id", get(get_payment_status::<G>))
        .route(
            "/update/status/:transaction_id",
            post(update_payment_status::<G>),
        )
        .route("/cancel/:transaction_id", delete(cancel_payment::<G>))
        .merge(webhook)
        .with_state(Arc::new(payment_usecase))
}

pub async fn create_payment<G>(
    State(payment_usecase): State<Arc<PaymentUseCase<G>>>,
    Json(create_payment_request): Json<CreatePaymentRequest>,
) -> impl IntoResponse
where
    G: PaymentGateway + Send + Sync + 'static,
{
    match payment_usecase.create_payment(create_payment_request).await {
        Ok(payment) => (StatusCode::CREATED, Json(payment)).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

pub async fn get_payment_status<G>(
    State(payment_usecase): State<Arc<PaymentUseCase<G>>>,
    Path(transaction_id): Path<String>,
) -> impl IntoResponse
where
    G: PaymentGateway + Send + Sync + 'static,
{
    match payment_usecase.get_payment_status(&transaction_id).await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

pub async fn update_payment_status<G>(
    State(payment_usecase): State<Arc<PaymentUseCase<G>>>,
    Path(transaction_id): Path<String>,
) -> impl IntoResponse
where
    G: PaymentGateway + Send + Sync + 'static,
{
    match payment_usecase
        .update_payment_status_with_transaction_id(&transaction_id)
        .await
    {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({
                "message": "Payment updated successfully",
                "result": result,
            })),
        )
            .into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

// `reason` may come from the query string or a JSON body; the query wins.
pub async fn cancel_payment<G>(
    State(payment_usecase): State<Arc<PaymentUseCase<G>>>,
    Path(transaction_id): Path<String>,
    Query(params): Query<CancelPaymentParams>,
    body: Option<Json<CancelPaymentParams>>,
) -> impl IntoResponse
where
    G: PaymentGateway + Send + Sync + 'static,
{
    let reason = params
        .reason
        .or_else(|| body.and_then(|Json(body)| body.reason));

    match payment_usecase.cancel_payment(&transaction_id, reason).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "message": "Payment canceled successfully" })),
        )
            .into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

pub async fn process_webhook<G>(
    State(payment_usecase): State<Arc<PaymentUseCase<G>>>,
    Json(payload): Json<Value>,
) -> impl IntoResponse
where
    G: PaymentGateway + Send + Sync + 'static,
{
    match payment_usecase.process_payment_webhook(payload).await {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({
                "message": "Webhook processed successfully",
                "result": result,
            })),
        )
            .into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{axum_http::http_serve::build_router, config::config_loader};
    use axum::{
        body::{Body, to_bytes},
        http::Request,
        response::Response,
    };
    use chrono::{TimeZone, Utc};
    use crates::domain::{
        errors::AppError,
        repositories::payment_gateway::MockPaymentGateway,
        value_objects::{
            enums::payment_statuses::PaymentStatus,
            payments::{CancelPayment, PaymentCallbackStatus, PaymentRecord},
        },
    };
    use mockall::predicate::eq;
    use tower::ServiceExt;

    const WEBHOOK_TOKEN: &str = "webhook-secret";

    fn app(gateway: MockPaymentGateway) -> Router {
        let config = config_loader::load_from(|key| match key {
            "WEBHOOK_TOKEN" => Some(WEBHOOK_TOKEN.to_string()),
            _ => None,
        })
        .unwrap();

        build_router(&config, Arc::new(gateway)).unwrap()
    }

    fn sample_record(status: PaymentStatus) -> PaymentRecord {
        PaymentRecord {
            id: 555,
            order_id: Some(42),
            transaction_id: "555".to_string(),
            status,
            amount: 150.0,
            url_payment: "https://provider.example/ticket".to_string(),
            qr_code_string: "qr".to_string(),
            qr_code_base64: "base64".to_string(),
            items: None,
            expiration_date: None,
            client: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn create_answers_created_with_the_payment() {
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_create_payment().times(1).returning(|_| {
            Box::pin(async { Ok(sample_record(PaymentStatus::Pending)) })
        });

        let response = app(gateway)
            .oneshot(json_request(
                "POST",
                "/payment/create",
                json!({ "orderId": 42, "amount": 150.0 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["transactionId"], "555");
        assert_eq!(body["status"], "PENDING");
        assert_eq!(body["urlPayment"], "https://provider.example/ticket");
    }

    #[tokio::test]
    async fn validation_errors_use_the_error_envelope() {
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_create_payment().never();

        let response = app(gateway)
            .oneshot(json_request(
                "POST",
                "/payment/create",
                json!({ "amount": 150.0 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["message"], "Order ID is required");
        assert_eq!(body["error"], "BadRequestError");
        assert_eq!(body["path"], "/payment/create");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_create_payment().returning(|_| {
            Box::pin(async {
                Err(AppError::internal("Failed to generate payment", Some(json!("provider down"))).into())
            })
        });

        let response = app(gateway)
            .oneshot(json_request(
                "POST",
                "/payment/create",
                json!({ "orderId": 42, "amount": 150.0 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Failed to generate payment");
        assert_eq!(body["error"], "InternalServerError");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn status_returns_the_projection() {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_check_payment_status()
            .returning(|_| Box::pin(async { Ok(Some(sample_record(PaymentStatus::Paid))) }));

        let response = app(gateway)
            .oneshot(
                Request::builder()
                    .uri("/payment/status/555")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "orderId": 42,
                "amount": 150.0,
                "status": "PAID",
                "transactionId": "555"
            })
        );
    }

    #[tokio::test]
    async fn update_status_wraps_the_result() {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_check_payment_status()
            .returning(|_| Box::pin(async { Ok(Some(sample_record(PaymentStatus::Paid))) }));
        gateway
            .expect_update_status()
            .times(1)
            .returning(|_| Box::pin(async { Ok(None) }));

        let response = app(gateway)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/payment/update/status/555")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "message": "Payment updated successfully",
                "result": { "transactionId": "555", "status": "PAID" }
            })
        );
    }

    #[tokio::test]
    async fn cancel_prefers_query_reason_over_body() {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_check_payment_status()
            .returning(|_| Box::pin(async { Ok(Some(sample_record(PaymentStatus::Pending))) }));
        gateway
            .expect_cancel_payment()
            .with(eq(CancelPayment {
                transaction_id: "555".to_string(),
                reason: Some("duplicate".to_string()),
            }))
            .times(1)
            .returning(|_| Box::pin(async { Ok(json!({ "status": "cancelled" })) }));
        gateway
            .expect_update_status()
            .returning(|_| Box::pin(async { Ok(None) }));

        let response = app(gateway)
            .oneshot(json_request(
                "DELETE",
                "/payment/cancel/555?reason=duplicate",
                json!({ "reason": "ignored" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Payment canceled successfully" })
        );
    }

    #[tokio::test]
    async fn cancel_reads_reason_from_body() {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_check_payment_status()
            .returning(|_| Box::pin(async { Ok(Some(sample_record(PaymentStatus::Pending))) }));
        gateway
            .expect_cancel_payment()
            .with(eq(CancelPayment {
                transaction_id: "555".to_string(),
                reason: Some("customer request".to_string()),
            }))
            .times(1)
            .returning(|_| Box::pin(async { Ok(json!({})) }));
        gateway
            .expect_update_status()
            .returning(|_| Box::pin(async { Ok(None) }));

        let response = app(gateway)
            .oneshot(json_request(
                "DELETE",
                "/payment/cancel/555",
                json!({ "reason": "customer request" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn cancel_of_canceled_payment_is_bad_request() {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_check_payment_status()
            .returning(|_| Box::pin(async { Ok(Some(sample_record(PaymentStatus::Canceled))) }));
        gateway.expect_cancel_payment().never();

        let response = app(gateway)
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/payment/cancel/555")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Payment cannot be canceled in its current state");
    }

    #[tokio::test]
    async fn webhook_without_token_is_unauthorized() {
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_process_payment_callback().never();

        let response = app(gateway)
            .oneshot(json_request("POST", "/payment/webhook", json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Webhook token not provided");
        assert_eq!(body["error"], "UnauthorizedError");
    }

    #[tokio::test]
    async fn webhook_with_wrong_token_is_unauthorized() {
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_process_payment_callback().never();

        let mut request = json_request("POST", "/payment/webhook", json!({}));
        request
            .headers_mut()
            .insert("x-webhook-token", "wrong".parse().unwrap());

        let response = app(gateway).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], "Invalid webhook token");
    }

    #[tokio::test]
    async fn webhook_with_token_is_processed() {
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_process_payment_callback().times(1).returning(|_| {
            Box::pin(async {
                Ok(PaymentCallbackStatus {
                    transaction_id: Some("555".to_string()),
                    status: Some("PAID".to_string()),
                    ..Default::default()
                })
            })
        });
        gateway
            .expect_check_payment_status()
            .returning(|_| Box::pin(async { Ok(Some(sample_record(PaymentStatus::Pending))) }));
        gateway
            .expect_update_status()
            .times(1)
            .returning(|_| Box::pin(async { Ok(None) }));

        let mut request = json_request(
            "POST",
            "/payment/webhook",
            json!({ "type": "payment", "data": { "id": "555" } }),
        );
        request
            .headers_mut()
            .insert("x-webhook-token", WEBHOOK_TOKEN.parse().unwrap());

        let response = app(gateway).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "message": "Webhook processed successfully",
                "result": { "transactionId": "555", "status": "PAID" }
            })
        );
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let response = app(MockPaymentGateway::new())
            .oneshot(
                Request::builder()
                    .uri("/payment/unknown")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "NotFoundError");
        assert_eq!(body["path"], "/payment/unknown");
    }

    #[tokio::test]
    async fn health_answers_ok() {
        let response = app(MockPaymentGateway::new())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "message": "200 OK" }));
    }
}
