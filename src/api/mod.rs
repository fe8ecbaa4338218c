use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{ErrorScope, RelayError, Result};
use crate::relay::Relay;

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match self.scope() {
            ErrorScope::RejectBatch => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

pub fn create_router(relay: Arc<Relay>, notification_path: &str) -> Router {
    Router::new()
        .route(notification_path, post(pagerduty_notification))
        .route("/status", get(status_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(relay)
}

pub async fn start_server(config: Arc<Config>, relay: Arc<Relay>) -> Result<()> {
    let app = create_router(relay, &config.server.path);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RelayError::ServerError(format!("Failed to bind {}: {}", addr, e)))?;
    info!(
        "Listening for PagerDuty webhooks on http://{}{}",
        listener.local_addr()?,
        config.server.path
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| RelayError::ServerError(e.to_string()))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

// Acknowledges as soon as every event is scheduled. Deliveries are
// still in flight at this point and their outcome never shows up here.
async fn pagerduty_notification(
    State(relay): State<Arc<Relay>>,
    body: Bytes,
) -> std::result::Result<StatusCode, RelayError> {
    relay.process_batch(&body)?;
    Ok(StatusCode::OK)
}

async fn status_handler() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagerduty::fixtures::*;
    use crate::webhooks::MockDispatcher;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    fn router_with(dispatcher: MockDispatcher) -> Router {
        create_router(Arc::new(Relay::new(Arc::new(dispatcher))), "/PagerDutyNotification")
    }

    fn post_notification(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/PagerDutyNotification")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    #[tokio::test]
    async fn test_mixed_batch_is_acknowledged() {
        let mut dispatcher = MockDispatcher::new();
        dispatcher.expect_dispatch().times(2).return_const(());
        let app = router_with(dispatcher);

        let body = serde_json::to_vec(&batch(vec![
            trigger_event(),
            assign_event(),
            event_json("incident.annotate", incident_json("triggered", &[alice()])),
        ]))
        .unwrap();

        let response = app.oneshot(post_notification(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let mut dispatcher = MockDispatcher::new();
        dispatcher.expect_dispatch().never();
        let app = router_with(dispatcher);

        let response = app.oneshot(post_notification("{\"messages\": ")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).starts_with("Malformed inbound body"));
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let app = router_with(MockDispatcher::new());

        let response = app
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn test_get_on_notification_path_is_not_allowed() {
        let app = router_with(MockDispatcher::new());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/PagerDutyNotification")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
