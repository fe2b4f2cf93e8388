//! HTTP surface: liveness on `/` and pH prediction on `/prediksi`.

pub mod error;
pub mod handlers;
pub mod request;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use log::{info, warn};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::model::Artifacts;
use crate::utils::server_config::ServerConfig;

pub use error::PredictionError;
pub use request::{ColorReading, PredictionResponse};

/// Shared, read-only request context. `None` artifacts means the startup load failed.
#[derive(Clone, Default)]
pub struct AppState {
    artifacts: Option<Arc<Artifacts>>,
}

impl AppState {
    pub fn new(artifacts: Option<Arc<Artifacts>>) -> Self {
        Self { artifacts }
    }

    pub fn ready(artifacts: Artifacts) -> Self {
        Self::new(Some(Arc::new(artifacts)))
    }

    pub fn not_ready() -> Self {
        Self::new(None)
    }

    pub fn is_ready(&self) -> bool {
        self.artifacts.is_some()
    }

    pub fn artifacts(&self) -> Option<&Artifacts> {
        self.artifacts.as_deref()
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::home))
        .route("/prediksi", post(handlers::predict_ph))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    if !state.is_ready() {
        warn!("Starting without model artifacts; /prediksi will answer 500 until restart");
    }

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?;
    info!(
        "🚀 Prediction server listening on http://{}",
        listener.local_addr().context("Failed to read bound address")?
    );

    axum::serve(listener, router(state))
        .await
        .context("HTTP server terminated unexpectedly")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::loader::fixtures::{model_json, scaler_json};
    use crate::model::{InferenceError, Predictor, Regressor, Scaler};
    use crate::utils::constants::{HOME_MESSAGE, INCOMPLETE_DATA_MESSAGE, NOT_READY_MESSAGE};
    use axum::body::{to_bytes, Body, Bytes};
    use axum::http::{header, Method, Request, StatusCode};
    use ndarray::{Array1, ArrayView2};
    use serde_json::{json, Value as JsonValue};
    use tower::ServiceExt;

    fn fixture_artifacts() -> Artifacts {
        let scaler = Scaler::from_spec(serde_json::from_value(scaler_json()).unwrap()).unwrap();
        let model = Regressor::from_spec(serde_json::from_value(model_json()).unwrap()).unwrap();
        Artifacts::new(scaler, model)
    }

    fn reference_body() -> JsonValue {
        json!({
            "r_ref": 100, "g_ref": 150, "b_ref": 200,
            "r_sample": 90, "g_sample": 140, "b_sample": 195
        })
    }

    fn post_json(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/prediksi")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    fn get_home() -> Request<Body> {
        Request::builder().uri("/").body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Bytes) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, body)
    }

    fn json_of(bytes: &Bytes) -> JsonValue {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_home_is_up_regardless_of_state() {
        for state in [AppState::ready(fixture_artifacts()), AppState::not_ready()] {
            let app = router(state);
            let (status, body) = send(&app, get_home()).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, HOME_MESSAGE.as_bytes());
        }
    }

    #[tokio::test]
    async fn test_predict_success_is_rounded() {
        let app = router(AppState::ready(fixture_artifacts()));
        let (status, body) = send(&app, post_json(reference_body().to_string())).await;
        assert_eq!(status, StatusCode::OK);
        let json = json_of(&body);
        // raw output is 7.3779296875
        assert_eq!(json, json!({"prediksi_ph": 7.38}));
    }

    #[tokio::test]
    async fn test_predict_is_deterministic() {
        let app = router(AppState::ready(fixture_artifacts()));
        let (_, first) = send(&app, post_json(reference_body().to_string())).await;
        for _ in 0..5 {
            let (status, again) = send(&app, post_json(reference_body().to_string())).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(again, first);
        }
    }

    #[tokio::test]
    async fn test_predict_missing_key_is_bad_request() {
        let app = router(AppState::ready(fixture_artifacts()));
        let mut body = reference_body();
        body.as_object_mut().unwrap().remove("b_sample");
        let (status, resp) = send(&app, post_json(body.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_of(&resp), json!({"error": INCOMPLETE_DATA_MESSAGE}));
    }

    #[tokio::test]
    async fn test_predict_not_ready_for_any_input() {
        let app = router(AppState::not_ready());
        let bodies = vec![
            reference_body().to_string(),
            "{}".to_string(),
            "not json".to_string(),
            String::new(),
        ];
        for body in bodies {
            let (status, resp) = send(&app, post_json(body)).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(json_of(&resp), json!({"error": NOT_READY_MESSAGE}));
        }
    }

    #[tokio::test]
    async fn test_predict_non_numeric_is_server_error() {
        let app = router(AppState::ready(fixture_artifacts()));
        let mut body = reference_body();
        body["g_ref"] = json!("150");
        let (status, resp) = send(&app, post_json(body.to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error = json_of(&resp)["error"].as_str().unwrap().to_string();
        assert!(error.contains("g_ref") && error.contains("numeric"), "{}", error);
    }

    #[tokio::test]
    async fn test_predict_malformed_body_is_server_error() {
        let app = router(AppState::ready(fixture_artifacts()));
        for body in ["{\"r_ref\": ", "[]", "null"] {
            let (status, resp) = send(&app, post_json(body)).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert!(json_of(&resp)["error"].is_string());
        }
    }

    struct BrokenModel;

    impl Predictor for BrokenModel {
        fn predict(&self, _batch: ArrayView2<'_, f64>) -> Result<Array1<f64>, InferenceError> {
            Err(InferenceError::FeatureCountMismatch {
                expected: 7,
                actual: 6,
            })
        }
    }

    #[tokio::test]
    async fn test_predict_artifact_failure_is_reported() {
        let scaler = Scaler::from_spec(serde_json::from_value(scaler_json()).unwrap()).unwrap();
        let app = router(AppState::ready(Artifacts::new(scaler, BrokenModel)));
        let (status, resp) = send(&app, post_json(reference_body().to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_of(&resp),
            json!({"error": "expected 7 features per row, got 6"})
        );
    }

    #[tokio::test]
    async fn test_predict_huge_output_is_still_a_number() {
        let identity = json!({
            "kind": "standard",
            "mean": [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            "scale": [1.0, 1.0, 1.0, 1.0, 1.0, 1.0]
        });
        let passthrough = json!({"kind": "linear", "coef": [1, 0, 0, 0, 0, 0], "intercept": 0});
        let scaler = Scaler::from_spec(serde_json::from_value(identity).unwrap()).unwrap();
        let model = Regressor::from_spec(serde_json::from_value(passthrough).unwrap()).unwrap();
        let app = router(AppState::ready(Artifacts::new(scaler, model)));

        let mut body = reference_body();
        body["r_ref"] = json!(1e307);
        let (status, resp) = send(&app, post_json(body.to_string())).await;
        assert_eq!(status, StatusCode::OK);
        let ph = &json_of(&resp)["prediksi_ph"];
        assert!(ph.is_number(), "{}", ph);
        assert_eq!(ph.as_f64(), Some(1e307));
    }

    #[tokio::test]
    async fn test_predict_requires_post() {
        let app = router(AppState::ready(fixture_artifacts()));
        let req = Request::builder()
            .uri("/prediksi")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let app = router(AppState::not_ready());
        let req = Request::builder()
            .uri("/")
            .header(header::ORIGIN, "http://192.168.1.20:8100")
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );

        let preflight = Request::builder()
            .method(Method::OPTIONS)
            .uri("/prediksi")
            .header(header::ORIGIN, "http://192.168.1.20:8100")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(preflight).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
    }

    #[test]
    fn test_state_readiness() {
        assert!(AppState::ready(fixture_artifacts()).is_ready());
        assert!(!AppState::not_ready().is_ready());
        assert!(AppState::default().artifacts().is_none());
    }
}
