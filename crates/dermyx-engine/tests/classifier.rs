//! ClassifierClient against a local stand-in service.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use dermyx_engine::{ClassifierClient, ClassifierError, ImagePrediction, PredictedDisease};
use dermyx_test_utils::{assert_eq, bind_local};
use serde_json::{json, Value};

const PNG_1PX: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

async fn predict(Json(body): Json<Value>) -> impl IntoResponse {
    if body.get("image").and_then(Value::as_str).is_none() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "No image provided" })));
    }
    (
        StatusCode::OK,
        Json(json!({ "results": [
            { "disease": { "id": "dis_004", "name": "乾癬", "name_en": "Psoriasis", "overview": "..." },
              "confidence": 0.7 },
            { "disease": { "id": null, "name": "Melanoma", "name_en": "Melanoma", "overview": "No details in DB" },
              "confidence": 0.2 }
        ]})),
    )
}

async fn refine(Json(body): Json<Value>) -> Json<Value> {
    // Echo the first result back with full confidence.
    let first = body["initial_results"][0].clone();
    Json(json!({ "results": [{ "disease": first["disease"], "confidence": 1.0 }] }))
}

async fn client() -> ClassifierClient {
    let router = Router::new()
        .route("/predict_image", post(predict))
        .route("/refine_diagnosis", post(refine));
    let (listener, base_url) = bind_local().await.unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    ClassifierClient::new(&base_url, Duration::from_secs(5), 5 * 1024 * 1024).unwrap()
}

#[tokio::test]
async fn test_predict_image() {
    let client = client().await;
    let results = client
        .predict_image(&format!("data:image/png;base64,{PNG_1PX}"))
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].disease.id.as_deref(), Some("dis_004"));
    assert!(results[1].disease.id.is_none());
}

#[tokio::test]
async fn test_rejected_locally_before_upload() {
    let client = client().await;
    let err = client
        .predict_image(&format!("data:image/bmp;base64,{PNG_1PX}"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClassifierError::UnsupportedMediaType(_)));
}

#[tokio::test]
async fn test_refine_diagnosis() {
    let client = client().await;
    let initial = vec![ImagePrediction {
        disease: PredictedDisease {
            id: Some("dis_004".into()),
            name: "乾癬".into(),
            name_en: Some("Psoriasis".into()),
            overview: None,
        },
        confidence: 0.4,
    }];
    let refined = client
        .refine_diagnosis(&initial, &["うろこ状の皮膚".to_string()])
        .await
        .unwrap();
    assert_eq!(refined.len(), 1);
    assert_eq!(refined[0].disease, initial[0].disease);
    assert_eq!(refined[0].confidence, 1.0);
}

#[tokio::test]
async fn test_unreachable_classifier_is_an_http_error() {
    let (listener, base_url) = bind_local().await.unwrap();
    drop(listener);
    let client = ClassifierClient::new(&base_url, Duration::from_secs(2), 1024).unwrap();
    let err = client.predict_image(PNG_1PX).await.unwrap_err();
    assert!(matches!(err, ClassifierError::Http(_) | ClassifierError::Timeout));
}
