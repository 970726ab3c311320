//! RemoteCatalog against a local PostgREST stand-in.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use dermyx_db::{AssociationData, CatalogProvider, DbError, DiseaseQuery, RemoteCatalog};
use dermyx_test_utils::{
    assert_eq, association_json, bind_local, disease, disease_json, symptom, symptom_json,
    with_category,
};
use secrecy::SecretString;
use serde_json::{json, Value};

#[derive(Debug, Clone)]
struct Seen {
    table: &'static str,
    params: HashMap<String, String>,
    apikey: Option<String>,
    authorization: Option<String>,
    prefer: Option<String>,
}

type Log = Arc<Mutex<Vec<Seen>>>;

fn record(log: &Log, table: &'static str, params: HashMap<String, String>, headers: &HeaderMap) {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    log.lock().unwrap().push(Seen {
        table,
        params,
        apikey: header("apikey"),
        authorization: header("authorization"),
        prefer: header("prefer"),
    });
}

async fn associations(
    State(log): State<Log>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    record(&log, "disease_symptoms", params, &headers);
    let d = with_category(disease("dis_001"), "dcat_001", "炎症性皮膚疾患");
    Json(json!([
        association_json(&d, &symptom("sym_001", 3.0), 80.0, 70.0, true),
        // Same pair at a later stage, lower relevance.
        association_json(&d, &symptom("sym_001", 3.0), 40.0, 70.0, false),
        // Embedded symptom missing its weight.
        {
            "disease_id": "dis_001", "symptom_id": "sym_003",
            "relevance_score": 50, "frequency_percentage": 50, "is_diagnostic": false,
            "disease": disease_json(&d),
            "symptom": { "id": "sym_003", "name": "乾燥", "name_en": "Dryness", "severity_weight": null }
        },
        // Join target hidden by row-level security.
        {
            "disease_id": "dis_002", "symptom_id": "sym_002",
            "relevance_score": 50, "frequency_percentage": 50, "is_diagnostic": false,
            "disease": null, "symptom": symptom_json(&symptom("sym_002", 4.0))
        }
    ]))
}

async fn diseases(
    State(log): State<Log>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    record(&log, "diseases", params, &headers);
    let d = with_category(disease("dis_001"), "dcat_001", "炎症性皮膚疾患");
    ([("content-range", "0-0/7")], Json(json!([disease_json(&d)])))
}

async fn symptoms(
    State(log): State<Log>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    record(&log, "symptoms", params, &headers);
    Json(json!([symptom_json(&symptom("sym_001", 3.0))]))
}

async fn treatments(
    State(log): State<Log>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    record(&log, "treatments", params, &headers);
    (StatusCode::INTERNAL_SERVER_ERROR, "relation does not exist")
}

async fn categories() -> &'static str {
    "<html>not json</html>"
}

async fn serve(router: Router) -> String {
    let (listener, base_url) = bind_local().await.unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    base_url
}

async fn stub() -> (RemoteCatalog, Log) {
    let log: Log = Arc::default();
    let router = Router::new()
        .route("/rest/v1/disease_symptoms", get(associations))
        .route("/rest/v1/diseases", get(diseases))
        .route("/rest/v1/symptoms", get(symptoms))
        .route("/rest/v1/treatments", get(treatments))
        .route("/rest/v1/symptom_categories", get(categories))
        .with_state(log.clone());
    let base_url = serve(router).await;
    let catalog = RemoteCatalog::new(
        &base_url,
        SecretString::from("anon-key".to_string()),
        Duration::from_secs(5),
    )
    .unwrap();
    (catalog, log)
}

fn last(log: &Log) -> Seen {
    log.lock().unwrap().last().cloned().unwrap()
}

#[tokio::test]
async fn test_associations_are_weighted_and_validated() {
    let (catalog, log) = stub().await;
    let ids = vec!["sym_001".to_string(), "sym_002".to_string()];

    let data = catalog.fetch_associations(&ids).await.unwrap();
    let AssociationData::Weighted(rows) = data else { panic!("remote rows must be weighted") };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].disease.id, "dis_001");
    assert_eq!(rows[0].relevance_score, 80.0);
    assert_eq!(rows[0].disease.category_name(), Some("炎症性皮膚疾患"));
    assert!(rows[0].is_diagnostic);

    let seen = last(&log);
    assert_eq!(seen.table, "disease_symptoms");
    assert_eq!(seen.params["symptom_id"], r#"in.("sym_001","sym_002")"#);
    assert!(seen.params["select"].contains("disease:diseases"));
    assert_eq!(seen.apikey.as_deref(), Some("anon-key"));
    assert_eq!(seen.authorization.as_deref(), Some("Bearer anon-key"));
}

#[tokio::test]
async fn test_empty_request_sends_nothing() {
    let (catalog, log) = stub().await;
    let data = catalog.fetch_associations(&[]).await.unwrap();
    assert!(data.is_empty());
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_search_reads_exact_count() {
    let (catalog, log) = stub().await;
    let query = DiseaseQuery::new("皮膚炎", 2, 1).with_category("dcat_001");

    let page = catalog.search_diseases(&query).await.unwrap();
    assert_eq!(page.total, 7);
    assert_eq!(page.page, 2);
    assert_eq!(page.page_size, 1);
    assert_eq!(page.diseases.len(), 1);

    let seen = last(&log);
    assert_eq!(seen.prefer.as_deref(), Some("count=exact"));
    assert_eq!(seen.params["offset"], "1");
    assert_eq!(seen.params["limit"], "1");
    assert_eq!(seen.params["category_id"], r#"eq."dcat_001""#);
    assert!(seen.params["or"].contains(r#"name.ilike."*皮膚炎*""#));
}

#[tokio::test]
async fn test_symptoms_filter_by_category() {
    let (catalog, log) = stub().await;
    let symptoms = catalog.fetch_symptoms(Some("cat_001")).await.unwrap();
    assert_eq!(symptoms.len(), 1);
    assert!(symptoms[0].description.is_empty());

    let seen = last(&log);
    assert_eq!(seen.params["category_id"], r#"eq."cat_001""#);
    assert_eq!(seen.params["order"], "name.asc");
}

#[tokio::test]
async fn test_error_status_is_surfaced() {
    let (catalog, _) = stub().await;
    let err = catalog.fetch_treatments("dis_001").await.unwrap_err();
    match err {
        DbError::Status { status, table, body } => {
            assert_eq!(status, 500);
            assert_eq!(table, "treatments");
            assert!(body.contains("relation"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let (catalog, _) = stub().await;
    let err = catalog.fetch_symptom_categories().await.unwrap_err();
    assert!(matches!(err, DbError::Decode { .. }));
}

#[tokio::test]
async fn test_health_marks_failing_table() {
    let (catalog, _) = stub().await;
    let health = catalog.health().await;
    assert!(health.connected);
    assert!(!health.initialized);
    assert!(!health.tables["treatments"].reachable);
    assert_eq!(health.tables["diseases"].rows, Some(7));
}

#[tokio::test]
async fn test_slow_store_times_out() {
    async fn slow() -> Json<Value> {
        tokio::time::sleep(Duration::from_secs(3)).await;
        Json(json!([]))
    }
    let base_url = serve(Router::new().route("/rest/v1/symptoms", get(slow))).await;
    let catalog = RemoteCatalog::new(
        &base_url,
        SecretString::from("anon-key".to_string()),
        Duration::from_millis(200),
    )
    .unwrap();

    let err = catalog.fetch_symptoms(None).await.unwrap_err();
    assert!(matches!(err, DbError::Timeout));
}
