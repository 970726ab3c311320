//! DiagnosisService over the fallback catalog and scripted catalogs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dermyx_common::entities::{Disease, Symptom, SymptomCategory, Treatment};
use dermyx_common::ScoringConfig;
use dermyx_db::{
    AssociationData, AssociationRow, CatalogProvider, DbError, DiseasePage, DiseaseQuery,
    FallbackCatalog, StoreHealth,
};
use dermyx_engine::{DiagnosisService, ScoringStrategy};
use dermyx_test_utils::{assert_eq, common_disease, disease, symptom};

// ── Scripted catalog ─────────────────────────────────────────────────────────

struct ScriptedCatalog {
    rows: Vec<AssociationRow>,
    fail: bool,
    calls: AtomicUsize,
}

impl ScriptedCatalog {
    fn new(rows: Vec<AssociationRow>) -> Self {
        Self { rows, fail: false, calls: AtomicUsize::new(0) }
    }

    fn failing() -> Self {
        Self { rows: Vec::new(), fail: true, calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl CatalogProvider for ScriptedCatalog {
    async fn fetch_associations(&self, symptom_ids: &[String]) -> dermyx_db::Result<AssociationData> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DbError::Timeout);
        }
        let rows = self
            .rows
            .iter()
            .filter(|r| symptom_ids.contains(&r.symptom.id))
            .cloned()
            .collect();
        Ok(AssociationData::Weighted(rows))
    }

    async fn fetch_disease(&self, _id: &str) -> dermyx_db::Result<Option<Disease>> {
        Ok(None)
    }

    async fn fetch_treatments(&self, _disease_id: &str) -> dermyx_db::Result<Vec<Treatment>> {
        Ok(Vec::new())
    }

    async fn fetch_symptoms(&self, _category_id: Option<&str>) -> dermyx_db::Result<Vec<Symptom>> {
        Ok(Vec::new())
    }

    async fn fetch_symptom_categories(&self) -> dermyx_db::Result<Vec<SymptomCategory>> {
        Ok(Vec::new())
    }

    async fn search_diseases(&self, query: &DiseaseQuery) -> dermyx_db::Result<DiseasePage> {
        Ok(DiseasePage {
            diseases: Vec::new(),
            total: 0,
            page: query.effective_page(),
            page_size: query.effective_page_size(),
        })
    }

    async fn health(&self) -> StoreHealth {
        StoreHealth::disconnected()
    }
}

fn row(d: &Disease, sid: &str, weight: f64, rel: f64, freq: f64, diag: bool) -> AssociationRow {
    AssociationRow {
        disease: d.clone(),
        symptom: symptom(sid, weight),
        relevance_score: rel,
        frequency_percentage: freq,
        is_diagnostic: diag,
        stage: None,
    }
}

fn ids(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn fallback_service() -> DiagnosisService {
    DiagnosisService::new(Arc::new(FallbackCatalog::new()), ScoringConfig::default())
}

// ── Fallback catalog ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fallback_itching_and_rash() {
    let out = fallback_service()
        .diagnose_by_symptoms(&ids(&["sym_001", "sym_002"]))
        .await
        .unwrap();

    let atopic = out.iter().find(|c| c.disease.id == "dis_001").unwrap();
    assert_eq!(atopic.matched_count(), 2);
    assert_eq!(atopic.confidence, 50);
    assert_eq!(atopic.strategy, ScoringStrategy::SimpleRatio);
    assert!(atopic.diagnostic_symptoms.is_empty());

    // Cellulitis lists neither symptom.
    assert!(out.iter().all(|c| c.disease.id != "dis_005"));
    assert!(out.windows(2).all(|w| w[0].confidence >= w[1].confidence));
    assert!(out.iter().all(|c| c.confidence <= 100));
}

#[tokio::test]
async fn test_duplicate_ids_count_once() {
    let service = fallback_service();
    let once = service.diagnose_by_symptoms(&ids(&["sym_001", "sym_002"])).await.unwrap();
    let twice = service
        .diagnose_by_symptoms(&ids(&["sym_001", "sym_002", "sym_001"]))
        .await
        .unwrap();
    assert_eq!(once, twice);
}

#[tokio::test]
async fn test_unknown_symptom_gives_no_candidates() {
    let out = fallback_service().diagnose_by_symptoms(&ids(&["sym_999"])).await.unwrap();
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_fallback_search_through_service() {
    let page = fallback_service()
        .search_diseases(&DiseaseQuery::new("皮膚炎", 1, 1))
        .await
        .unwrap();
    assert_eq!(page.diseases.len(), 1);
    assert!(page.total >= 2);
}

#[tokio::test]
async fn test_fallback_lookups_through_service() {
    let service = fallback_service();
    assert!(service.get_disease("dis_003").await.unwrap().is_some());
    assert!(service.get_disease("nope").await.unwrap().is_none());
    assert!(!service.get_treatments("dis_003").await.unwrap().is_empty());
    assert_eq!(service.get_symptoms(Some("cat_003")).await.unwrap().len(), 1);
    assert_eq!(service.get_symptom_categories().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_keyword_symptom_search() {
    let service = fallback_service();
    let hits = service.search_symptoms("PRURITUS").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "sym_001");
    assert_eq!(service.search_symptoms("かゆ").await.unwrap().len(), 1);
    assert_eq!(service.search_symptoms("  ").await.unwrap().len(), 10);
}

// ── Weighted catalog ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_weighted_scenario() {
    let plain = disease("dis_plain");
    let common = common_disease("dis_common");
    let catalog = ScriptedCatalog::new(vec![
        row(&plain, "s1", 3.0, 80.0, 70.0, true),
        row(&plain, "s2", 2.0, 50.0, 50.0, false),
        row(&common, "s1", 3.0, 80.0, 70.0, true),
        row(&common, "s2", 2.0, 50.0, 50.0, false),
    ]);
    let service = DiagnosisService::new(Arc::new(catalog), ScoringConfig::default());

    let out = service.diagnose_by_symptoms(&ids(&["s1", "s2"])).await.unwrap();
    let confidences: Vec<(&str, u8)> =
        out.iter().map(|c| (c.disease.id.as_str(), c.confidence)).collect();
    assert_eq!(confidences, vec![("dis_common", 43), ("dis_plain", 39)]);
    assert_eq!(out[0].diagnostic_symptoms, vec!["s1".to_string()]);
}

#[tokio::test]
async fn test_empty_request_skips_catalog() {
    let catalog = Arc::new(ScriptedCatalog::new(Vec::new()));
    let service = DiagnosisService::new(catalog.clone(), ScoringConfig::default());

    assert!(service.diagnose_by_symptoms(&[]).await.unwrap().is_empty());
    assert!(service.diagnose_by_symptoms(&ids(&["  "])).await.unwrap().is_empty());
    assert_eq!(catalog.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_store_failure_propagates() {
    let service = DiagnosisService::new(Arc::new(ScriptedCatalog::failing()), ScoringConfig::default());
    let err = service.diagnose_by_symptoms(&ids(&["s1"])).await.unwrap_err();
    assert!(matches!(err, DbError::Timeout));
}

#[tokio::test]
async fn test_concurrent_requests_agree() {
    let service = fallback_service();
    let request = ids(&["sym_004", "sym_006"]);
    let (a, b) = tokio::join!(
        service.diagnose_by_symptoms(&request),
        service.diagnose_by_symptoms(&request)
    );
    assert_eq!(a.unwrap(), b.unwrap());
}
