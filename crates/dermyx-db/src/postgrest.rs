//! Remote catalog over the store's PostgREST interface.
//!
//! Endpoint: `{base_url}/rest/v1/{table}`
//!
//! Every call is a single read-only GET with the client's bounded timeout.
//! Nothing is retried: failures surface as `DbError` and the caller decides
//! whether to fall back.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use dermyx_common::entities::{Disease, Symptom, SymptomCategory, Treatment};
use dermyx_common::http::ScopedClient;
use dermyx_common::{DermyxError, StoreConfig};
use reqwest::header::CONTENT_RANGE;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::error::{DbError, Result};
use crate::provider::CatalogProvider;
use crate::schema::{
    validate_rows, AssociationData, DiseasePage, DiseaseQuery, StoreHealth,
    TableStatus, ASSOCIATION_SELECT, CORE_TABLES, DISEASE_SELECT, TABLE_DISEASES,
    TABLE_DISEASE_SYMPTOMS, TABLE_SYMPTOMS, TABLE_SYMPTOM_CATEGORIES, TABLE_TREATMENTS,
};

type Params = Vec<(&'static str, String)>;

pub struct RemoteCatalog {
    client: ScopedClient,
    base_url: String,
    api_key: SecretString,
}

impl RemoteCatalog {
    pub fn new(base_url: &str, api_key: SecretString, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let client = ScopedClient::for_base_url(&base_url, timeout)?;
        Ok(Self { client, base_url, api_key })
    }

    /// Build from configuration. The caller checks `is_configured` first.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| DermyxError::Config("store.url is not set".to_string()))?;
        let key = config
            .api_key
            .as_ref()
            .map(|k| SecretString::from(k.expose_secret().to_owned()))
            .ok_or_else(|| DermyxError::Config("store.api_key is not set".to_string()))?;
        Self::new(url, key, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, table: &str, params: &Params) -> Result<reqwest::RequestBuilder> {
        let key = self.api_key.expose_secret();
        Ok(self
            .client
            .get(&self.table_url(table))?
            .header("apikey", key)
            .bearer_auth(key)
            .header("Accept", "application/json")
            .query(params))
    }

    /// GET rows of one table; non-2xx statuses become `DbError::Status`.
    async fn fetch_rows<T: DeserializeOwned>(&self, table: &str, params: Params) -> Result<Vec<T>> {
        let (rows, _) = self.fetch_rows_counted(table, params, false).await?;
        Ok(rows)
    }

    async fn fetch_rows_counted<T: DeserializeOwned>(
        &self,
        table: &str,
        params: Params,
        count: bool,
    ) -> Result<(Vec<T>, Option<u64>)> {
        let mut req = self.request(table, &params)?;
        if count {
            req = req.header("Prefer", "count=exact");
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DbError::Status { status: status.as_u16(), table: table.to_string(), body });
        }

        let total = resp
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total);

        let bytes = resp.bytes().await?;
        let rows = serde_json::from_slice(&bytes)
            .map_err(|source| DbError::Decode { table: table.to_string(), source })?;

        debug!(table, total = ?total, "Remote store rows fetched");
        Ok((rows, total))
    }

    async fn check_table(&self, table: &str) -> TableStatus {
        let params: Params = vec![("select", "*".to_string()), ("limit", "1".to_string())];
        match self.fetch_rows_counted::<serde_json::Value>(table, params, true).await {
            Ok((rows, total)) => TableStatus {
                reachable: true,
                rows: total.or(Some(rows.len() as u64)),
            },
            Err(e) => {
                debug!(table, error = %e, "Table check failed");
                TableStatus { reachable: false, rows: None }
            }
        }
    }
}

#[async_trait]
impl CatalogProvider for RemoteCatalog {
    #[instrument(skip(self))]
    async fn fetch_associations(&self, symptom_ids: &[String]) -> Result<AssociationData> {
        if symptom_ids.is_empty() {
            return Ok(AssociationData::Weighted(Vec::new()));
        }

        let params: Params = vec![
            ("select", ASSOCIATION_SELECT.to_string()),
            ("symptom_id", in_list(symptom_ids)),
        ];
        // Rows decode one by one in `validate_rows`; a bad row never fails the batch.
        let raw: Vec<serde_json::Value> = self.fetch_rows(TABLE_DISEASE_SYMPTOMS, params).await?;
        let rows = validate_rows(raw);

        debug!(count = rows.len(), "Remote associations resolved");
        Ok(AssociationData::Weighted(rows))
    }

    #[instrument(skip(self))]
    async fn fetch_disease(&self, id: &str) -> Result<Option<Disease>> {
        let params: Params = vec![
            ("select", DISEASE_SELECT.to_string()),
            ("id", format!("eq.{}", quote(id))),
            ("limit", "1".to_string()),
        ];
        let rows: Vec<Disease> = self.fetch_rows(TABLE_DISEASES, params).await?;
        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self))]
    async fn fetch_treatments(&self, disease_id: &str) -> Result<Vec<Treatment>> {
        let params: Params = vec![
            ("select", "*".to_string()),
            ("disease_id", format!("eq.{}", quote(disease_id))),
            ("order", "first_line.desc".to_string()),
        ];
        self.fetch_rows(TABLE_TREATMENTS, params).await
    }

    #[instrument(skip(self))]
    async fn fetch_symptoms(&self, category_id: Option<&str>) -> Result<Vec<Symptom>> {
        let mut params: Params = vec![
            ("select", "*".to_string()),
            ("order", "name.asc".to_string()),
        ];
        if let Some(category) = category_id {
            params.push(("category_id", format!("eq.{}", quote(category))));
        }
        self.fetch_rows(TABLE_SYMPTOMS, params).await
    }

    #[instrument(skip(self))]
    async fn fetch_symptom_categories(&self) -> Result<Vec<SymptomCategory>> {
        let params: Params = vec![
            ("select", "id,name,name_en,description,display_order".to_string()),
            ("order", "display_order.asc".to_string()),
        ];
        self.fetch_rows(TABLE_SYMPTOM_CATEGORIES, params).await
    }

    #[instrument(skip(self))]
    async fn search_diseases(&self, query: &DiseaseQuery) -> Result<DiseasePage> {
        let page = query.effective_page();
        let page_size = query.effective_page_size();

        let mut params: Params = vec![
            ("select", DISEASE_SELECT.to_string()),
            ("order", "name.asc".to_string()),
            ("offset", query.offset().to_string()),
            ("limit", page_size.to_string()),
        ];

        let needle = sanitize_pattern(&query.needle());
        if !needle.is_empty() {
            let pattern = quote(&format!("*{needle}*"));
            params.push((
                "or",
                format!("(name.ilike.{pattern},name_en.ilike.{pattern},overview.ilike.{pattern})"),
            ));
        }
        if let Some(category) = &query.category_id {
            params.push(("category_id", format!("eq.{}", quote(category))));
        }
        if !query.severity.is_empty() {
            let levels: Vec<&str> = query.severity.iter().map(|s| s.as_str()).collect();
            params.push(("severity_level", format!("in.({})", levels.join(","))));
        }
        if let Some(common) = query.is_common {
            params.push(("is_common", format!("eq.{common}")));
        }
        if let Some(emergency) = query.is_emergency {
            params.push(("is_emergency", format!("eq.{emergency}")));
        }

        let (diseases, total): (Vec<Disease>, _) =
            self.fetch_rows_counted(TABLE_DISEASES, params, true).await?;
        let total = total
            .map(|t| t as usize)
            .unwrap_or_else(|| query.offset().saturating_add(diseases.len()));

        Ok(DiseasePage { diseases, total, page, page_size })
    }

    #[instrument(skip(self))]
    async fn health(&self) -> StoreHealth {
        let mut tables = BTreeMap::new();
        for table in CORE_TABLES {
            tables.insert(table.to_string(), self.check_table(table).await);
        }
        StoreHealth::from_tables(tables)
    }
}

// ── Filter helpers ───────────────────────────────────────────────────────────

/// Double-quote a filter value so commas and parentheses stay literal.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// `in.("a","b")` list filter.
fn in_list(values: &[String]) -> String {
    let quoted: Vec<String> = values.iter().map(|v| quote(v)).collect();
    format!("in.({})", quoted.join(","))
}

/// User text must not smuggle its own wildcards into an `ilike` pattern.
fn sanitize_pattern(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '*' | '%')).collect()
}

/// Total from a `Content-Range` header such as `0-9/42`; `*/0` gives 0,
/// an unknown total (`0-9/*`) gives `None`.
fn parse_content_range_total(header: &str) -> Option<u64> {
    header.rsplit('/').next()?.trim().parse().ok()
}
