//! Built-in fallback catalog.
//!
//! A small, fixed dataset of skin conditions used whenever the remote store is
//! not configured. All data in this module is hand-curated reference content;
//! nothing is fetched and nothing is mutated after the first access.
//!
//! The catalog only knows which symptom ids each disease lists, not per-pair
//! relevance metadata, so it serves `AssociationData::Linked`.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use async_trait::async_trait;
use dermyx_common::entities::{
    Availability, CostLevel, Disease, DiseaseCategory, EvidenceLevel, GenderPreference,
    SeverityLevel, Symptom, SymptomCategory, Treatment, TreatmentType,
};

use crate::error::Result;
use crate::provider::CatalogProvider;
use crate::schema::{
    AssociationData, DiseasePage, DiseaseQuery, LinkedRow, StoreHealth, TableStatus,
    TABLE_DISEASES, TABLE_DISEASE_SYMPTOMS, TABLE_SYMPTOMS, TABLE_TREATMENTS,
};

/// A disease together with the ids of the symptoms it presents with.
#[derive(Debug, Clone)]
pub struct CatalogDisease {
    pub disease: Disease,
    pub symptom_ids: Vec<&'static str>,
}

/// The complete in-memory dataset.
#[derive(Debug)]
pub struct CatalogData {
    pub symptom_categories: Vec<SymptomCategory>,
    pub symptoms: Vec<Symptom>,
    pub diseases: Vec<CatalogDisease>,
    pub treatments: Vec<Treatment>,
}

static CATALOG: OnceLock<CatalogData> = OnceLock::new();

/// Shared dataset, built on first use.
pub fn catalog() -> &'static CatalogData {
    CATALOG.get_or_init(build_catalog)
}

/// `CatalogProvider` over the built-in dataset.
#[derive(Debug, Clone, Copy)]
pub struct FallbackCatalog {
    data: &'static CatalogData,
}

impl FallbackCatalog {
    pub fn new() -> Self {
        Self { data: catalog() }
    }

    fn symptom(&self, id: &str) -> Option<&'static Symptom> {
        self.data.symptoms.iter().find(|s| s.id == id)
    }
}

impl Default for FallbackCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogProvider for FallbackCatalog {
    async fn fetch_associations(&self, symptom_ids: &[String]) -> Result<AssociationData> {
        if symptom_ids.is_empty() {
            return Ok(AssociationData::Linked(Vec::new()));
        }

        let mut rows = Vec::new();
        for entry in &self.data.diseases {
            for sid in &entry.symptom_ids {
                if !symptom_ids.iter().any(|requested| requested.as_str() == *sid) {
                    continue;
                }
                // A listed id without a symptom record is a dangling link.
                let Some(symptom) = self.symptom(sid) else { continue };
                rows.push(LinkedRow {
                    disease: entry.disease.clone(),
                    symptom: symptom.clone(),
                    disease_symptom_count: entry.symptom_ids.len(),
                });
            }
        }
        Ok(AssociationData::Linked(rows))
    }

    async fn fetch_disease(&self, id: &str) -> Result<Option<Disease>> {
        Ok(self
            .data
            .diseases
            .iter()
            .find(|d| d.disease.id == id)
            .map(|d| d.disease.clone()))
    }

    async fn fetch_treatments(&self, disease_id: &str) -> Result<Vec<Treatment>> {
        let mut treatments: Vec<Treatment> = self
            .data
            .treatments
            .iter()
            .filter(|t| t.disease_id == disease_id)
            .cloned()
            .collect();
        treatments.sort_by_key(|t| !t.first_line);
        Ok(treatments)
    }

    async fn fetch_symptoms(&self, category_id: Option<&str>) -> Result<Vec<Symptom>> {
        Ok(self
            .data
            .symptoms
            .iter()
            .filter(|s| category_id.is_none() || s.category_id.as_deref() == category_id)
            .cloned()
            .collect())
    }

    async fn fetch_symptom_categories(&self) -> Result<Vec<SymptomCategory>> {
        let mut categories = self.data.symptom_categories.clone();
        categories.sort_by_key(|c| c.display_order);
        Ok(categories)
    }

    async fn search_diseases(&self, query: &DiseaseQuery) -> Result<DiseasePage> {
        let matching: Vec<&Disease> = self
            .data
            .diseases
            .iter()
            .map(|d| &d.disease)
            .filter(|d| query.matches(d))
            .collect();

        let diseases = matching
            .iter()
            .skip(query.offset())
            .take(query.effective_page_size())
            .map(|d| (*d).clone())
            .collect();

        Ok(DiseasePage {
            diseases,
            total: matching.len(),
            page: query.effective_page(),
            page_size: query.effective_page_size(),
        })
    }

    async fn health(&self) -> StoreHealth {
        let links: usize = self.data.diseases.iter().map(|d| d.symptom_ids.len()).sum();
        let counts = [
            (TABLE_DISEASES, self.data.diseases.len()),
            (TABLE_SYMPTOMS, self.data.symptoms.len()),
            (TABLE_DISEASE_SYMPTOMS, links),
            (TABLE_TREATMENTS, self.data.treatments.len()),
        ];
        let tables: BTreeMap<String, TableStatus> = counts
            .into_iter()
            .map(|(t, n)| (t.to_string(), TableStatus { reachable: true, rows: Some(n as u64) }))
            .collect();
        StoreHealth::from_tables(tables)
    }
}

// ── Dataset ──────────────────────────────────────────────────────────────────

fn symptom(
    id: &str,
    name: &str,
    name_en: &str,
    category_id: &str,
    description: &str,
    severity_weight: f64,
    is_primary: bool,
    is_objective: bool,
    keywords: &[&str],
) -> Symptom {
    Symptom {
        id: id.to_string(),
        name: name.to_string(),
        name_en: name_en.to_string(),
        description: description.to_string(),
        severity_weight,
        is_primary,
        is_objective,
        category_id: Some(category_id.to_string()),
        search_keywords: keywords.iter().map(|k| k.to_string()).collect(),
        created_at: None,
    }
}

fn symptom_category(id: &str, name: &str, name_en: &str, display_order: i32) -> SymptomCategory {
    SymptomCategory {
        id: id.to_string(),
        name: name.to_string(),
        name_en: name_en.to_string(),
        description: None,
        display_order,
    }
}

fn disease_category(id: &str, name: &str, name_en: &str) -> DiseaseCategory {
    DiseaseCategory {
        id: Some(id.to_string()),
        name: name.to_string(),
        name_en: Some(name_en.to_string()),
    }
}

struct DiseaseSeed {
    id: &'static str,
    name: &'static str,
    name_en: &'static str,
    category: DiseaseCategory,
    overview: &'static str,
    detailed_description: &'static str,
    prevalence: f64,
    severity_level: SeverityLevel,
    is_common: bool,
    is_emergency: bool,
    chronic: bool,
    contagious: bool,
    symptom_ids: Vec<&'static str>,
}

impl DiseaseSeed {
    fn build(self) -> CatalogDisease {
        CatalogDisease {
            disease: Disease {
                id: self.id.to_string(),
                name: self.name.to_string(),
                name_en: self.name_en.to_string(),
                category_id: self.category.id.clone(),
                category: Some(self.category),
                overview: self.overview.to_string(),
                detailed_description: Some(self.detailed_description.to_string()),
                prevalence: self.prevalence,
                severity_level: self.severity_level,
                is_common: self.is_common,
                is_emergency: self.is_emergency,
                chronic: self.chronic,
                genetic_factor: false,
                contagious: self.contagious,
                gender_preference: GenderPreference::Both,
                age_group: Vec::new(),
                seasonal_pattern: Vec::new(),
                search_keywords: Vec::new(),
                icd10_code: None,
                created_at: None,
            },
            symptom_ids: self.symptom_ids,
        }
    }
}

fn treatment(
    id: &str,
    disease_id: &str,
    name: &str,
    name_en: &str,
    treatment_type: TreatmentType,
    effectiveness_score: f64,
    evidence_level: EvidenceLevel,
    availability: Availability,
    first_line: bool,
) -> Treatment {
    Treatment {
        id: id.to_string(),
        disease_id: disease_id.to_string(),
        name: name.to_string(),
        name_en: Some(name_en.to_string()),
        treatment_type,
        description: None,
        dosage: None,
        duration: None,
        effectiveness_score,
        evidence_level,
        side_effects: Vec::new(),
        contraindications: Vec::new(),
        cost_level: Some(CostLevel::Low),
        availability: Some(availability),
        first_line,
    }
}

fn build_catalog() -> CatalogData {
    let symptom_categories = vec![
        symptom_category("cat_001", "皮膚症状", "Skin Symptoms", 1),
        symptom_category("cat_002", "痛み・感覚", "Pain & Sensation", 2),
        symptom_category("cat_003", "感染症状", "Infection Symptoms", 3),
        symptom_category("cat_004", "色素変化", "Pigmentation Changes", 4),
    ];

    let symptoms = vec![
        symptom("sym_001", "かゆみ", "Itching", "cat_001", "皮膚のかゆみや掻きたい感覚", 3.0, true, false,
                &["かゆみ", "かゆい", "むずむず", "itching", "pruritus"]),
        symptom("sym_002", "発疹", "Rash", "cat_001", "皮膚に現れる赤い斑点や隆起", 4.0, true, true,
                &["発疹", "はっしん", "ぶつぶつ", "rash", "eruption"]),
        symptom("sym_003", "乾燥", "Dryness", "cat_001", "皮膚の水分不足による乾燥状態", 2.0, false, true,
                &["乾燥", "かんそう", "カサカサ", "dryness", "xerosis"]),
        symptom("sym_004", "赤み", "Redness", "cat_001", "皮膚の炎症による赤色の変化", 3.0, true, true,
                &["赤み", "あかみ", "赤い", "redness", "erythema"]),
        symptom("sym_005", "腫れ", "Swelling", "cat_001", "皮膚や組織の膨張", 4.0, true, true,
                &["腫れ", "はれ", "膨らみ", "swelling", "edema"]),
        symptom("sym_006", "痛み", "Pain", "cat_002", "皮膚や患部の痛みや不快感", 4.0, true, false,
                &["痛み", "いたみ", "痛い", "pain", "ache"]),
        symptom("sym_007", "水ぶくれ", "Blisters", "cat_001", "皮膚に形成される液体を含む小さな袋", 5.0, true, true,
                &["水ぶくれ", "みずぶくれ", "水疱", "blisters", "vesicles"]),
        symptom("sym_008", "うろこ状の皮膚", "Scaling", "cat_001", "皮膚の表面が剥がれてうろこ状になる", 3.0, false, true,
                &["うろこ", "スケール", "皮むけ", "scaling", "desquamation"]),
        symptom("sym_009", "膿", "Pus", "cat_003", "感染による黄色や緑色の分泌物", 5.0, true, true,
                &["膿", "うみ", "化膿", "pus", "purulent"]),
        symptom("sym_010", "黒い斑点", "Dark spots", "cat_004", "皮膚に現れる黒色や茶色の色素沈着", 2.0, false, true,
                &["黒い斑点", "色素沈着", "シミ", "dark spots", "hyperpigmentation"]),
    ];

    let inflammatory = disease_category("dcat_001", "炎症性皮膚疾患", "Inflammatory Skin Diseases");
    let infectious = disease_category("dcat_002", "感染性皮膚疾患", "Infectious Skin Diseases");
    let autoimmune = disease_category("dcat_004", "自己免疫性皮膚疾患", "Autoimmune Skin Diseases");

    let diseases = vec![
        DiseaseSeed {
            id: "dis_001",
            name: "アトピー性皮膚炎",
            name_en: "Atopic Dermatitis",
            category: inflammatory.clone(),
            overview: "慢性的な炎症性皮膚疾患で、強いかゆみと特徴的な皮疹を伴います。",
            detailed_description: "アトピー性皮膚炎は、遺伝的要因と環境要因が複合的に関与する慢性炎症性皮膚疾患です。主に乳幼児期に発症し、成人まで持続することがあります。",
            prevalence: 0.15,
            severity_level: SeverityLevel::Moderate,
            is_common: true,
            is_emergency: false,
            chronic: true,
            contagious: false,
            symptom_ids: vec!["sym_001", "sym_002", "sym_003", "sym_004"],
        },
        DiseaseSeed {
            id: "dis_002",
            name: "接触性皮膚炎",
            name_en: "Contact Dermatitis",
            category: inflammatory.clone(),
            overview: "特定の物質との接触により引き起こされる皮膚の炎症反応です。",
            detailed_description: "接触性皮膚炎は、アレルゲンや刺激物質との接触により生じる皮膚炎症です。アレルギー性と刺激性の2つのタイプがあります。",
            prevalence: 0.20,
            severity_level: SeverityLevel::Mild,
            is_common: true,
            is_emergency: false,
            chronic: false,
            contagious: false,
            symptom_ids: vec!["sym_001", "sym_002", "sym_004", "sym_006"],
        },
        DiseaseSeed {
            id: "dis_003",
            name: "帯状疱疹",
            name_en: "Herpes Zoster",
            category: infectious.clone(),
            overview: "水痘・帯状疱疹ウイルスの再活性化により起こる感染症です。",
            detailed_description: "帯状疱疹は、過去に水痘に感染した人の神経節に潜伏していたウイルスが再活性化することで発症します。特徴的な帯状の水疱と強い痛みを伴います。",
            prevalence: 0.05,
            severity_level: SeverityLevel::High,
            is_common: false,
            is_emergency: false,
            chronic: false,
            contagious: true,
            symptom_ids: vec!["sym_006", "sym_007", "sym_004", "sym_002"],
        },
        DiseaseSeed {
            id: "dis_004",
            name: "乾癬",
            name_en: "Psoriasis",
            category: autoimmune,
            overview: "慢性的な自己免疫性皮膚疾患で、特徴的な鱗屑を伴う紅斑が現れます。",
            detailed_description: "乾癬は、免疫系の異常により皮膚細胞の増殖が亢進する慢性疾患です。遺伝的素因と環境要因が関与します。",
            prevalence: 0.03,
            severity_level: SeverityLevel::Moderate,
            is_common: false,
            is_emergency: false,
            chronic: true,
            contagious: false,
            symptom_ids: vec!["sym_004", "sym_008", "sym_001", "sym_002"],
        },
        DiseaseSeed {
            id: "dis_005",
            name: "蜂窩織炎",
            name_en: "Cellulitis",
            category: infectious,
            overview: "皮膚と皮下組織の細菌感染症で、急速に拡大する可能性があります。",
            detailed_description: "蜂窩織炎は、主に連鎖球菌や黄色ブドウ球菌による皮膚・軟部組織感染症です。適切な治療を行わないと重篤な合併症を引き起こす可能性があります。",
            prevalence: 0.02,
            severity_level: SeverityLevel::High,
            is_common: false,
            is_emergency: true,
            chronic: false,
            contagious: false,
            symptom_ids: vec!["sym_004", "sym_005", "sym_006", "sym_009"],
        },
        DiseaseSeed {
            id: "dis_006",
            name: "脂漏性皮膚炎",
            name_en: "Seborrheic Dermatitis",
            category: inflammatory,
            overview: "皮脂分泌の多い部位に生じる慢性炎症性皮膚疾患です。",
            detailed_description: "脂漏性皮膚炎は、皮脂分泌異常とマラセチア菌の関与により生じる皮膚炎です。頭皮、顔面、胸部などの脂漏部位に好発します。",
            prevalence: 0.08,
            severity_level: SeverityLevel::Mild,
            is_common: true,
            is_emergency: false,
            chronic: true,
            contagious: false,
            symptom_ids: vec!["sym_001", "sym_004", "sym_008", "sym_003"],
        },
    ]
    .into_iter()
    .map(DiseaseSeed::build)
    .collect();

    use Availability::*;
    use EvidenceLevel::*;
    use TreatmentType::*;
    let treatments = vec![
        treatment("trt_001", "dis_001", "抗ヒスタミン薬", "Oral antihistamines", Oral, 1.5, B, Otc, false),
        treatment("trt_002", "dis_001", "保湿剤", "Emollients", Topical, 2.5, A, Otc, true),
        treatment("trt_003", "dis_001", "ステロイド外用薬", "Topical corticosteroids", Topical, 2.8, A, Prescription, true),
        treatment("trt_004", "dis_002", "原因物質の回避", "Allergen avoidance", Lifestyle, 2.7, A, Otc, true),
        treatment("trt_005", "dis_002", "ステロイド外用薬", "Topical corticosteroids", Topical, 2.4, A, Prescription, false),
        treatment("trt_006", "dis_003", "抗ウイルス薬", "Oral antivirals", Oral, 2.6, A, Prescription, true),
        treatment("trt_007", "dis_003", "鎮痛薬", "Analgesics", Oral, 1.8, B, Otc, false),
        treatment("trt_008", "dis_004", "ビタミンD3外用薬", "Topical vitamin D analogues", Topical, 2.3, A, Prescription, true),
        treatment("trt_009", "dis_004", "光線療法", "Phototherapy", Procedure, 2.5, B, HospitalOnly, false),
        treatment("trt_010", "dis_005", "抗菌薬内服", "Oral antibiotics", Oral, 2.7, A, Prescription, true),
        treatment("trt_011", "dis_005", "抗菌薬点滴", "Intravenous antibiotics", Injection, 2.9, A, HospitalOnly, false),
        treatment("trt_012", "dis_006", "抗真菌外用薬", "Topical antifungals", Topical, 2.2, A, Prescription, true),
    ];

    CatalogData { symptom_categories, symptoms, diseases, treatments }
}
