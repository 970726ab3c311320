//! dermyx-engine: Symptom-to-disease scoring, result enrichment, the
//! diagnosis service facade and the image classifier client.

pub mod scorer;
pub mod normalise;
pub mod enrich;
pub mod service;
pub mod classifier;

pub use classifier::{ClassifierClient, ClassifierError, ImagePrediction, PredictedDisease};
pub use scorer::{score_associations, DiagnosisCandidate, MatchedSymptom, ScoringStrategy};
pub use service::DiagnosisService;
