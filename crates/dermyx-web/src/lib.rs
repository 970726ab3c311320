//! dermyx-web: JSON API for the Dermyx diagnosis engine.
//! Provides:
//!   - Symptom-based diagnosis
//!   - Disease search, detail and treatments
//!   - Symptom and category listings
//!   - Catalog status
//!   - Image classifier proxy

pub mod error;
pub mod router;
pub mod handlers;
pub mod state;
