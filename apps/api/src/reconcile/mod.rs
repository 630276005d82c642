//! Schema reconciliation: turns inconsistently keyed model output into strict
//! candidate, job and match-analysis records.
//!
//! Pipeline: raw JSON → [`mapper`] (synonym keys to canonical keys) →
//! [`coerce`] (ratings, yes/no, skills, company facts) → [`normalizer`]
//! (recovery, defaults, conflicts, status) → [`experience`] (tenure total).
//!
//! Everything here is pure and synchronous. No function returns an error; bad
//! input degrades to a documented default.

pub mod coerce;
pub mod duration;
pub mod experience;
pub mod mapper;
pub mod normalizer;
pub mod synonyms;

use serde_json::{Map, Value};

/// A normalized record: every standard field present, canonical keys first,
/// passthrough metadata after.
pub type Record = Map<String, Value>;

pub use duration::{parse_duration, DateInterval};
pub use normalizer::{normalize_candidate, normalize_job, normalize_match_analysis};
pub use synonyms::fields;
