pub mod records;
pub mod rows;

pub use records::{CandidateRecord, FinalResult, JobRecord, MatchAnalysisRecord};
