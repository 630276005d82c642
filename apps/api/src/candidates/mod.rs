//! Candidates: resume ingest, status commands and recruiter chat.

pub mod chat;
pub mod handlers;
pub mod ingest;
pub mod status;
