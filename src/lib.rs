//! Finds preprints of published articles in Crossref.
//!
//! A record flows through `matching::QueryBuilder`, a `crossref::CandidateSource`
//! (normally `crossref::CrossrefClient`), `matching::filter_candidates`,
//! `matching::ScoringEngine` and `matching::MatchSelector`; `batch::BatchRunner`
//! drives whole files under a `batch::FailureGovernor`.

pub mod batch;
pub mod common;
pub mod crossref;
pub mod error;
pub mod matching;

pub use error::MatchError;
