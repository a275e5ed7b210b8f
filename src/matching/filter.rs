use crate::common::CandidateRecord;

/// Crossref work type used for preprints
pub const POSTED_CONTENT: &str = "posted-content";

pub fn is_preprint(candidate: &CandidateRecord) -> bool {
    candidate.work_type.eq_ignore_ascii_case(POSTED_CONTENT)
}

/// Keeps only preprint candidates, preserving order
pub fn filter_candidates(candidates: Vec<CandidateRecord>) -> Vec<CandidateRecord> {
    candidates.into_iter().filter(is_preprint).collect()
}
