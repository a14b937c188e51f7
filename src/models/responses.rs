use serde::{Deserialize, Serialize};
use crate::models::domain::{MatchResult, MatchStatus};

/// Counts per terminal state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_hotels: usize,
    pub confident: usize,
    pub ambiguous: usize,
    pub unmatched: usize,
}

/// Packaged output of one matching run, handed to the rendering collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub summary: ReportSummary,
    pub results: Vec<MatchResult>,
}

impl MatchReport {
    /// `total_hotels` is the number of distinct input hotels, since unmatched
    /// hotels may have been filtered out of `results`.
    pub fn new(total_hotels: usize, results: Vec<MatchResult>) -> Self {
        let confident = count(&results, MatchStatus::Confident);
        let ambiguous = count(&results, MatchStatus::Ambiguous);

        Self {
            generated_at: chrono::Utc::now(),
            summary: ReportSummary {
                total_hotels,
                confident,
                ambiguous,
                unmatched: total_hotels.saturating_sub(confident + ambiguous),
            },
            results,
        }
    }

    /// Results flagged for manual review
    pub fn ambiguous(&self) -> impl Iterator<Item = &MatchResult> {
        self.results.iter().filter(|r| r.status == MatchStatus::Ambiguous)
    }
}

fn count(results: &[MatchResult], status: MatchStatus) -> usize {
    results.iter().filter(|r| r.status == status).count()
}
