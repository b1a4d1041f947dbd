use serde::{Deserialize, Serialize};
use tracing::debug;

use super::responses::ResponseSet;
use super::taxonomy::{AssessmentType, CategoryId, Taxonomy};

/// Score for one category of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: CategoryId,
    pub label: String,
    pub raw: u32,
    /// Highest raw score attainable across the full question bank.
    pub max: u32,
    /// `raw` against `max`, 0–100.
    pub normalized: u8,
}

/// Ranked outcome of scoring a response set against a taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreProfile {
    pub assessment_type: AssessmentType,
    /// Every taxonomy category, raw score descending, taxonomy order on ties.
    pub scores: Vec<CategoryScore>,
    /// Categories sharing the top raw score, in taxonomy order.
    pub dominant: Vec<CategoryId>,
    pub answered: usize,
    pub total_questions: usize,
}

impl ScoreProfile {
    pub fn score_for(&self, category: &str) -> Option<&CategoryScore> {
        self.scores
            .iter()
            .find(|score| score.category.0 == category)
    }

    pub fn is_tied(&self) -> bool {
        self.dominant.len() > 1
    }

    pub fn dominant_labels(&self) -> Vec<&str> {
        self.dominant
            .iter()
            .filter_map(|id| self.scores.iter().find(|score| &score.category == id))
            .map(|score| score.label.as_str())
            .collect()
    }
}

/// Derive a fresh profile from `responses`. Pure: equal inputs give equal profiles.
///
/// Answers to questions outside the bank, or with symbols the taxonomy does not map,
/// contribute nothing.
pub fn score(responses: &ResponseSet, taxonomy: &Taxonomy) -> ScoreProfile {
    let categories = taxonomy.categories();
    let mut raw = vec![0u32; categories.len()];
    let mut answered = 0usize;

    for (question, option) in responses.iter() {
        if taxonomy.question(question).is_none() {
            debug!(%question, "ignoring answer outside the question bank");
            continue;
        }
        answered += 1;
        let indices = taxonomy.category_indices(option);
        if indices.is_empty() {
            debug!(%question, %option, "answer maps to no category");
        }
        for index in indices {
            raw[*index] += 1;
        }
    }

    let mut order: Vec<usize> = (0..categories.len()).collect();
    // Stable sort keeps taxonomy order among equal scores.
    order.sort_by(|left, right| raw[*right].cmp(&raw[*left]));

    let scores = order
        .iter()
        .map(|index| {
            let max = taxonomy.max_at(*index);
            CategoryScore {
                category: categories[*index].id.clone(),
                label: categories[*index].label.clone(),
                raw: raw[*index],
                max,
                normalized: normalize(raw[*index], max),
            }
        })
        .collect();

    let top = raw.iter().copied().max().unwrap_or(0);
    let dominant = categories
        .iter()
        .zip(&raw)
        .filter(|(_, score)| **score == top)
        .map(|(category, _)| category.id.clone())
        .collect();

    debug!(
        assessment_type = %taxonomy.assessment_type(),
        answered,
        top,
        "scored response set"
    );

    ScoreProfile {
        assessment_type: taxonomy.assessment_type().clone(),
        scores,
        dominant,
        answered,
        total_questions: taxonomy.question_count(),
    }
}

/// `round(raw / max * 100)`, half up, in integer arithmetic.
fn normalize(raw: u32, max: u32) -> u8 {
    if max == 0 {
        return 0;
    }
    let scaled = (u64::from(raw) * 100 + u64::from(max) / 2) / u64::from(max);
    scaled.min(100) as u8
}
