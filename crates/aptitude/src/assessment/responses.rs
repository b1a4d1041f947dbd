use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::InvalidOptionError;
use super::taxonomy::{OptionSymbol, QuestionId, Taxonomy};

/// One selected option per question. Cloning yields an independent snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseSet {
    answers: BTreeMap<QuestionId, OptionSymbol>,
}

impl ResponseSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn get(&self, question: &QuestionId) -> Option<OptionSymbol> {
        self.answers.get(question).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, OptionSymbol)> {
        self.answers.iter().map(|(question, option)| (question, *option))
    }

    fn insert(&mut self, question: QuestionId, option: OptionSymbol) -> Option<OptionSymbol> {
        self.answers.insert(question, option)
    }
}

impl FromIterator<(QuestionId, OptionSymbol)> for ResponseSet {
    fn from_iter<T: IntoIterator<Item = (QuestionId, OptionSymbol)>>(iter: T) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}

/// Progress indicator payload: `value` out of `max` (always 100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressView {
    pub answered: usize,
    pub total: usize,
    pub value: u8,
    pub max: u8,
}

/// Accumulates a learner's answers against one taxonomy.
#[derive(Debug, Clone)]
pub struct ResponseCollector {
    taxonomy: Arc<Taxonomy>,
    responses: ResponseSet,
}

impl ResponseCollector {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self {
            taxonomy,
            responses: ResponseSet::new(),
        }
    }

    pub fn taxonomy(&self) -> &Arc<Taxonomy> {
        &self.taxonomy
    }

    /// Store or revise the answer to `question`, returning the answer it replaced.
    pub fn record(
        &mut self,
        question: QuestionId,
        option: OptionSymbol,
    ) -> Result<Option<OptionSymbol>, InvalidOptionError> {
        if let Err(err) = self.taxonomy.check_answer(&question, option) {
            warn!(
                assessment_type = %self.taxonomy.assessment_type(),
                %question,
                %option,
                "rejected answer"
            );
            return Err(err);
        }

        let previous = self.responses.insert(question.clone(), option);
        debug!(
            %question,
            %option,
            revised = previous.is_some(),
            answered = self.responses.len(),
            "recorded answer"
        );
        Ok(previous)
    }

    pub fn answered(&self) -> usize {
        self.responses.len()
    }

    /// Answered share of the full question bank, in `[0, 1]`.
    pub fn completion_ratio(&self) -> f64 {
        let total = self.taxonomy.question_count();
        if total == 0 {
            return 0.0;
        }
        (self.responses.len() as f64 / total as f64).min(1.0)
    }

    pub fn progress(&self) -> ProgressView {
        ProgressView {
            answered: self.responses.len(),
            total: self.taxonomy.question_count(),
            value: (self.completion_ratio() * 100.0).round() as u8,
            max: 100,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.responses.len() == self.taxonomy.question_count()
    }

    pub fn snapshot(&self) -> ResponseSet {
        self.responses.clone()
    }
}
