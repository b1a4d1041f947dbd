//! Per-assessment category taxonomies and the answer-option rules that feed them.
//!
//! A [`TaxonomyDefinition`] is plain configuration; [`Taxonomy::new`] validates it once and
//! precomputes the per-category maxima the scoring engine normalizes against.

mod catalog;
mod registry;

pub use registry::{TaxonomyRegistry, TaxonomySummary};

#[cfg(test)]
pub(crate) use catalog::standard_definitions;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{ConfigurationError, InvalidOptionError};

/// Identifier of an assessment type, e.g. `riasec`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssessmentType(pub String);

/// Identifier of a scoring category within one taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub String);

/// Identifier of a question within one question bank.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub String);

/// Single-letter answer symbol. Always stored lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSymbol(pub char);

macro_rules! display_inner {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        })*
    };
}

display_inner!(AssessmentType, CategoryId, QuestionId, OptionSymbol);

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for CategoryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl OptionSymbol {
    pub fn parse(raw: &str) -> Result<Self, InvalidOptionError> {
        let trimmed = raw.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(symbol), None) if symbol.is_ascii_alphabetic() => {
                Ok(Self(symbol.to_ascii_lowercase()))
            }
            _ => Err(InvalidOptionError::Malformed {
                raw: raw.to_string(),
            }),
        }
    }
}

impl FromStr for OptionSymbol {
    type Err = InvalidOptionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

/// One dimension of a taxonomy together with its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub label: String,
}

/// Rule translating one answer symbol into the categories it increments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionRule {
    pub option: OptionSymbol,
    pub categories: Vec<CategoryId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    /// Symbols this question offers to the learner.
    pub options: Vec<OptionSymbol>,
}

/// Raw configuration for one assessment type, as shipped in the built-in catalogue or a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaxonomyDefinition {
    pub assessment_type: AssessmentType,
    pub title: String,
    pub categories: Vec<Category>,
    pub options: Vec<OptionRule>,
    pub questions: Vec<Question>,
}

/// Validated, immutable taxonomy for one assessment type.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    assessment_type: AssessmentType,
    title: String,
    categories: Vec<Category>,
    mapping: BTreeMap<OptionSymbol, Vec<usize>>,
    questions: Vec<Question>,
    question_index: HashMap<QuestionId, usize>,
    category_max: Vec<u32>,
}

impl Taxonomy {
    pub fn new(definition: TaxonomyDefinition) -> Result<Self, ConfigurationError> {
        let TaxonomyDefinition {
            assessment_type,
            title,
            categories,
            options,
            mut questions,
        } = definition;

        if categories.is_empty() {
            return Err(ConfigurationError::NoCategories { assessment_type });
        }

        let mut category_index = HashMap::with_capacity(categories.len());
        for (index, category) in categories.iter().enumerate() {
            if category_index.insert(category.id.clone(), index).is_some() {
                return Err(ConfigurationError::DuplicateCategory {
                    assessment_type,
                    category: category.id.clone(),
                });
            }
        }

        let mut mapping = BTreeMap::new();
        for rule in options {
            let option = normalize_symbol(&assessment_type, rule.option)?;
            let mut indices = Vec::with_capacity(rule.categories.len());
            for category in &rule.categories {
                let Some(index) = category_index.get(category) else {
                    return Err(ConfigurationError::OrphanCategory {
                        assessment_type,
                        option,
                        category: category.clone(),
                    });
                };
                indices.push(*index);
            }
            indices.sort_unstable();
            indices.dedup();

            if mapping.insert(option, indices).is_some() {
                return Err(ConfigurationError::DuplicateOption {
                    assessment_type,
                    option,
                });
            }
        }

        if questions.is_empty() {
            return Err(ConfigurationError::EmptyQuestionBank { assessment_type });
        }
        for question in &mut questions {
            for option in &mut question.options {
                *option = normalize_symbol(&assessment_type, *option)?;
            }
        }

        let mut question_index = HashMap::with_capacity(questions.len());
        let mut category_max = vec![0u32; categories.len()];
        for (position, question) in questions.iter().enumerate() {
            if question_index
                .insert(question.id.clone(), position)
                .is_some()
            {
                return Err(ConfigurationError::DuplicateQuestion {
                    assessment_type,
                    question: question.id.clone(),
                });
            }
            if question.options.is_empty() {
                return Err(ConfigurationError::QuestionWithoutOptions {
                    assessment_type,
                    question: question.id.clone(),
                });
            }

            let mut reachable = vec![false; categories.len()];
            for option in &question.options {
                let Some(indices) = mapping.get(option) else {
                    return Err(ConfigurationError::UnmappedOption {
                        assessment_type,
                        question: question.id.clone(),
                        option: *option,
                    });
                };
                for index in indices {
                    reachable[*index] = true;
                }
            }
            for (max, hit) in category_max.iter_mut().zip(reachable) {
                if hit {
                    *max += 1;
                }
            }
        }

        Ok(Self {
            assessment_type,
            title,
            categories,
            mapping,
            questions,
            question_index,
            category_max,
        })
    }

    pub fn assessment_type(&self) -> &AssessmentType {
        &self.assessment_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Categories in declaration order, which is also the tie-break order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.question_index
            .get(id)
            .map(|position| &self.questions[*position])
    }

    /// Answer alphabet of this taxonomy, in symbol order.
    pub fn alphabet(&self) -> impl Iterator<Item = OptionSymbol> + '_ {
        self.mapping.keys().copied()
    }

    pub fn recognizes(&self, option: OptionSymbol) -> bool {
        self.mapping.contains_key(&option)
    }

    /// Categories incremented by `option`, in taxonomy order. Empty for unknown symbols.
    pub fn categories_for(&self, option: OptionSymbol) -> Vec<&Category> {
        self.category_indices(option)
            .iter()
            .map(|index| &self.categories[*index])
            .collect()
    }

    /// Number of questions in the bank able to contribute to `category`.
    pub fn category_max(&self, category: &CategoryId) -> Option<u32> {
        self.categories
            .iter()
            .position(|candidate| &candidate.id == category)
            .map(|index| self.category_max[index])
    }

    pub(crate) fn category_indices(&self, option: OptionSymbol) -> &[usize] {
        self.mapping
            .get(&option)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn max_at(&self, index: usize) -> u32 {
        self.category_max[index]
    }

    /// Check that `option` is a legal answer to `question`.
    pub fn check_answer(
        &self,
        question: &QuestionId,
        option: OptionSymbol,
    ) -> Result<(), InvalidOptionError> {
        if !self.recognizes(option) {
            return Err(InvalidOptionError::OutsideAlphabet {
                assessment_type: self.assessment_type.clone(),
                question: question.clone(),
                option,
            });
        }

        let Some(entry) = self.question(question) else {
            return Err(InvalidOptionError::UnknownQuestion {
                assessment_type: self.assessment_type.clone(),
                question: question.clone(),
            });
        };

        if !entry.options.contains(&option) {
            return Err(InvalidOptionError::NotOffered {
                question: question.clone(),
                option,
            });
        }

        Ok(())
    }
}

/// Lowercase a configured symbol, rejecting anything that is not an ASCII letter.
fn normalize_symbol(
    assessment_type: &AssessmentType,
    option: OptionSymbol,
) -> Result<OptionSymbol, ConfigurationError> {
    if !option.0.is_ascii_alphabetic() {
        return Err(ConfigurationError::InvalidSymbol {
            assessment_type: assessment_type.clone(),
            symbol: option.0,
        });
    }
    Ok(OptionSymbol(option.0.to_ascii_lowercase()))
}

#[cfg(test)]
pub(crate) fn definition(
    assessment_type: &str,
    categories: &[&str],
    options: &[(char, &[&str])],
    questions: &[(&str, &str)],
) -> TaxonomyDefinition {
    TaxonomyDefinition {
        assessment_type: AssessmentType(assessment_type.to_string()),
        title: assessment_type.to_string(),
        categories: categories
            .iter()
            .map(|id| Category {
                id: CategoryId::from(*id),
                label: format!("{id} label"),
            })
            .collect(),
        options: options
            .iter()
            .map(|(option, categories)| OptionRule {
                option: OptionSymbol(*option),
                categories: categories.iter().map(|id| CategoryId::from(*id)).collect(),
            })
            .collect(),
        questions: questions
            .iter()
            .map(|(id, offered)| Question {
                id: QuestionId::from(*id),
                prompt: format!("prompt for {id}"),
                options: offered.chars().map(OptionSymbol).collect(),
            })
            .collect(),
    }
}
