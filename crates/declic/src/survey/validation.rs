use std::collections::HashSet;

use tracing::warn;

use super::domain::{Behavior, SurveyConfig, SurveyModule};

/// Structural defect found in a module document.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModuleValidationError {
    #[error("module id must not be empty")]
    MissingId,
    #[error("question '{question_id}' appears more than once")]
    DuplicateQuestion { question_id: String },
    #[error("option '{option_id}' appears more than once in question '{question_id}'")]
    DuplicateOption {
        question_id: String,
        option_id: String,
    },
    #[error("question '{question_id}' belongs to {found}, expected {expected}")]
    BehaviorMismatch {
        question_id: String,
        expected: Behavior,
        found: Behavior,
    },
    #[error("value of '{id}' must be a finite number")]
    NonFiniteValue { id: String },
}

/// Structural defect found in the survey config document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("{0} is listed more than once")]
    DuplicateBehavior(Behavior),
    #[error("module entry for {0} has no file")]
    MissingFile(Behavior),
}

impl SurveyModule {
    pub fn validate(&self) -> Result<(), ModuleValidationError> {
        if self.id.trim().is_empty() {
            return Err(ModuleValidationError::MissingId);
        }

        let mut question_ids = HashSet::new();
        for question in &self.questions {
            if !question_ids.insert(question.id.as_str()) {
                return Err(ModuleValidationError::DuplicateQuestion {
                    question_id: question.id.clone(),
                });
            }

            if question.associated_behavior != self.behavior {
                return Err(ModuleValidationError::BehaviorMismatch {
                    question_id: question.id.clone(),
                    expected: self.behavior,
                    found: question.associated_behavior,
                });
            }

            let mut option_ids = HashSet::new();
            for option in &question.options {
                if !option_ids.insert(option.id.as_str()) {
                    return Err(ModuleValidationError::DuplicateOption {
                        question_id: question.id.clone(),
                        option_id: option.id.clone(),
                    });
                }
                if !option.value.is_finite() {
                    return Err(ModuleValidationError::NonFiniteValue {
                        id: option.id.clone(),
                    });
                }
            }
        }

        let mut thresholds: Vec<f64> = Vec::with_capacity(self.results.len());
        for tier in &self.results {
            if !tier.value.is_finite() {
                return Err(ModuleValidationError::NonFiniteValue {
                    id: tier.id.clone(),
                });
            }
            if thresholds.contains(&tier.value) {
                warn!(
                    module = %self.id,
                    tier = %tier.id,
                    threshold = tier.value,
                    "duplicate result threshold; the first tier listed wins"
                );
            }
            thresholds.push(tier.value);
        }

        if self.results.is_empty() {
            warn!(module = %self.id, "module has no result tiers and will never produce a result");
        }

        Ok(())
    }
}

impl SurveyConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let mut seen = HashSet::new();
        for reference in &self.modules {
            if !seen.insert(reference.behavior) {
                return Err(ConfigValidationError::DuplicateBehavior(reference.behavior));
            }
            if reference.file.trim().is_empty() {
                return Err(ConfigValidationError::MissingFile(reference.behavior));
            }
        }
        Ok(())
    }
}
