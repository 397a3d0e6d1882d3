use super::domain::{AnswerSheet, Behavior, ModuleAnswers, QuestionType};

/// Mutable record of the user's selections, one [`ModuleAnswers`] per behavior.
///
/// Entries are created on the first recorded selection for a behavior. Option ids
/// are not checked against module definitions here; stale or unknown ids are
/// dropped later by the score calculator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerStore {
    modules: AnswerSheet,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_selection(
        &mut self,
        behavior: Behavior,
        question_id: &str,
        option_id: &str,
        question_type: QuestionType,
    ) {
        let module_answers = self
            .modules
            .entry(behavior)
            .or_insert_with(|| ModuleAnswers::new(behavior));
        let selected = module_answers
            .answers
            .entry(question_id.to_string())
            .or_default();

        match question_type {
            QuestionType::SingleChoice => {
                selected.clear();
                selected.push(option_id.to_string());
            }
            QuestionType::MultipleChoice => {
                if let Some(position) = selected.iter().position(|id| id == option_id) {
                    selected.remove(position);
                } else {
                    selected.push(option_id.to_string());
                }
            }
        }
    }

    pub fn answers(&self, behavior: Behavior) -> Option<&ModuleAnswers> {
        self.modules.get(&behavior)
    }

    pub fn selected(&self, behavior: Behavior, question_id: &str) -> &[String] {
        self.modules
            .get(&behavior)
            .map(|answers| answers.selected(question_id))
            .unwrap_or(&[])
    }

    /// Sparse behavior map consumed by the aggregator.
    pub fn all(&self) -> &AnswerSheet {
        &self.modules
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn clear(&mut self) {
        self.modules.clear();
    }
}

impl From<AnswerSheet> for AnswerStore {
    fn from(modules: AnswerSheet) -> Self {
        Self { modules }
    }
}
