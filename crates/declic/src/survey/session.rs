use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{info, warn};

use super::answers::AnswerStore;
use super::domain::{
    AnswerSheet, Behavior, ModuleReference, ModuleResult, Question, SurveyConfig, SurveyModule,
};
use super::registry::ModuleRegistry;
use super::results::compute_all_results;
use super::scoring::calculate_global_score;
use super::source::{SurveySource, SurveySourceError};

/// Where a session stands in the survey flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SurveyStage {
    SelectingTopics,
    Answering,
    AllSelectedTopicsComplete,
    ResultsComputed,
}

impl SurveyStage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SelectingTopics => "Selecting topics",
            Self::Answering => "Answering",
            Self::AllSelectedTopicsComplete => "All selected topics complete",
            Self::ResultsComputed => "Results computed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    Completed,
    InProgress,
    Pending,
}

/// Progress line for one selected module, in config order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleProgress {
    pub behavior: Behavior,
    pub name: String,
    pub icon: String,
    pub status: ModuleStatus,
}

/// One user's in-memory run through the survey.
///
/// Mutated only from direct interaction handlers. Results are derived on demand
/// and never stored; the session only remembers the answers they were computed
/// from so [`SurveySession::stage`] can report `ResultsComputed`.
#[derive(Debug, Clone)]
pub struct SurveySession {
    config: SurveyConfig,
    selected: BTreeSet<Behavior>,
    registry: ModuleRegistry,
    current_behavior: Option<Behavior>,
    current_question_index: usize,
    answers: AnswerStore,
    computed_from: Option<AnswerSheet>,
    error: Option<String>,
}

impl SurveySession {
    pub fn new(config: SurveyConfig) -> Self {
        Self {
            config,
            selected: BTreeSet::new(),
            registry: ModuleRegistry::new(),
            current_behavior: None,
            current_question_index: 0,
            answers: AnswerStore::new(),
            computed_from: None,
            error: None,
        }
    }

    pub fn config(&self) -> &SurveyConfig {
        &self.config
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    /// Last user-visible failure, e.g. a module document that could not be fetched.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn toggle_behavior(&mut self, behavior: Behavior) {
        if !self.selected.remove(&behavior) {
            self.selected.insert(behavior);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, behavior: Behavior) -> bool {
        self.selected.contains(&behavior)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    /// First selected module, in config order, that has not been loaded yet.
    pub fn next_module_to_load(&self) -> Option<&ModuleReference> {
        self.config.modules.iter().find(|reference| {
            self.selected.contains(&reference.behavior)
                && !self.registry.contains(reference.behavior)
        })
    }

    /// Fetches the next pending module. `Ok(None)` once every selected module is loaded.
    ///
    /// A failed fetch is kept as the session's error message; answers and already
    /// loaded modules are left as they were.
    pub fn load_next_module<S>(
        &mut self,
        source: &S,
    ) -> Result<Option<&SurveyModule>, SurveySourceError>
    where
        S: SurveySource + ?Sized,
    {
        let Some(reference) = self.next_module_to_load().cloned() else {
            return Ok(None);
        };

        match source.load_module(&reference.file) {
            Ok(module) if module.behavior != reference.behavior => {
                let err = SurveySourceError::UnexpectedBehavior {
                    file: reference.file.clone(),
                    declared: reference.behavior,
                    found: module.behavior,
                };
                warn!(error = %err, "module document rejected");
                self.error = Some(err.to_string());
                Err(err)
            }
            Ok(module) => {
                self.error = None;
                let behavior = module.behavior;
                self.registry.insert(module);
                info!(%behavior, loaded = self.registry.len(), "survey module ready");
                Ok(self.registry.get(behavior))
            }
            Err(err) => {
                warn!(file = %reference.file, error = %err, "failed to load survey module");
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Registers a module fetched elsewhere; completion order does not matter.
    pub fn register_module(&mut self, module: SurveyModule) {
        self.registry.insert(module);
    }

    pub fn set_current_behavior(&mut self, behavior: Option<Behavior>) {
        self.current_behavior = behavior;
    }

    pub fn set_current_question_index(&mut self, index: usize) {
        self.current_question_index = index;
    }

    pub fn current_behavior(&self) -> Option<Behavior> {
        self.current_behavior
    }

    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub fn current_module(&self) -> Option<&SurveyModule> {
        self.current_behavior
            .and_then(|behavior| self.registry.get(behavior))
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_module()
            .and_then(|module| module.questions.get(self.current_question_index))
    }

    pub fn current_answers(&self) -> &[String] {
        match (self.current_behavior, self.current_question()) {
            (Some(behavior), Some(question)) => self.answers.selected(behavior, &question.id),
            _ => &[],
        }
    }

    pub fn can_proceed(&self) -> bool {
        !self.current_answers().is_empty()
    }

    /// Records `option_id` against the current question. No-op without one.
    pub fn toggle_answer(&mut self, option_id: &str) {
        let Some(behavior) = self.current_behavior else {
            return;
        };
        let Some((question_id, question_type)) = self
            .current_question()
            .map(|question| (question.id.clone(), question.question_type))
        else {
            return;
        };

        self.answers
            .record_selection(behavior, &question_id, option_id, question_type);
    }

    /// Every question of the loaded module has at least one selection.
    pub fn is_module_completed(&self, behavior: Behavior) -> bool {
        let (Some(module), Some(answers)) =
            (self.registry.get(behavior), self.answers.answers(behavior))
        else {
            return false;
        };

        module
            .questions
            .iter()
            .all(|question| answers.is_answered(&question.id))
    }

    pub fn completed_modules_count(&self) -> usize {
        self.selected
            .iter()
            .filter(|behavior| self.is_module_completed(**behavior))
            .count()
    }

    /// Overall progress in percent; each selected module weighs the same.
    pub fn progress_percentage(&self) -> u8 {
        if self.selected.is_empty() {
            return 0;
        }

        let module_weight = 100.0 / self.selected.len() as f64;
        let mut progress = 0.0;

        for behavior in &self.selected {
            let (Some(module), Some(answers)) =
                (self.registry.get(*behavior), self.answers.answers(*behavior))
            else {
                continue;
            };
            if module.questions.is_empty() {
                continue;
            }

            let answered = module
                .questions
                .iter()
                .filter(|question| answers.is_answered(&question.id))
                .count();
            progress += answered as f64 / module.questions.len() as f64 * module_weight;
        }

        progress.round().clamp(0.0, 100.0) as u8
    }

    pub fn modules_progress(&self) -> Vec<ModuleProgress> {
        self.config
            .modules
            .iter()
            .filter(|reference| self.selected.contains(&reference.behavior))
            .map(|reference| {
                let status = if self.is_module_completed(reference.behavior) {
                    ModuleStatus::Completed
                } else if self.current_behavior == Some(reference.behavior) {
                    ModuleStatus::InProgress
                } else {
                    ModuleStatus::Pending
                };

                ModuleProgress {
                    behavior: reference.behavior,
                    name: reference.name.clone(),
                    icon: reference.icon.clone(),
                    status,
                }
            })
            .collect()
    }

    pub fn stage(&self) -> SurveyStage {
        if self.selected.is_empty() || self.registry.is_empty() {
            return SurveyStage::SelectingTopics;
        }

        let all_complete = self
            .selected
            .iter()
            .all(|behavior| self.is_module_completed(*behavior));
        if !all_complete {
            return SurveyStage::Answering;
        }

        match &self.computed_from {
            Some(snapshot) if snapshot == self.answers.all() => SurveyStage::ResultsComputed,
            _ => SurveyStage::AllSelectedTopicsComplete,
        }
    }

    /// Results for every module with recorded answers, in config order.
    pub fn compute_results(&mut self) -> Vec<ModuleResult> {
        let modules = self.registry.ordered_modules(&self.config);
        let results = compute_all_results(&modules, self.answers.all());
        self.computed_from = Some(self.answers.all().clone());
        results
    }

    pub fn global_score(&self) -> f64 {
        let modules = self.registry.ordered_modules(&self.config);
        calculate_global_score(self.answers.all(), &modules)
    }

    /// Drops answers and loaded modules; the topic selection is kept.
    pub fn reset_quiz(&mut self) {
        self.answers.clear();
        self.registry.clear();
        self.current_behavior = None;
        self.current_question_index = 0;
        self.computed_from = None;
        self.error = None;
    }
}
