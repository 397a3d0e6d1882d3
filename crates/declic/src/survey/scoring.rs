use std::collections::HashMap;

use super::domain::{AnswerSheet, ModuleAnswers, SurveyModule};

/// Sums the values of every selected option that still exists in `module`.
///
/// Unknown question ids and unknown option ids contribute nothing. Lists are
/// summed as given, so a malformed multi-id list on a single-choice question
/// counts every id it holds.
pub fn calculate_score(answers: &ModuleAnswers, module: &SurveyModule) -> f64 {
    answers
        .answers
        .iter()
        .filter_map(|(question_id, selected)| {
            module.question(question_id).map(|question| {
                selected
                    .iter()
                    .filter_map(|option_id| question.option(option_id))
                    .map(|option| option.value)
                    .sum::<f64>()
            })
        })
        .sum()
}

/// Highest reachable score: the best option of every question, summed.
pub fn calculate_max_score(module: &SurveyModule) -> f64 {
    module
        .questions
        .iter()
        .map(|question| {
            question
                .options
                .iter()
                .map(|option| option.value)
                .fold(None, |best: Option<f64>, value| {
                    Some(best.map_or(value, |current| current.max(value)))
                })
                .unwrap_or(0.0)
        })
        .sum()
}

/// Score as a share of `max_score`, clamped to 0..=100. Display only.
pub fn score_percentage(score: f64, max_score: f64) -> f64 {
    if max_score <= 0.0 {
        return 0.0;
    }
    (score / max_score * 100.0).clamp(0.0, 100.0)
}

/// Sum of module scores for every behavior present in both `all_answers` and
/// `modules`. Answers for modules that were never loaded are ignored.
pub fn calculate_global_score(all_answers: &AnswerSheet, modules: &[SurveyModule]) -> f64 {
    let by_behavior: HashMap<_, &SurveyModule> = modules
        .iter()
        .map(|module| (module.behavior, module))
        .collect();

    all_answers
        .iter()
        .filter_map(|(behavior, answers)| {
            by_behavior
                .get(behavior)
                .map(|module| calculate_score(answers, module))
        })
        .sum()
}
