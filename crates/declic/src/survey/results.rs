use std::collections::HashSet;

use tracing::debug;

use super::domain::{AnswerSheet, ModuleResult, ResultTier, SurveyModule};
use super::scoring::calculate_score;

/// Picks the tier whose threshold is the smallest one at or above `score`.
///
/// Tiers may arrive in any order. Scores above every threshold land in the
/// highest tier; an empty table yields `None`. Equal thresholds keep the tier
/// listed first.
pub fn resolve_result(score: f64, tiers: &[ResultTier]) -> Option<&ResultTier> {
    let mut sorted: Vec<&ResultTier> = tiers.iter().collect();
    sorted.sort_by(|a, b| a.value.total_cmp(&b.value));

    sorted
        .iter()
        .find(|tier| score <= tier.value)
        .or_else(|| sorted.last())
        .copied()
}

/// Builds one [`ModuleResult`] per module that has an answer entry, in the order
/// `modules` is given.
///
/// Modules without tiers are left out, as is any repeat of a behavior already
/// emitted.
pub fn compute_all_results(
    modules: &[SurveyModule],
    all_answers: &AnswerSheet,
) -> Vec<ModuleResult> {
    let mut emitted = HashSet::new();
    let mut results = Vec::new();

    for module in modules {
        let Some(answers) = all_answers.get(&module.behavior) else {
            continue;
        };
        if !emitted.insert(module.behavior) {
            continue;
        }

        let score = calculate_score(answers, module);
        match resolve_result(score, &module.results) {
            Some(tier) => results.push(ModuleResult {
                behavior: module.behavior,
                module_name: module.name.clone(),
                icon: module.icon.clone(),
                result: tier.clone(),
            }),
            None => debug!(module = %module.id, score, "no result tiers; module omitted"),
        }
    }

    results
}
