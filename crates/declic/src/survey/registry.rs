use std::collections::HashMap;

use super::domain::{Behavior, SurveyConfig, SurveyModule};

/// Session cache of loaded module definitions, one per behavior.
///
/// Modules can be inserted in whatever order their documents arrive; readers
/// that need a stable order go through [`ModuleRegistry::ordered`].
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<Behavior, SurveyModule>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `module`, returning the definition it replaced, if any.
    pub fn insert(&mut self, module: SurveyModule) -> Option<SurveyModule> {
        self.modules.insert(module.behavior, module)
    }

    pub fn get(&self, behavior: Behavior) -> Option<&SurveyModule> {
        self.modules.get(&behavior)
    }

    pub fn contains(&self, behavior: Behavior) -> bool {
        self.modules.contains_key(&behavior)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Loaded modules in the order `config` declares them. Modules the config
    /// does not list are left out.
    pub fn ordered(&self, config: &SurveyConfig) -> Vec<&SurveyModule> {
        config
            .behaviors()
            .filter_map(|behavior| self.modules.get(&behavior))
            .collect()
    }

    /// Owned copy of [`ModuleRegistry::ordered`], shaped for the aggregator.
    pub fn ordered_modules(&self, config: &SurveyConfig) -> Vec<SurveyModule> {
        self.ordered(config).into_iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.modules.clear();
    }
}
