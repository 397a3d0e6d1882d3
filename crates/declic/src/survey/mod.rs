//! Survey domain: module documents, answer tracking, scoring, and tiered results.
//!
//! Scoring, tier resolution, and aggregation are pure functions over already
//! loaded documents. Retrieval, mail delivery, and report layout sit behind the
//! [`SurveySource`] and [`MailTransport`] boundaries.

pub mod answers;
pub mod domain;
pub mod mail;
pub mod registry;
pub mod report;
pub mod results;
pub mod router;
pub mod scoring;
pub mod session;
pub mod source;
mod validation;

#[cfg(test)]
mod tests;

pub use answers::AnswerStore;
pub use domain::{
    AnswerOption, AnswerSheet, Behavior, ModuleAnswers, ModuleReference, ModuleResult, Question,
    QuestionType, ResultTier, SurveyConfig, SurveyModule,
};
pub use mail::{
    format_results_for_email, MailError, MailRequest, MailService, MailStatus, MailTransport,
    OutboundMail,
};
pub use registry::ModuleRegistry;
pub use report::{ReportSection, ResultsReport};
pub use results::{compute_all_results, resolve_result};
pub use router::survey_data_router;
pub use scoring::{calculate_global_score, calculate_max_score, calculate_score, score_percentage};
pub use session::{ModuleProgress, ModuleStatus, SurveySession, SurveyStage};
pub use source::{FileSurveySource, SurveySource, SurveySourceError, CONFIG_DOCUMENT};
pub use validation::{ConfigValidationError, ModuleValidationError};
