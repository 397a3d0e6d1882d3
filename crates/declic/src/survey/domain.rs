use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Addictive-behavior topics a user can select for self-assessment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Behavior {
    Alcohol,
    Tobacco,
    Cannabis,
    Medication,
    PartyDrugs,
    SocialMedia,
    VideoGames,
    Gambling,
    Pornography,
    Snacking,
    Overwork,
}

impl Behavior {
    pub const fn ordered() -> [Self; 11] {
        [
            Self::Alcohol,
            Self::Tobacco,
            Self::Cannabis,
            Self::Medication,
            Self::PartyDrugs,
            Self::SocialMedia,
            Self::VideoGames,
            Self::Gambling,
            Self::Pornography,
            Self::Snacking,
            Self::Overwork,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Alcohol => "Alcohol",
            Self::Tobacco => "Tobacco",
            Self::Cannabis => "Cannabis",
            Self::Medication => "Medication",
            Self::PartyDrugs => "Party drugs",
            Self::SocialMedia => "Social media",
            Self::VideoGames => "Video games",
            Self::Gambling => "Gambling",
            Self::Pornography => "Pornography",
            Self::Snacking => "Snacking",
            Self::Overwork => "Overwork",
        }
    }

    /// Wire tag, as it appears in survey documents.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Alcohol => "ALCOHOL",
            Self::Tobacco => "TOBACCO",
            Self::Cannabis => "CANNABIS",
            Self::Medication => "MEDICATION",
            Self::PartyDrugs => "PARTY_DRUGS",
            Self::SocialMedia => "SOCIAL_MEDIA",
            Self::VideoGames => "VIDEO_GAMES",
            Self::Gambling => "GAMBLING",
            Self::Pornography => "PORNOGRAPHY",
            Self::Snacking => "SNACKING",
            Self::Overwork => "OVERWORK",
        }
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
}

/// One selectable answer; `value` is added to the module score when selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: String,
    pub text: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub options: Vec<AnswerOption>,
    pub associated_behavior: Behavior,
}

impl Question {
    pub fn option(&self, option_id: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|option| option.id == option_id)
    }
}

/// Result message shown for scores up to and including `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTier {
    pub id: String,
    pub text: String,
    pub value: f64,
}

/// Complete question set and tier table for one behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyModule {
    pub id: String,
    pub name: String,
    pub behavior: Behavior,
    pub icon: String,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub results: Vec<ResultTier>,
}

impl SurveyModule {
    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions
            .iter()
            .find(|question| question.id == question_id)
    }
}

/// Entry of the survey config pointing at a module document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleReference {
    pub behavior: Behavior,
    pub name: String,
    pub file: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyConfig {
    pub id: String,
    pub title: String,
    pub description: String,
    pub estimated_duration_minutes: u32,
    pub modules: Vec<ModuleReference>,
}

impl SurveyConfig {
    pub fn module_ref(&self, behavior: Behavior) -> Option<&ModuleReference> {
        self.modules
            .iter()
            .find(|reference| reference.behavior == behavior)
    }

    /// Behaviors in declared order.
    pub fn behaviors(&self) -> impl Iterator<Item = Behavior> + '_ {
        self.modules.iter().map(|reference| reference.behavior)
    }
}

/// Selected option ids per question for one behavior. A missing question key
/// means the question has not been answered yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleAnswers {
    pub behavior: Behavior,
    #[serde(default)]
    pub answers: BTreeMap<String, Vec<String>>,
}

impl ModuleAnswers {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            answers: BTreeMap::new(),
        }
    }

    pub fn selected(&self, question_id: &str) -> &[String] {
        self.answers
            .get(question_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_answered(&self, question_id: &str) -> bool {
        !self.selected(question_id).is_empty()
    }
}

/// Sparse answer map keyed by behavior; key presence is what marks a module as started.
pub type AnswerSheet = BTreeMap<Behavior, ModuleAnswers>;

/// Resolved tier for one answered module, ready for mail or report rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleResult {
    pub behavior: Behavior,
    pub module_name: String,
    pub icon: String,
    pub result: ResultTier,
}
