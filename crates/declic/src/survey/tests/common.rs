use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::config::MailSettings;
use crate::survey::domain::{
    AnswerOption, AnswerSheet, Behavior, ModuleAnswers, ModuleReference, Question, QuestionType,
    ResultTier, SurveyConfig, SurveyModule,
};
use crate::survey::mail::{MailError, MailService, MailTransport, OutboundMail};
use crate::survey::source::{SurveySource, SurveySourceError, CONFIG_DOCUMENT};

pub(super) fn option(id: &str, value: f64) -> AnswerOption {
    AnswerOption {
        id: id.to_string(),
        text: format!("Option {id}"),
        value,
    }
}

pub(super) fn question(
    id: &str,
    question_type: QuestionType,
    behavior: Behavior,
    options: Vec<AnswerOption>,
) -> Question {
    Question {
        id: id.to_string(),
        question_type,
        text: format!("Question {id}"),
        subtitle: None,
        options,
        associated_behavior: behavior,
    }
}

pub(super) fn tier(id: &str, value: f64) -> ResultTier {
    ResultTier {
        id: id.to_string(),
        text: format!("{id} risk message"),
        value,
    }
}

pub(super) fn standard_tiers() -> Vec<ResultTier> {
    vec![tier("low", 8.0), tier("mid", 12.0), tier("high", 18.0)]
}

/// q1 single choice (a1=10, a2=5, a3=0), q2 multiple choice (b1=20, b2=-5).
pub(super) fn alcohol_module() -> SurveyModule {
    SurveyModule {
        id: "module-alcohol".to_string(),
        name: "Alcohol".to_string(),
        behavior: Behavior::Alcohol,
        icon: "lucide:wine".to_string(),
        questions: vec![
            question(
                "q1",
                QuestionType::SingleChoice,
                Behavior::Alcohol,
                vec![option("a1", 10.0), option("a2", 5.0), option("a3", 0.0)],
            ),
            question(
                "q2",
                QuestionType::MultipleChoice,
                Behavior::Alcohol,
                vec![option("b1", 20.0), option("b2", -5.0)],
            ),
        ],
        results: standard_tiers(),
    }
}

/// Three single-choice questions, each worth 0, 2, or 6.
pub(super) fn tobacco_module() -> SurveyModule {
    let questions = ["q1", "q2", "q3"]
        .into_iter()
        .map(|id| {
            question(
                id,
                QuestionType::SingleChoice,
                Behavior::Tobacco,
                vec![
                    option(&format!("{id}-none"), 0.0),
                    option(&format!("{id}-some"), 2.0),
                    option(&format!("{id}-daily"), 6.0),
                ],
            )
        })
        .collect();

    SurveyModule {
        id: "module-tobacco".to_string(),
        name: "Tobacco".to_string(),
        behavior: Behavior::Tobacco,
        icon: "lucide:cigarette".to_string(),
        questions,
        results: vec![tier("low", 4.0), tier("high", 18.0)],
    }
}

pub(super) fn gambling_module() -> SurveyModule {
    SurveyModule {
        id: "module-gambling".to_string(),
        name: "Gambling".to_string(),
        behavior: Behavior::Gambling,
        icon: "lucide:dice-5".to_string(),
        questions: vec![question(
            "q1",
            QuestionType::SingleChoice,
            Behavior::Gambling,
            vec![option("g1", 1.0), option("g2", 9.0)],
        )],
        results: Vec::new(),
    }
}

pub(super) fn reference(behavior: Behavior, name: &str, file: &str, icon: &str) -> ModuleReference {
    ModuleReference {
        behavior,
        name: name.to_string(),
        file: file.to_string(),
        icon: icon.to_string(),
    }
}

pub(super) fn survey_config() -> SurveyConfig {
    SurveyConfig {
        id: "declic".to_string(),
        title: "Declic".to_string(),
        description: "Anonymous addiction screening".to_string(),
        estimated_duration_minutes: 5,
        modules: vec![
            reference(Behavior::Alcohol, "Alcohol", "alcohol.json", "lucide:wine"),
            reference(
                Behavior::Tobacco,
                "Tobacco",
                "tobacco.json",
                "lucide:cigarette",
            ),
            reference(
                Behavior::Gambling,
                "Gambling",
                "gambling.json",
                "lucide:dice-5",
            ),
        ],
    }
}

pub(super) fn module_answers(behavior: Behavior, entries: Vec<(&str, Vec<&str>)>) -> ModuleAnswers {
    let answers = entries
        .into_iter()
        .map(|(question_id, options)| {
            (
                question_id.to_string(),
                options.into_iter().map(str::to_string).collect(),
            )
        })
        .collect::<BTreeMap<_, _>>();
    ModuleAnswers { behavior, answers }
}

pub(super) fn sheet(entries: Vec<ModuleAnswers>) -> AnswerSheet {
    entries
        .into_iter()
        .map(|answers| (answers.behavior, answers))
        .collect()
}

/// Serves documents from memory; `fail` names files that simulate a transport error.
#[derive(Default)]
pub(super) struct MemorySource {
    documents: HashMap<String, Vec<u8>>,
    fail: Vec<String>,
}

impl MemorySource {
    pub(super) fn standard() -> Self {
        let mut source = Self::default();
        source.put(CONFIG_DOCUMENT, &survey_config());
        source.put("alcohol.json", &alcohol_module());
        source.put("tobacco.json", &tobacco_module());
        source.put("gambling.json", &gambling_module());
        source
    }

    pub(super) fn put<T: serde::Serialize>(&mut self, file: &str, document: &T) {
        let bytes = serde_json::to_vec(document).expect("fixture serializes");
        self.documents.insert(file.to_string(), bytes);
    }

    pub(super) fn put_raw(&mut self, file: &str, raw: &str) {
        self.documents.insert(file.to_string(), raw.as_bytes().to_vec());
    }

    pub(super) fn failing(mut self, file: &str) -> Self {
        self.fail.push(file.to_string());
        self
    }
}

impl SurveySource for MemorySource {
    fn document(&self, file: &str) -> Result<Vec<u8>, SurveySourceError> {
        if self.fail.iter().any(|name| name == file) {
            return Err(SurveySourceError::Io {
                file: file.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::TimedOut, "fetch timed out"),
            });
        }
        self.documents
            .get(file)
            .cloned()
            .ok_or_else(|| SurveySourceError::NotFound(file.to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryTransport {
    sent: Mutex<Vec<OutboundMail>>,
}

impl MemoryTransport {
    pub(super) fn sent(&self) -> Vec<OutboundMail> {
        self.sent.lock().expect("transport mutex poisoned").clone()
    }
}

impl MailTransport for MemoryTransport {
    fn send(&self, mail: &OutboundMail) -> Result<(), MailError> {
        self.sent
            .lock()
            .expect("transport mutex poisoned")
            .push(mail.clone());
        Ok(())
    }
}

pub(super) struct DownTransport;

impl MailTransport for DownTransport {
    fn send(&self, _mail: &OutboundMail) -> Result<(), MailError> {
        Err(MailError::Transport("provider returned 503".to_string()))
    }
}

pub(super) fn mail_settings() -> MailSettings {
    MailSettings {
        service_id: "service_declic".to_string(),
        template_id: "template_results".to_string(),
        public_key: "pk_test".to_string(),
    }
}

pub(super) fn mail_service<T: MailTransport + 'static>(transport: Arc<T>) -> MailService<T> {
    MailService::new(mail_settings(), transport)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected, "unexpected status");
}
