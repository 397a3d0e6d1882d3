use crate::infra::{survey_source, LoggingMailTransport};
use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use declic::config::AppConfig;
use declic::error::AppError;
use declic::survey::{
    calculate_global_score, calculate_max_score, calculate_score, compute_all_results,
    format_results_for_email, score_percentage, AnswerSheet, Behavior, MailRequest, MailService,
    ModuleRegistry, ModuleResult, QuestionType, ResultsReport, SurveyConfig, SurveyModule,
    SurveySession, SurveySource, SurveySourceError,
};
use declic::telemetry;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args, Debug)]
pub(crate) struct ResultsArgs {
    /// Answer sheet JSON keyed by behavior (e.g. demos/answers.json)
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Directory holding survey-config.json and module documents
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Output format for the results
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
    /// Also print the plain-text email body
    #[arg(long)]
    pub(crate) email_body: bool,
    /// Report date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ValidateArgs {
    /// Directory holding survey-config.json and module documents
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Directory holding survey-config.json and module documents
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Topic to select (repeatable, e.g. --topic ALCOHOL). Defaults to the first two declared.
    #[arg(long = "topic", value_parser = parse_behavior)]
    pub(crate) topics: Vec<Behavior>,
    /// Send the summary to this address through the logging mail transport
    #[arg(long)]
    pub(crate) email: Option<String>,
    /// Report date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct ModuleScoreView {
    behavior: Behavior,
    score: f64,
    max_score: f64,
    percentage: f64,
}

#[derive(Debug, Serialize)]
struct ResultsOutput<'a> {
    generated_on: NaiveDate,
    global_score: f64,
    scores: Vec<ModuleScoreView>,
    results: &'a [ModuleResult],
}

pub(crate) fn parse_behavior(raw: &str) -> Result<Behavior, String> {
    let tag = raw.trim().to_ascii_uppercase().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(tag)).map_err(|_| {
        let known: Vec<&str> = Behavior::ordered().iter().map(|b| b.code()).collect();
        format!(
            "unknown topic '{raw}' (expected one of {})",
            known.join(", ")
        )
    })
}

/// Loads configuration and installs logging on stderr for one-shot commands.
fn load_app_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

pub(crate) fn run_results(args: ResultsArgs) -> Result<(), AppError> {
    let ResultsArgs {
        answers,
        data_dir,
        format,
        email_body,
        today,
    } = args;

    let config = load_app_config()?;
    let source = survey_source(&config, data_dir);
    let survey = source.load_config()?;
    let sheet = read_answer_sheet(&answers)?;
    let (registry, skipped) = load_answered_modules(&source, &survey, &sheet);
    for err in &skipped {
        eprintln!("results unavailable: {err}");
    }

    let modules = registry.ordered_modules(&survey);
    let results = compute_all_results(&modules, &sheet);
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    match format {
        OutputFormat::Text => {
            print!("{}", ResultsReport::build(&results, today).render_text());
        }
        OutputFormat::Json => {
            let output = results_output(&modules, &sheet, &results, today);
            let json = serde_json::to_string_pretty(&output)
                .map_err(|err| AppError::Input(format!("results could not be encoded: {err}")))?;
            println!("{json}");
        }
    }

    if email_body {
        println!("\n{}", format_results_for_email(&results));
    }

    Ok(())
}

fn results_output<'a>(
    modules: &[SurveyModule],
    sheet: &AnswerSheet,
    results: &'a [ModuleResult],
    generated_on: NaiveDate,
) -> ResultsOutput<'a> {
    let scores = modules
        .iter()
        .filter_map(|module| {
            sheet.get(&module.behavior).map(|answers| {
                let score = calculate_score(answers, module);
                let max_score = calculate_max_score(module);
                ModuleScoreView {
                    behavior: module.behavior,
                    score,
                    max_score,
                    percentage: score_percentage(score, max_score),
                }
            })
        })
        .collect();

    ResultsOutput {
        generated_on,
        global_score: calculate_global_score(sheet, modules),
        scores,
        results,
    }
}

pub(crate) fn run_validate(args: ValidateArgs) -> Result<(), AppError> {
    let config = load_app_config()?;
    let source = survey_source(&config, args.data_dir);
    let survey = source.load_config()?;

    println!(
        "{} ({} modules declared)",
        survey.title,
        survey.modules.len()
    );
    let mut failures = 0usize;
    for reference in &survey.modules {
        match source.load_module(&reference.file) {
            Ok(module) if module.behavior != reference.behavior => {
                failures += 1;
                println!(
                    "- {}: declared as {} but the document is {}",
                    reference.file, reference.behavior, module.behavior
                );
            }
            Ok(module) => println!(
                "- {}: {} questions, max score {}, {} result tiers",
                reference.file,
                module.questions.len(),
                calculate_max_score(&module),
                module.results.len()
            ),
            Err(err) => {
                failures += 1;
                println!("- {}: {}", reference.file, err);
            }
        }
    }

    if failures > 0 {
        return Err(AppError::Input(format!(
            "{failures} module document(s) failed validation"
        )));
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        data_dir,
        topics,
        email,
        today,
    } = args;

    let config = load_app_config()?;
    let source = survey_source(&config, data_dir);
    let survey = source.load_config()?;
    let topics = if topics.is_empty() {
        survey.behaviors().take(2).collect()
    } else {
        topics
    };

    println!(
        "{} - about {} minutes",
        survey.title, survey.estimated_duration_minutes
    );
    let mut session = SurveySession::new(survey);
    for topic in &topics {
        session.toggle_behavior(*topic);
    }
    println!(
        "Selected topics: {}",
        topics
            .iter()
            .map(|topic| topic.label())
            .collect::<Vec<_>>()
            .join(", ")
    );

    loop {
        match session.load_next_module(&source) {
            Ok(Some(module)) => println!(
                "- loaded {} ({} questions)",
                module.name,
                module.questions.len()
            ),
            Ok(None) => break,
            Err(err) => {
                println!("  Module unavailable: {}", err);
                break;
            }
        }
    }

    let loaded: Vec<Behavior> = session
        .registry()
        .ordered(session.config())
        .into_iter()
        .map(|module| module.behavior)
        .collect();
    for behavior in loaded {
        answer_module_scripted(&mut session, behavior);
        println!(
            "  {} answered | progress {}% | stage: {}",
            behavior.label(),
            session.progress_percentage(),
            session.stage().label()
        );
    }

    let results = session.compute_results();
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    println!("\n{}", ResultsReport::build(&results, today).render_text());
    println!(
        "Stage: {} | global score {}",
        session.stage().label(),
        session.global_score()
    );

    if let Some(address) = email {
        let transport = Arc::new(LoggingMailTransport::default());
        let mail = MailService::new(config.mail.clone(), transport.clone());
        let status = mail.send(
            &MailRequest {
                email: address,
                consent: true,
            },
            &results,
        );
        println!("Email: {}", status.message);
        for queued in transport.outbox() {
            println!(
                "  -> {} ({} characters)",
                queued.recipient,
                queued.message.chars().count()
            );
        }
    }

    Ok(())
}

/// Picks the middle option of single-choice questions and the first two options
/// of multiple-choice ones.
fn answer_module_scripted(session: &mut SurveySession, behavior: Behavior) {
    session.set_current_behavior(Some(behavior));
    let picks: Vec<Vec<String>> = session
        .current_module()
        .map(|module| {
            module
                .questions
                .iter()
                .map(|question| match question.question_type {
                    QuestionType::SingleChoice => question
                        .options
                        .get(question.options.len() / 2)
                        .map(|option| vec![option.id.clone()])
                        .unwrap_or_default(),
                    QuestionType::MultipleChoice => question
                        .options
                        .iter()
                        .take(2)
                        .map(|option| option.id.clone())
                        .collect(),
                })
                .collect()
        })
        .unwrap_or_default();

    for (index, options) in picks.into_iter().enumerate() {
        session.set_current_question_index(index);
        for option in options {
            session.toggle_answer(&option);
        }
    }
    session.set_current_question_index(0);
}

fn read_answer_sheet(path: &Path) -> Result<AnswerSheet, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let sheet: AnswerSheet = serde_json::from_str(&raw).map_err(|err| {
        AppError::Input(format!(
            "{} is not a valid answer sheet: {err}",
            path.display()
        ))
    })?;

    for (behavior, answers) in &sheet {
        if answers.behavior != *behavior {
            warn!(
                key = %behavior,
                entry = %answers.behavior,
                "answer entry filed under another behavior"
            );
        }
    }
    Ok(sheet)
}

/// Loads the modules the sheet has answers for. Behaviors the config does not
/// declare are skipped; documents that fail to load, or that hold another
/// behavior's module, are skipped and returned.
fn load_answered_modules<S>(
    source: &S,
    survey: &SurveyConfig,
    sheet: &AnswerSheet,
) -> (ModuleRegistry, Vec<SurveySourceError>)
where
    S: SurveySource + ?Sized,
{
    let mut registry = ModuleRegistry::new();
    let mut skipped = Vec::new();
    for behavior in sheet.keys() {
        let Some(reference) = survey.module_ref(*behavior) else {
            warn!(%behavior, "answers recorded for an undeclared module");
            continue;
        };
        let loaded = source.load_module(&reference.file).and_then(|module| {
            if module.behavior == reference.behavior {
                Ok(module)
            } else {
                Err(SurveySourceError::UnexpectedBehavior {
                    file: reference.file.clone(),
                    declared: reference.behavior,
                    found: module.behavior,
                })
            }
        });
        match loaded {
            Ok(module) => {
                registry.insert(module);
            }
            Err(err) => {
                warn!(file = %reference.file, error = %err, "module skipped");
                skipped.push(err);
            }
        }
    }
    (registry, skipped)
}
