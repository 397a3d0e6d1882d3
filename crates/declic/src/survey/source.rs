use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::domain::{Behavior, SurveyConfig, SurveyModule};
use super::validation::{ConfigValidationError, ModuleValidationError};

/// File name of the survey config document inside the data directory.
pub const CONFIG_DOCUMENT: &str = "survey-config.json";

/// Retrieval boundary for survey documents.
///
/// Implementors only hand out raw bytes; parsing and validation are shared by
/// the provided methods so every source rejects the same malformed documents.
pub trait SurveySource: Send + Sync {
    fn document(&self, file: &str) -> Result<Vec<u8>, SurveySourceError>;

    fn load_config(&self) -> Result<SurveyConfig, SurveySourceError> {
        let bytes = self.document(CONFIG_DOCUMENT)?;
        let config: SurveyConfig =
            serde_json::from_slice(&bytes).map_err(|source| SurveySourceError::Json {
                file: CONFIG_DOCUMENT.to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    fn load_module(&self, file: &str) -> Result<SurveyModule, SurveySourceError> {
        let bytes = self.document(file)?;
        let module: SurveyModule =
            serde_json::from_slice(&bytes).map_err(|source| SurveySourceError::Json {
                file: file.to_string(),
                source,
            })?;
        module.validate()?;
        debug!(file, module = %module.id, questions = module.questions.len(), "module loaded");
        Ok(module)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SurveySourceError {
    #[error("survey document '{0}' not found")]
    NotFound(String),
    #[error("document name '{0}' is not allowed")]
    InvalidName(String),
    #[error("failed to read '{file}': {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in '{file}': {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid module document: {0}")]
    InvalidModule(#[from] ModuleValidationError),
    #[error("invalid survey config: {0}")]
    InvalidConfig(#[from] ConfigValidationError),
    #[error("'{file}' holds the {found} module but the config lists it as {declared}")]
    UnexpectedBehavior {
        file: String,
        declared: Behavior,
        found: Behavior,
    },
}

/// Reads documents from a flat data directory.
#[derive(Debug, Clone)]
pub struct FileSurveySource {
    root: PathBuf,
}

impl FileSurveySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, file: &str) -> Result<PathBuf, SurveySourceError> {
        let name = file.trim();
        let escapes = name.is_empty()
            || name.starts_with('.')
            || name.contains(['/', '\\'])
            || name.contains("..");
        if escapes {
            return Err(SurveySourceError::InvalidName(file.to_string()));
        }
        Ok(self.root.join(name))
    }
}

impl SurveySource for FileSurveySource {
    fn document(&self, file: &str) -> Result<Vec<u8>, SurveySourceError> {
        let path = self.resolve(file)?;
        std::fs::read(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => SurveySourceError::NotFound(file.to_string()),
            _ => SurveySourceError::Io {
                file: file.to_string(),
                source,
            },
        })
    }
}
