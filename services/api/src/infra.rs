use chrono::NaiveDate;
use declic::config::AppConfig;
use declic::survey::{FileSurveySource, MailError, MailTransport, OutboundMail};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Mail transport that records messages and logs them instead of calling the provider.
#[derive(Default, Clone)]
pub(crate) struct LoggingMailTransport {
    outbox: Arc<Mutex<Vec<OutboundMail>>>,
}

impl MailTransport for LoggingMailTransport {
    fn send(&self, mail: &OutboundMail) -> Result<(), MailError> {
        let mut guard = self
            .outbox
            .lock()
            .map_err(|_| MailError::Transport("outbox mutex poisoned".to_string()))?;
        info!(
            template = %mail.template_id,
            bytes = mail.message.len(),
            "results email queued"
        );
        guard.push(mail.clone());
        Ok(())
    }
}

impl LoggingMailTransport {
    pub(crate) fn outbox(&self) -> Vec<OutboundMail> {
        self.outbox
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

/// Data directory from the flag when given, otherwise from configuration.
pub(crate) fn survey_source(config: &AppConfig, data_dir: Option<PathBuf>) -> FileSurveySource {
    FileSurveySource::new(data_dir.unwrap_or_else(|| config.data.dir.clone()))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
