use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::domain::ModuleResult;
use crate::config::MailSettings;

const GREETING: &str = "Hello,\n\nHere is a summary of your results:\n\n";
const DISCLAIMER: &str = "This questionnaire is an information tool, not a diagnosis.\n\
If you have any questions, feel free to talk to a health professional.";

pub const SENT_MESSAGE: &str = "Email sent successfully!";
pub const FAILED_MESSAGE: &str = "Sending failed. Please try again.";

/// Plain-text body listing each module name with its tier text, then the disclaimer.
pub fn format_results_for_email(results: &[ModuleResult]) -> String {
    let mut message = String::from(GREETING);

    for result in results {
        message.push_str(&format!("📋 {}\n", result.module_name));
        message.push_str(&format!("{}\n\n", result.result.text));
    }

    message.push_str(DISCLAIMER);
    message
}

fn acknowledgement(recipient: &str) -> String {
    format!("Hello! We have received your request at {recipient}.")
}

/// Contact details captured by the results page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailRequest {
    pub email: String,
    #[serde(default)]
    pub consent: bool,
}

/// Payload handed to the transactional-email provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMail {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    pub recipient: String,
    pub message: String,
}

/// Delivery boundary for the third-party email client.
pub trait MailTransport: Send + Sync {
    fn send(&self, mail: &OutboundMail) -> Result<(), MailError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("a recipient address is required")]
    MissingRecipient,
    #[error("consent is required before sending results")]
    MissingConsent,
    #[error("mail transport unavailable: {0}")]
    Transport(String),
}

/// User-visible outcome of a send attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailStatus {
    pub sent: bool,
    pub message: String,
}

impl MailStatus {
    fn sent() -> Self {
        Self {
            sent: true,
            message: SENT_MESSAGE.to_string(),
        }
    }

    fn failed() -> Self {
        Self {
            sent: false,
            message: FAILED_MESSAGE.to_string(),
        }
    }

    fn rejected(reason: MailError) -> Self {
        Self {
            sent: false,
            message: reason.to_string(),
        }
    }
}

/// Formats result summaries and hands them to a [`MailTransport`].
pub struct MailService<T> {
    settings: MailSettings,
    transport: Arc<T>,
}

impl<T> MailService<T>
where
    T: MailTransport + 'static,
{
    pub fn new(settings: MailSettings, transport: Arc<T>) -> Self {
        Self {
            settings,
            transport,
        }
    }

    /// Attempts delivery and reports the outcome as a status line. Transport
    /// failures are logged and never propagate.
    pub fn send(&self, request: &MailRequest, results: &[ModuleResult]) -> MailStatus {
        let recipient = request.email.trim();
        if recipient.is_empty() {
            return MailStatus::rejected(MailError::MissingRecipient);
        }
        if !request.consent {
            return MailStatus::rejected(MailError::MissingConsent);
        }

        let message = if results.is_empty() {
            acknowledgement(recipient)
        } else {
            format_results_for_email(results)
        };

        let mail = OutboundMail {
            service_id: self.settings.service_id.clone(),
            template_id: self.settings.template_id.clone(),
            public_key: self.settings.public_key.clone(),
            recipient: recipient.to_string(),
            message,
        };

        match self.transport.send(&mail) {
            Ok(()) => {
                info!(results = results.len(), "results email dispatched");
                MailStatus::sent()
            }
            Err(err) => {
                error!(error = %err, "results email failed");
                MailStatus::failed()
            }
        }
    }
}
