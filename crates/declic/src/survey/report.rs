use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{Behavior, ModuleResult};

const TITLE: &str = "Declic";
const SUBTITLE: &str = "Your personal summary";
const HEADING: &str = "Results by module";
const SECTION_NOTE: &str = "Score calculated from your answers.";
const TAGLINE: &str = "Declic - Take care of yourself";

/// One visual block of the printable report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSection {
    pub behavior: Behavior,
    pub module_name: String,
    pub icon: String,
    pub result_id: String,
    pub result_text: String,
    pub note: &'static str,
}

/// Layout-neutral content of the results document a PDF renderer consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsReport {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub heading: &'static str,
    pub generated_on: NaiveDate,
    pub sections: Vec<ReportSection>,
    pub footer: String,
    pub tagline: &'static str,
}

impl ResultsReport {
    pub fn build(results: &[ModuleResult], generated_on: NaiveDate) -> Self {
        let sections = results
            .iter()
            .map(|result| ReportSection {
                behavior: result.behavior,
                module_name: result.module_name.clone(),
                icon: result.icon.clone(),
                result_id: result.result.id.clone(),
                result_text: result.result.text.clone(),
                note: SECTION_NOTE,
            })
            .collect();

        Self {
            title: TITLE,
            subtitle: SUBTITLE,
            heading: HEADING,
            generated_on,
            sections,
            footer: format!("Document generated on {}", generated_on.format("%-d %B %Y")),
            tagline: TAGLINE,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn render_text(&self) -> String {
        let mut out = format!("{} - {}\n\n{}\n", self.title, self.subtitle, self.heading);
        out.push_str(&"-".repeat(self.heading.len()));
        out.push('\n');

        if self.sections.is_empty() {
            out.push_str("\nNo module has been answered yet.\n");
        }

        for section in &self.sections {
            out.push_str(&format!(
                "\n{}\n  {}\n  {}\n",
                section.module_name, section.result_text, section.note
            ));
        }

        out.push_str(&format!("\n{}\n{}\n", self.footer, self.tagline));
        out
    }
}
