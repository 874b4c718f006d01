//! Rendering of the view state.

use crate::state::ViewState;
use console::style;
use std::fmt;

pub const TITLE: &str = "Simple RAG Chat Interface";
pub const QUERY_PLACEHOLDER: &str = "Ask a question about your documents";
pub const ASK_IDLE_LABEL: &str = "Ask Bot";
pub const ASK_BUSY_LABEL: &str = "Thinking";
pub const PROCESSING_NOTICE: &str = "Processing... please wait";
pub const ANSWER_HEADING: &str = "AI Answer:";

/// A control that can be greyed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub label: String,
    pub enabled: bool,
}

/// Everything on screen for one state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub query: String,
    pub query_editable: bool,
    pub ask: Control,
    pub file_input: Control,
    pub processing: Option<&'static str>,
    pub answer: Option<String>,
}

/// Map view state to a frame.
pub fn render(state: &ViewState) -> Frame {
    let ask_label = if state.is_querying() {
        ASK_BUSY_LABEL
    } else {
        ASK_IDLE_LABEL
    };

    Frame {
        query: state.query().to_string(),
        query_editable: true,
        ask: Control {
            label: ask_label.to_string(),
            enabled: !state.is_querying(),
        },
        file_input: Control {
            label: "Upload .pdf/.txt (:upload <paths>)".to_string(),
            enabled: !state.is_ingesting(),
        },
        processing: state.is_ingesting().then_some(PROCESSING_NOTICE),
        answer: (!state.answer().is_empty()).then(|| state.answer().to_string()),
    }
}

fn control(f: &mut fmt::Formatter<'_>, control: &Control) -> fmt::Result {
    if control.enabled {
        write!(f, "[ {} ]", style(&control.label).bold())
    } else {
        write!(f, "[ {} ]", style(&control.label).dim())
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", style(TITLE).bold().underlined())?;
        writeln!(f)?;
        if self.query.is_empty() {
            writeln!(f, "> {}", style(QUERY_PLACEHOLDER).dim())?;
        } else {
            writeln!(f, "> {}", self.query)?;
        }
        control(f, &self.ask)?;
        writeln!(f)?;
        control(f, &self.file_input)?;
        writeln!(f)?;
        if let Some(notice) = self.processing {
            writeln!(f, "{}", style(notice).yellow())?;
        }
        if let Some(answer) = &self.answer {
            writeln!(f)?;
            writeln!(f, "{}", style(ANSWER_HEADING).bold())?;
            writeln!(f, "{}", answer)?;
        }
        Ok(())
    }
}
