//! Dashboard state for one session
//!
//! `Dashboard` owns everything the browser page shows: the ER input, the SQL
//! schema, the Mermaid diagram, the suggestion list, which view is active,
//! and the single error banner. The server keeps one per `serve` run.
//!
//! Each AI operation goes through the same two steps:
//!
//! 1. [`Dashboard::begin`] checks that nothing else is running, builds the
//!    request (failing fast on missing input), clears the error and the
//!    field the operation will fill, and marks the dashboard busy.
//! 2. [`Dashboard::finish`] commits the parsed output and switches view, or
//!    records the error. Either way the dashboard is idle again.
//!
//! The network call happens between the two, so a caller holding the
//! dashboard behind a lock can release it while waiting.

use crate::ai::{self, prompt, CompletionRequest, CompletionService, Operation, Output};
use crate::error::{Error, Result};
use crate::export::{self, ExportFile};
use crate::model::{InputArtifact, Suggestion, Theme, UploadedFile, View};
use crate::score::{self, HealthBand};
use serde::Serialize;

#[derive(Debug, Default)]
pub struct Dashboard {
    theme: Theme,
    view: View,
    input: Option<InputArtifact>,
    schema: String,
    diagram: String,
    suggestions: Vec<Suggestion>,
    running: Option<Operation>,
    error: Option<String>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn input(&self) -> Option<&InputArtifact> {
        self.input.as_ref()
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn diagram(&self) -> &str {
        &self.diagram
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.running.is_some()
    }

    /// Always computed from the current list.
    pub fn score(&self) -> u8 {
        score::score(&self.suggestions)
    }

    // ------------------------------------------------------------------
    // User edits
    // ------------------------------------------------------------------

    /// A new upload replaces any typed text.
    pub fn upload(&mut self, file: UploadedFile) {
        tracing::info!(name = %file.name, mime = %file.mime_type, "input file uploaded");
        self.input = Some(InputArtifact::File(file));
        self.view = View::Er;
    }

    /// Typed text replaces any uploaded file. Blank text clears the input.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.input = if text.trim().is_empty() {
            None
        } else {
            Some(InputArtifact::Text(text))
        };
    }

    pub fn clear_input(&mut self) {
        self.input = None;
    }

    pub fn set_schema(&mut self, sql: impl Into<String>) {
        self.schema = sql.into();
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Put an error in the banner, replacing whatever was there.
    pub fn report(&mut self, err: &Error) {
        self.error = Some(err.to_string());
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Idle → Running.
    pub fn begin(&mut self, op: Operation) -> Result<CompletionRequest> {
        if let Some(current) = self.running {
            tracing::warn!(requested = %op, running = %current, "operation rejected while busy");
            return Err(Error::Busy);
        }

        let request = match op {
            Operation::GenerateSql => prompt::sql_request(self.input.as_ref()),
            Operation::GenerateEr => prompt::er_request(&self.schema),
            Operation::Optimize => prompt::optimize_request(&self.schema),
        };
        let request = match request {
            Ok(r) => r,
            Err(e) => {
                self.report(&e);
                return Err(e);
            }
        };

        self.error = None;
        match op {
            Operation::GenerateSql => self.schema.clear(),
            Operation::GenerateEr => self.diagram.clear(),
            Operation::Optimize => self.suggestions.clear(),
        }
        self.running = Some(op);
        Ok(request)
    }

    /// Running → Success | Failed.
    ///
    /// A result for an operation other than the one in flight is refused and
    /// leaves the guard and all state untouched.
    pub fn finish(&mut self, op: Operation, result: Result<Output>) -> Result<()> {
        if self.running != Some(op) {
            tracing::warn!(operation = %op, "finish called for an operation that is not running");
            return Err(Error::NotRunning(op));
        }
        self.running = None;

        match result {
            Ok(output) => {
                match output {
                    Output::Sql(sql) => self.schema = sql,
                    Output::Diagram(diagram) => self.diagram = diagram,
                    Output::Suggestions(list) => self.suggestions = list,
                }
                self.view = op.target_view();
                tracing::info!(operation = %op, "operation succeeded");
                Ok(())
            }
            Err(e) => {
                self.report(&e);
                Err(e)
            }
        }
    }

    /// `begin`, call the service, `finish`.
    pub fn run(&mut self, op: Operation, service: &dyn CompletionService) -> Result<()> {
        let request = self.begin(op)?;
        let result = ai::execute(service, &request);
        self.finish(op, result)
    }

    /// File for the active view. Empty content puts a message in the banner.
    pub fn export(&mut self) -> Result<ExportFile> {
        self.export_view(self.view)
    }

    /// File for `view` without switching to it.
    pub fn export_view(&mut self, view: View) -> Result<ExportFile> {
        match export::prepare(view, &self.schema, &self.diagram, &self.suggestions) {
            Ok(file) => Ok(file),
            Err(e) => {
                self.report(&e);
                Err(e)
            }
        }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let score = self.score();
        DashboardSnapshot {
            theme: self.theme,
            view: self.view,
            primary_action: self.view.primary_action(),
            input: self.input.as_ref().map(InputSummary::from),
            schema: self.schema.clone(),
            diagram: self.diagram.clone(),
            suggestions: self.suggestions.clone(),
            score,
            band: HealthBand::from_score(score),
            busy: self.is_busy(),
            running: self.running,
            error: self.error.clone(),
        }
    }
}

/// What the page needs to render.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub theme: Theme,
    pub view: View,
    pub primary_action: &'static str,
    pub input: Option<InputSummary>,
    pub schema: String,
    pub diagram: String,
    pub suggestions: Vec<Suggestion>,
    pub score: u8,
    pub band: HealthBand,
    pub busy: bool,
    pub running: Option<Operation>,
    pub error: Option<String>,
}

/// The input without its payload; images can be large.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum InputSummary {
    File {
        name: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
    Text { text: String },
}

impl From<&InputArtifact> for InputSummary {
    fn from(input: &InputArtifact) -> Self {
        match input {
            InputArtifact::File(f) => InputSummary::File {
                name: f.name.clone(),
                mime_type: f.mime_type.clone(),
            },
            InputArtifact::Text(t) => InputSummary::Text { text: t.clone() },
        }
    }
}
