// src/app.rs

use crate::core::analysis::{analyze, ScanSummary};
use crate::core::models::{AnalysisFinding, AuditOutcome, AuditReport};
use ratatui::widgets::ListState;

pub const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Messages sent back to the UI loop by background tasks.
#[derive(Debug)]
pub enum AppEvent {
    AuditFinished(AuditOutcome),
    Exported(Result<String, String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Idle,
    InProgress,
    Success(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Disclaimer,
    Idle,
    Scanning,
    Finished,
}

pub struct App {
    pub should_quit: bool,
    pub state: AppState,
    pub input: String,
    pub outcome: Option<AuditOutcome>,
    pub findings: Vec<AnalysisFinding>,
    pub summary: ScanSummary,
    pub analysis_list_state: ListState,
    pub spinner_frame: usize,
    pub export_status: ExportStatus,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            state: AppState::Disclaimer,
            input: String::new(),
            outcome: None,
            findings: Vec::new(),
            summary: ScanSummary::default(),
            analysis_list_state: ListState::default(),
            spinner_frame: 0,
            export_status: ExportStatus::Idle,
        }
    }

    /// The finished report, if the last audit produced one.
    pub fn report(&self) -> Option<&AuditReport> {
        self.outcome.as_ref().and_then(|outcome| outcome.as_ref().ok())
    }

    pub fn acknowledge_disclaimer(&mut self) {
        if self.state == AppState::Disclaimer {
            self.state = AppState::Idle;
        }
    }

    /// Switches to scanning and hands back the URL to audit, or `None` when
    /// there is nothing to scan.
    pub fn start_scan(&mut self) -> Option<String> {
        if self.state != AppState::Idle || self.input.trim().is_empty() {
            return None;
        }
        self.state = AppState::Scanning;
        self.spinner_frame = 0;
        Some(self.input.clone())
    }

    pub fn finish_scan(&mut self, outcome: AuditOutcome) {
        self.findings = match &outcome {
            Ok(report) => analyze(report),
            Err(_) => Vec::new(),
        };
        self.summary = ScanSummary::from_findings(&self.findings);
        self.analysis_list_state = ListState::default();
        if !self.findings.is_empty() {
            self.analysis_list_state.select(Some(0));
        }
        self.outcome = Some(outcome);
        self.state = AppState::Finished;
    }

    pub fn select_next(&mut self) {
        if self.findings.is_empty() {
            return;
        }
        let next = match self.analysis_list_state.selected() {
            Some(i) if i + 1 < self.findings.len() => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.analysis_list_state.select(Some(next));
    }

    pub fn select_previous(&mut self) {
        if self.findings.is_empty() {
            return;
        }
        let previous = self.analysis_list_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.analysis_list_state.select(Some(previous));
    }

    pub fn on_tick(&mut self) {
        if self.state == AppState::Scanning {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_CHARS.len();
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn reset(&mut self) {
        self.state = AppState::Idle;
        self.input = String::new();
        self.outcome = None;
        self.findings = Vec::new();
        self.summary = ScanSummary::default();
        self.analysis_list_state = ListState::default();
        self.spinner_frame = 0;
        self.export_status = ExportStatus::Idle;
    }
}
