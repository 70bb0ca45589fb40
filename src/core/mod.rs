// src/core/mod.rs

/// Data structures shared across the engine: `AuditReport`, `HeaderFindings`,
/// `ParsedTarget` and the analysis types.
pub mod models;

/// Error taxonomy of the audit engine.
pub mod errors;

/// Input gate: syntax and host checks on the raw URL.
pub mod validator;

/// The individual probes and the `Auditor` that orchestrates them.
pub mod scanner;

/// Findings derived from a finished report.
pub mod analysis;

/// Static explanations and remediation advice for every finding code.
pub mod knowledge_base;
