// src/lib.rs

pub mod app;
pub mod config;
pub mod core;
pub mod logging;
pub mod service;
pub mod ui;

pub use crate::core::models::{AuditOutcome, AuditReport, AuditResponse, HeaderFindings};
pub use crate::core::scanner::{perform_full_audit, Auditor};
