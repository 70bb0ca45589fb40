// src/ui/widgets/mod.rs

pub mod analysis_view; // Findings list and details pane.
pub mod disclaimer_popup;
pub mod footer; // Key hints for the current state.
pub mod input;
pub mod summary; // Score, checks and open ports.
