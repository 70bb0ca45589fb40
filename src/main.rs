// src/main.rs

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use std::io::stdout;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

use vanguard_audit::app::{App, AppEvent, AppState, ExportStatus};
use vanguard_audit::config::{self, AuditConfig, ServerConfig};
use vanguard_audit::core::errors::AuditError;
use vanguard_audit::core::models::AuditResponse;
use vanguard_audit::core::scanner::Auditor;
use vanguard_audit::logging::{initialize_logging, LogSink};
use vanguard_audit::service::bus::PushMessage;
use vanguard_audit::service::events::EventHandler;
use vanguard_audit::service::server;
use vanguard_audit::service::storage::{persist_report, LocalReportStore};
use vanguard_audit::ui;

#[derive(Parser)]
#[command(name = "vanguard-audit")]
#[command(about = "Website security-posture auditor.", version)]
struct CommandLine {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP audit portal and the queued-audit worker
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
        /// Address to bind
        #[arg(long, env = "VANGUARD_AUDIT_HOST", default_value = "0.0.0.0")]
        host: std::net::IpAddr,
        /// Directory reports are written to
        #[arg(long, env = "VANGUARD_REPORT_DIR")]
        report_dir: Option<PathBuf>,
        /// Don't persist reports produced by POST /scan
        #[arg(long)]
        no_persist: bool,
        /// Topic that queued scan requests are published to
        #[arg(long, env = "VANGUARD_REQUESTS_TOPIC", default_value = config::REQUESTS_TOPIC)]
        requests_topic: String,
        /// Topic that finished reports are published to
        #[arg(long, env = "VANGUARD_REPORTS_TOPIC", default_value = config::REPORTS_TOPIC)]
        reports_topic: String,
    },
    /// Audit a single URL and print the JSON result
    #[command(alias = "a")]
    Audit {
        url: String,
        /// Also write the report to the report directory
        #[arg(long)]
        save: bool,
        #[arg(long, env = "VANGUARD_REPORT_DIR")]
        report_dir: Option<PathBuf>,
    },
    /// Process one base64-encoded push message, as the event trigger would
    #[command(alias = "e")]
    Event {
        data: String,
        #[arg(long, env = "VANGUARD_REPORT_DIR")]
        report_dir: Option<PathBuf>,
    },
    /// Interactive terminal interface
    #[command(alias = "t")]
    Tui,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = CommandLine::parse();

    match cli.command {
        Commands::Serve { port, host, report_dir, no_persist, requests_topic, reports_topic } => {
            initialize_logging(LogSink::Stdout)?;
            let server_config = ServerConfig {
                bind: SocketAddr::new(host, port),
                report_dir: report_dir.unwrap_or_else(config::default_report_dir),
                persist_reports: !no_persist,
                requests_topic,
                reports_topic,
            };
            server::serve(server_config, AuditConfig::default()).await
        }
        Commands::Audit { url, save, report_dir } => {
            initialize_logging(LogSink::Stdout)?;
            let outcome = match Auditor::default().perform_full_audit(&url).await {
                Ok(report) if save => {
                    let store = LocalReportStore::new(report_dir.unwrap_or_else(config::default_report_dir));
                    persist_report(&store, report)
                        .await
                        .map_err(|e| AuditError::Failed(e.to_string()))
                }
                other => other,
            };
            let failed = outcome.is_err();
            println!("{}", serde_json::to_string_pretty(&AuditResponse::from(outcome))?);
            if failed {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Event { data, report_dir } => {
            initialize_logging(LogSink::Stdout)?;
            let store = LocalReportStore::new(report_dir.unwrap_or_else(config::default_report_dir));
            let handler = EventHandler::new(Auditor::default(), Arc::new(store));
            let message = PushMessage { data, ..PushMessage::from_bytes(b"") };
            handler.handle(&message).await;
            Ok(())
        }
        Commands::Tui => {
            initialize_logging(LogSink::File)?;
            run_tui().await
        }
    }
}

async fn run_tui() -> Result<()> {
    // --- Setup ---
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;
    info!("Terminal interface started.");

    let mut app = App::new();
    let auditor = Auditor::default();
    let (tx, mut rx) = mpsc::channel(4);

    let result = loop {
        if app.should_quit {
            break Ok(());
        }
        if let Err(e) = terminal.draw(|frame| ui::render(&mut app, frame)) {
            break Err(eyre!(e));
        }

        match event::poll(Duration::from_millis(100)) {
            Ok(true) => {
                if let Err(e) = handle_events(&mut app, &auditor, &tx) {
                    break Err(e);
                }
            }
            Ok(false) => app.on_tick(),
            Err(e) => break Err(eyre!(e)),
        }

        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::AuditFinished(outcome) => app.finish_scan(outcome),
                AppEvent::Exported(Ok(path)) => app.export_status = ExportStatus::Success(path),
                AppEvent::Exported(Err(e)) => app.export_status = ExportStatus::Error(e),
            }
        }
    };

    // --- Restore Terminal ---
    stdout().execute(LeaveAlternateScreen)?;
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    result
}

fn handle_events(app: &mut App, auditor: &Auditor, tx: &mpsc::Sender<AppEvent>) -> Result<()> {
    if let Event::Key(key) = event::read()? {
        if key.kind == KeyEventKind::Press {
            match app.state {
                AppState::Disclaimer => match key.code {
                    KeyCode::Enter => app.acknowledge_disclaimer(),
                    KeyCode::Esc => app.quit(),
                    _ => {}
                },
                AppState::Idle => handle_idle_input(app, key.code, auditor, tx),
                AppState::Finished => handle_finished_input(app, key.code, tx),
                AppState::Scanning => {
                    if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) { app.quit(); }
                }
            }
        }
    }
    Ok(())
}

fn handle_idle_input(app: &mut App, key_code: KeyCode, auditor: &Auditor, tx: &mpsc::Sender<AppEvent>) {
    match key_code {
        KeyCode::Esc => app.quit(),
        KeyCode::Char(c) => app.input.push(c),
        KeyCode::Backspace => { app.input.pop(); },
        KeyCode::Enter => {
            let Some(url) = app.start_scan() else { return };
            let auditor = auditor.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let outcome = auditor.perform_full_audit(&url).await;
                let _ = tx.send(AppEvent::AuditFinished(outcome)).await;
            });
        }
        _ => {}
    }
}

fn handle_finished_input(app: &mut App, key_code: KeyCode, tx: &mpsc::Sender<AppEvent>) {
    match key_code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('n') => app.reset(),
        KeyCode::Char('e') => {
            let Some(report) = app.report().cloned() else { return };
            if app.export_status == ExportStatus::InProgress {
                return;
            }
            app.export_status = ExportStatus::InProgress;
            let tx = tx.clone();
            tokio::spawn(async move {
                let store = LocalReportStore::new(config::default_report_dir());
                let result = persist_report(&store, report)
                    .await
                    .map(|saved| {
                        let key = saved.report_path.unwrap_or_default();
                        store.root().join(key).display().to_string()
                    })
                    .map_err(|e| e.to_string());
                let _ = tx.send(AppEvent::Exported(result)).await;
            });
        }
        KeyCode::Up => app.select_previous(),
        KeyCode::Down => app.select_next(),
        _ => {}
    }
}
