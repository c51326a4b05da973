//! Insulator Inspector: application entry point.
//!
//! Photograph an electrical insulator, get a condition verdict from
//! Gemini, log it to Supabase. Modules, leaf-first:
//!   - capture/     image file → base64 payload + media type
//!   - llm/         Gemini classification and verdict validation
//!   - store/       fire-and-forget Supabase insert
//!   - pipeline.rs  analyze/reset state machine
//!   - report.rs    terminal rendering of the state
//!   - shell.rs     interactive and one-shot front ends
//!   - config.rs    env files, environment, keychain

pub mod capture;
pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod report;
pub mod shell;
pub mod store;

pub use error::InspectError;
pub use pipeline::{InspectionRequest, InspectionState, Inspector};

use llm::GeminiClient;
use std::process::ExitCode;
use std::sync::Arc;
use store::SupabaseStore;

const USAGE: &str = "\
Usage:
  insulator-inspector                      Interactive mode
  insulator-inspector <image>              Analyse one uploaded image
  insulator-inspector --camera <image>     Analyse one camera capture
  insulator-inspector --save-key <key>     Store the Gemini key in the OS keychain";

enum Mode {
    Interactive,
    Once(InspectionRequest),
    SaveKey(String),
    Help,
}

fn parse_args(args: &[String]) -> Result<Mode, String> {
    match args {
        [] => Ok(Mode::Interactive),
        [flag] if flag == "--help" || flag == "-h" => Ok(Mode::Help),
        [flag, key] if flag == "--save-key" => Ok(Mode::SaveKey(key.clone())),
        [flag, path] if flag == "--camera" => Ok(Mode::Once(InspectionRequest::camera(path))),
        [path] if !path.starts_with("--") => Ok(Mode::Once(InspectionRequest::upload(path))),
        _ => Err(USAGE.to_string()),
    }
}

/// Entry point: called by `main`.
pub fn run() -> ExitCode {
    config::load_env_files();
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = match parse_args(&args) {
        Ok(mode) => mode,
        Err(usage) => {
            eprintln!("{}", usage);
            return ExitCode::from(2);
        }
    };

    match mode {
        Mode::Help => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Mode::SaveKey(key) => {
            return match config::save_api_key(&key) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("{}", e);
                    ExitCode::FAILURE
                }
            };
        }
        Mode::Interactive | Mode::Once(_) => {}
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let settings = config::Settings::from_env();
    log::info!("Insulator Inspector starting — model {}", settings.inference.model);

    runtime.block_on(async move {
        let inspector = Arc::new(Inspector::new(
            GeminiClient::new(settings.inference),
            SupabaseStore::new(settings.store),
        ));

        match mode {
            Mode::Once(request) => {
                if shell::run_once(inspector, request).await {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                }
            }
            _ => {
                shell::run_interactive(inspector).await;
                ExitCode::SUCCESS
            }
        }
    })
}
