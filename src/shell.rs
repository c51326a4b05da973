//! Terminal front end: the user-facing surface.
//!
//! Commands: capture/upload an image, reset, retry (after an error),
//! status, help, quit. Analyses run on spawned tasks so the prompt stays
//! responsive; triggers are refused while one is Loading.

use crate::llm::Classify;
use crate::pipeline::{InspectionRequest, InspectionState, Inspector};
use crate::report;
use crate::store::Record;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

/// How long shutdown waits for outstanding database writes.
pub const PERSISTENCE_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Capture(PathBuf),
    Upload(PathBuf),
    Reset,
    Retry,
    Status,
    Help,
    Quit,
}

/// Parse one input line.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let path_arg = |verb: &str| -> Result<PathBuf, String> {
        if rest.is_empty() {
            Err(format!("usage: {} <image path>", verb))
        } else {
            Ok(PathBuf::from(rest))
        }
    };

    match verb.to_lowercase().as_str() {
        "capture" | "camera" => path_arg("capture").map(Command::Capture),
        "upload" | "open" => path_arg("upload").map(Command::Upload),
        "reset" | "new" => Ok(Command::Reset),
        "retry" => Ok(Command::Retry),
        "status" | "" => Ok(Command::Status),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("unknown command: {} (try `help`)", other)),
    }
}

const HELP: &str = "\
commands:
  capture <path>   analyse a photo taken with the camera
  upload <path>    analyse an existing image file
  reset            clear the result and start over
  retry            clear an error and start over
  status           show the current screen
  quit             exit
";

/// Interactive loop over stdin until `quit` or EOF.
pub async fn run_interactive<C: Classify, R: Record>(inspector: Arc<Inspector<C, R>>) {
    print!("{}", report::render(&inspector.state(), None));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log::error!("[SHELL] Failed to read stdin: {}", e);
                break;
            }
        };

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        match command {
            Command::Capture(path) => trigger(&inspector, InspectionRequest::camera(path)),
            Command::Upload(path) => trigger(&inspector, InspectionRequest::upload(path)),
            Command::Reset => {
                inspector.reset();
                print!("{}", report::render(&inspector.state(), None));
            }
            Command::Retry => {
                if matches!(inspector.state(), InspectionState::Error(_)) {
                    inspector.reset();
                    print!("{}", report::render(&inspector.state(), None));
                } else {
                    println!("nothing to retry");
                }
            }
            Command::Status => {
                let preview = inspector.preview();
                print!("{}", report::render(&inspector.state(), preview.as_deref()));
            }
            Command::Help => print!("{}", HELP),
            Command::Quit => break,
        }
    }

    drain(&inspector).await;
}

fn trigger<C: Classify, R: Record>(inspector: &Arc<Inspector<C, R>>, request: InspectionRequest) {
    let preview = request.path.clone();
    let Some(ticket) = inspector.try_begin(request) else {
        println!("analysis already in progress — wait for it to finish");
        return;
    };
    print!(
        "{}",
        report::render(&InspectionState::Loading, Some(&preview))
    );

    let inspector = Arc::clone(inspector);
    tokio::spawn(async move {
        if let Some(state) = inspector.complete(ticket).await {
            print!("{}", report::render(&state, Some(&preview)));
        }
    });
}

/// Analyse a single request and print the outcome. Returns false on error.
pub async fn run_once<C: Classify, R: Record>(
    inspector: Arc<Inspector<C, R>>,
    request: InspectionRequest,
) -> bool {
    let preview = request.path.clone();
    let state = inspector.analyze(request).await;
    let ok = match &state {
        Some(state) => {
            print!("{}", report::render(state, Some(&preview)));
            !matches!(state, InspectionState::Error(_))
        }
        None => false,
    };
    drain(&inspector).await;
    ok
}

async fn drain<C: Classify, R: Record>(inspector: &Inspector<C, R>) {
    if tokio::time::timeout(PERSISTENCE_GRACE, inspector.flush_persistence())
        .await
        .is_err()
    {
        log::warn!(
            "[SHELL] Gave up waiting for database writes after {}s",
            PERSISTENCE_GRACE.as_secs()
        );
    }
}
