//! Log service process entry point.
//!
//! # Responsibility
//! - Load configuration, start logging and open the configured collection.
//! - Serve the RPC surface as JSON lines: one request per stdin line, one
//!   response per stdout line.
//! - Answer `--ping` and `--version` without touching storage.

use log::{error, info};
use log_service_core::{dispatch_line, init_logging, LogService, ServiceConfig};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match std::env::args().nth(1).as_deref() {
        Some("--version") => {
            println!("log_service version={}", log_service_core::core_version());
            return ExitCode::SUCCESS;
        }
        Some("--ping") => {
            println!("log_service ping={}", log_service_core::ping());
            return ExitCode::SUCCESS;
        }
        Some(other) => {
            eprintln!("unknown argument `{other}`; expected --version or --ping");
            return ExitCode::FAILURE;
        }
        None => {}
    }

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("log_service: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = ServiceConfig::from_env().map_err(|err| err.to_string())?;
    init_logging(&config.log_level, config.log_dir.as_deref())?;

    let service = LogService::open(&config).map_err(|err| {
        error!("event=service_open module=cli status=error error={err}");
        err.to_string()
    })?;
    info!(
        "event=serve module=cli status=start transport=stdio database={}",
        config.database_path.display()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.map_err(|err| format!("failed to read request: {err}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let response = dispatch_line(&service, &line);
        writeln!(stdout, "{response}")
            .and_then(|()| stdout.flush())
            .map_err(|err| format!("failed to write response: {err}"))?;
    }

    info!("event=serve module=cli status=stop transport=stdio");
    Ok(())
}
