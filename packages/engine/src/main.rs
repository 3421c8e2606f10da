use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use diag_engine::config::Config;
use diag_engine::logging::init_tracing;
use diag_engine::{driver, DiagnosticEngine, InMemoryConceptCatalog};

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = init_tracing(&config.logging);

    let catalog = match config.concepts_file.as_deref() {
        Some(path) => match InMemoryConceptCatalog::from_json_file(path) {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::error!(error = %err, "failed to load concept catalog");
                return ExitCode::FAILURE;
            }
        },
        None => InMemoryConceptCatalog::new(),
    };

    let engine = match DiagnosticEngine::in_memory(config.engine.clone(), catalog) {
        Ok(engine) => engine,
        Err(err) => {
            tracing::error!(error = %err, "invalid engine configuration");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        concepts = engine.list_concepts().len(),
        ability_levels = engine.scale().len(),
        "diag-engine ready"
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                tracing::error!(error = %err, "failed to read stdin");
                return ExitCode::FAILURE;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let reply = driver::handle_line(&engine, &line);
        if writeln!(stdout, "{reply}").and_then(|_| stdout.flush()).is_err() {
            tracing::warn!("stdout closed, stopping");
            break;
        }
    }

    tracing::info!(metrics = ?engine.metrics(), "diag-engine stopped");
    ExitCode::SUCCESS
}
