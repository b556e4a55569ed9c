//! CellGate - location-access authorization over simulated platform state
//!
//! Entry point for the scenario runner: loads a scenario file, evaluates
//! every access request against the described device, and reports the
//! results.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use cellgate::scenario::{Scenario, ScenarioRunner};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let mut json = false;
    let mut path: Option<PathBuf> = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            other => path = Some(PathBuf::from(other)),
        }
    }

    let Some(path) = path else {
        eprintln!("usage: cellgate [--json] <scenario.toml>");
        return Ok(ExitCode::from(2));
    };

    info!("CellGate v{} evaluating {:?}", cellgate::VERSION, path);

    let scenario = Scenario::load(&path)
        .await
        .with_context(|| format!("loading scenario {:?}", path))?;

    let runner = ScenarioRunner::new();
    let results = runner.run(&scenario)?;

    let mut mismatches = 0usize;
    for result in &results {
        if json {
            println!("{}", serde_json::to_string(result)?);
        }
        if result.matched == Some(false) {
            mismatches += 1;
        }
    }

    if mismatches > 0 {
        error!(
            "{} of {} requests did not match their expectation",
            mismatches,
            results.len()
        );
        return Ok(ExitCode::FAILURE);
    }

    info!("{} requests evaluated", results.len());
    Ok(ExitCode::SUCCESS)
}
