//! Scenario runner for the navigation history.
//!
//! Reads a TOML scenario (documents plus a list of user moves), replays it
//! against an in-memory workspace and prints both stacks after every step.

mod scenario;

use std::path::PathBuf;

use anyhow::Context;
use backtrail_history::HistoryConfig;
use clap::Parser;
use tracing::info;

use crate::scenario::{Runner, Scenario};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "backtrail")]
#[command(about = "Replay back/forward navigation scenarios")]
#[command(version)]
struct Args {
	/// Scenario file to replay
	#[arg(value_name = "SCENARIO")]
	scenario: PathBuf,

	/// History configuration, overriding the scenario's `[history]` table
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let mut scenario = Scenario::load(&args.scenario)?;
	if let Some(path) = &args.config {
		scenario.history =
			HistoryConfig::load(path).with_context(|| format!("loading history config {}", path.display()))?;
	}
	info!(
		scenario = %args.scenario.display(),
		documents = scenario.documents.len(),
		steps = scenario.steps.len(),
		"replaying scenario"
	);

	let mut runner = Runner::new(&scenario);
	for (index, step) in scenario.steps.iter().enumerate() {
		let outcome = runner
			.apply(step)
			.await
			.with_context(|| format!("step {} ({step})", index + 1))?;
		println!("{:>3}. {step:<28} {outcome}", index + 1);
		println!("     {}", runner.report());
	}

	let history = runner.history();
	info!(
		back = history.back_entries().len(),
		forward = history.forward_entries().len(),
		"scenario finished"
	);
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("BACKTRAIL_LOG").unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("backtrail_history=debug,backtrail_harness=debug,info")
		} else {
			EnvFilter::new("warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.init();
}
