// Path: crates/cli/src/commands/run.rs

use anyhow::{anyhow, Result};
use clap::Parser;
use qgov_cli::{load_config, Script, ScriptRunner};
use qgov_types::config::LogFormat;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// The JSON script to execute.
    #[clap(long)]
    pub script: PathBuf,
    /// A TOML configuration file. Defaults apply when omitted.
    #[clap(long)]
    pub config: Option<PathBuf>,
    /// Install the Prometheus sink and print the text export to stderr at the end.
    #[clap(long)]
    pub metrics: bool,
    /// Stop at the first failing step and exit with an error.
    #[clap(long)]
    pub fail_fast: bool,
}

pub fn run(args: RunArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    qgov_telemetry::init::init_tracing(
        config.telemetry.log_format == LogFormat::Json,
        &config.telemetry.log_filter,
    )?;

    let metrics = args.metrics || config.telemetry.metrics;
    if metrics {
        let sink = qgov_telemetry::prometheus::install()?;
        qgov_telemetry::sinks::SINK
            .set(sink)
            .map_err(|_| anyhow!("metrics sink already installed"))?;
    }

    let script = Script::from_path(&args.script)?;
    let runner = ScriptRunner::new(&config);
    tracing::info!(
        steps = script.steps.len(),
        start_height = runner.height(),
        "running {}",
        args.script.display()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failed = 0usize;
    for (index, step) in script.steps.iter().enumerate() {
        let outcome = runner.run_step(index, step, &script.caller);
        writeln!(out, "{}", serde_json::to_string(&outcome)?)?;
        if !outcome.is_ok() {
            failed += 1;
            if args.fail_fast {
                return Err(anyhow!("step {} ({}) failed", index, outcome.op));
            }
        }
    }
    out.flush()?;

    tracing::info!(
        steps = script.steps.len(),
        failed,
        final_height = runner.height(),
        "script finished"
    );
    if metrics {
        eprint!("{}", qgov_telemetry::prometheus::encode_text()?);
    }
    Ok(())
}
