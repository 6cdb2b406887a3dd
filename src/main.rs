use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use pgdelta::analyzer::{analyze, AnalyzerInput};
use pgdelta::apply::{apply_to_pool, ApplyOptions, ApplyStatus};
use pgdelta::diff::{compute_schema_diff, DiffContext};
use pgdelta::model::SchemaSnapshot;
use pgdelta::plan::plan_changes;
use pgdelta::sql::render_statements;

#[derive(Parser)]
#[command(name = "pgdelta", about = "Schema diff and migration planning for PostgreSQL")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the migration plan between two snapshot files
    Plan {
        /// Snapshot of the current (observed) state
        #[arg(long)]
        from: PathBuf,
        /// Snapshot of the desired state
        #[arg(long)]
        to: PathBuf,
        /// Emit the plan as JSON instead of a SQL script
        #[arg(long)]
        json: bool,
        /// Write output to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Apply the plan between two snapshots against a database
    Apply {
        #[arg(long)]
        from: PathBuf,
        #[arg(long)]
        to: PathBuf,
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
        #[arg(long, default_value_t = 10)]
        max_rounds: u32,
        /// Replay routine bodies with check_function_bodies = on at the end
        #[arg(long)]
        check_bodies: bool,
    },
    /// Topologically order the statements of a SQL corpus
    Analyze {
        /// SQL files to analyze
        paths: Vec<PathBuf>,
        #[arg(long)]
        json: bool,
    },
}

fn load_snapshot(path: &Path) -> Result<SchemaSnapshot> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing snapshot {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Plan { from, to, json, out } => {
            let main_state = load_snapshot(&from)?;
            let branch = load_snapshot(&to)?;
            let changes = compute_schema_diff(&DiffContext::default(), &main_state, &branch);
            let plan = plan_changes(changes);

            for diagnostic in &plan.diagnostics {
                eprintln!("warning: {diagnostic}");
            }

            let output = if json {
                serde_json::to_string_pretty(&plan)?
            } else {
                plan.to_script()
            };
            match out {
                Some(path) => std::fs::write(&path, output)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => print!("{output}"),
            }
            Ok(())
        }
        Command::Apply { from, to, database_url, max_rounds, check_bodies } => {
            let main_state = load_snapshot(&from)?;
            let branch = load_snapshot(&to)?;
            let changes = compute_schema_diff(&DiffContext::default(), &main_state, &branch);
            let plan = plan_changes(changes);
            let statements = plan.to_statements();
            info!(statements = statements.len(), "applying plan");

            let pool = PgPoolOptions::new()
                .max_connections(1)
                .connect(&database_url)
                .await
                .context("connecting to the database")?;

            let options = ApplyOptions {
                max_rounds,
                final_validation: check_bodies,
            };
            let mut on_round = |stats: &pgdelta::apply::RoundStats| {
                info!(
                    round = stats.round,
                    applied = stats.applied,
                    deferred = stats.deferred,
                    skipped = stats.skipped,
                    "round complete"
                );
            };
            let outcome =
                apply_to_pool(&pool, &statements, &options, Some(&mut on_round), None).await?;

            println!("{}", serde_json::to_string_pretty(&outcome)?);
            match outcome.status {
                ApplyStatus::Success => Ok(()),
                ApplyStatus::Stuck => bail!(
                    "apply stuck after {} rounds with {} statements remaining",
                    outcome.total_rounds,
                    outcome.stuck_statements.len()
                ),
                ApplyStatus::Error => bail!("apply failed; see errors above"),
            }
        }
        Command::Analyze { paths, json } => {
            if paths.is_empty() {
                bail!("no inputs given");
            }
            let inputs: Vec<AnalyzerInput> =
                paths.into_iter().map(AnalyzerInput::File).collect();
            let result = analyze(&inputs);

            for diagnostic in &result.diagnostics {
                eprintln!("warning: {diagnostic}");
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                let statements: Vec<String> = result
                    .ordered
                    .iter()
                    .map(|node| node.text.trim_end_matches(';').to_string())
                    .collect();
                print!("{}", render_statements(&statements));
            }
            Ok(())
        }
    }
}
