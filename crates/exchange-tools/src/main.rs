//! Exchange tools CLI
//!
//! # Usage
//!
//! ```bash
//! # Translate a chain and append it to the round-trip log
//! exchange-tools translate --glyphs "ally shield target"
//!
//! # Turn translator output into a validated factory order
//! exchange-tools emit-order spike.json outbox/order.json --order-id order-061
//!
//! # Check exchange payloads
//! exchange-tools check-exchange exchange/inbox
//!
//! # Re-validate stored factory orders and append to the monitor log
//! exchange-tools monitor-orders --samples telemetry/emoji_runtime/promoted_samples
//!
//! # Custom lexicon and log location
//! EXCHANGE_LEXICON_PATH=./lexicon.json RUST_LOG=debug exchange-tools simulate
//! ```
//!
//! Logs go to stderr; stdout carries only JSON and check results.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use exchange_tools::emitter::{self, OrderOverrides};
use exchange_tools::playtest_writer::{self, Simulation};
use exchange_tools::{
    exchange_check, order_monitor, round_trip_log, samples, telemetry_check, ExchangeConfig,
};
use translator::playtest::{RunStamp, TutorialScript, WheelBindings};
use translator::validation::DataQualityRules;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Lexicon JSON (overrides EXCHANGE_LEXICON_PATH)
    #[arg(long, global = true)]
    lexicon: Option<PathBuf>,

    /// Ritual/status table overrides in TOML (overrides EXCHANGE_TABLES_PATH)
    #[arg(long, global = true)]
    tables: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate a glyph chain and print the round trip
    Translate {
        /// Space-separated glyphs or ids
        #[arg(long, conflicts_with = "glyph_file")]
        glyphs: Option<String>,

        /// Sample file of the form {"glyphs": [...]}
        #[arg(long)]
        glyph_file: Option<PathBuf>,

        /// Round-trip log (overrides EXCHANGE_ROUND_TRIP_LOG)
        #[arg(long)]
        log: Option<PathBuf>,

        /// Do not append to the round-trip log
        #[arg(long, default_value_t = false)]
        no_log: bool,
    },

    /// Validate a stored factory order (bare or inside a round trip)
    ValidateOrder {
        path: PathBuf,
    },

    /// Emit a validated factory order from translator output
    EmitOrder {
        /// File containing translator output
        translator_payload: PathBuf,

        /// Where to write the factory-order JSON
        destination: PathBuf,

        #[arg(long)]
        order_id: Option<String>,

        /// Issuing workspace
        #[arg(long)]
        issued_by: Option<String>,

        /// Target workspace
        #[arg(long)]
        target: Option<String>,

        #[arg(long)]
        priority: Option<String>,

        /// ISO-8601 issue timestamp
        #[arg(long)]
        timestamp: Option<String>,

        /// Lore summary override
        #[arg(long)]
        summary: Option<String>,

        /// Sets metadata.narrator_profile
        #[arg(long)]
        narrator: Option<String>,

        /// KEY=VALUE assignment, VALUE parsed as JSON when possible (repeatable)
        #[arg(long = "extra-field")]
        extra_fields: Vec<String>,

        /// Print the order instead of writing it
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Validate exchange payload files or directories of them
    CheckExchange {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Re-validate every stored factory order under a samples directory
    MonitorOrders {
        #[arg(long, default_value = order_monitor::DEFAULT_SAMPLES_DIR)]
        samples: PathBuf,

        /// Monitor log (defaults to <log dir>/factory_order_monitor.log)
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Validate an exported telemetry file of the form {"batches": [...]}
    CheckTelemetry {
        path: PathBuf,
    },

    /// Simulate the campaign tutorial and write playtest telemetry
    Simulate {
        #[arg(long, default_value = playtest_writer::DEFAULT_ORDER_ID)]
        order_id: String,

        #[arg(long, default_value = playtest_writer::DEFAULT_WORKSPACE)]
        workspace: String,

        /// Defaults to campaign2-<UTC start time>
        #[arg(long)]
        run_id: Option<String>,

        /// Overrides EXCHANGE_LOG_DIR
        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// Overrides EXCHANGE_ATTACHMENTS_DIR
        #[arg(long)]
        attachments_dir: Option<PathBuf>,

        /// Tutorial script JSON (defaults to the built-in campaign script)
        #[arg(long)]
        script: Option<PathBuf>,
    },
}

fn read_json(path: &Path) -> Result<Value> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("{} is invalid JSON", path.display()))
}

fn run(args: Args) -> Result<ExitCode> {
    let mut config = ExchangeConfig::default();
    if args.lexicon.is_some() {
        config.lexicon_path = args.lexicon;
    }
    if args.tables.is_some() {
        config.tables_path = args.tables;
    }

    match args.command {
        Command::Translate {
            glyphs,
            glyph_file,
            log,
            no_log,
        } => {
            let tokens: Vec<String> = match (glyphs, glyph_file) {
                (Some(glyphs), _) => glyphs.split_whitespace().map(str::to_string).collect(),
                (None, Some(path)) => samples::load_glyphs_from_file(&path)?,
                (None, None) => bail!("Provide --glyphs or --glyph-file"),
            };
            let translator = config.translator()?;
            let trip = translator.translate(tokens.as_slice())?;
            if !no_log {
                let log_path = log.unwrap_or(config.round_trip_log);
                round_trip_log::append_round_trip(&trip, &log_path)?;
            }
            println!("{}", serde_json::to_string_pretty(&trip)?);
            Ok(ExitCode::SUCCESS)
        }

        Command::ValidateOrder { path } => {
            let order = emitter::extract_order(read_json(&path)?)?;
            let result = config.translator()?.validate(&Value::Object(order));
            println!("{}", serde_json::to_string_pretty(&result)?);
            if result.accepted {
                Ok(ExitCode::SUCCESS)
            } else {
                warn!(path = %path.display(), "{}", result.summary());
                Ok(ExitCode::FAILURE)
            }
        }

        Command::EmitOrder {
            translator_payload,
            destination,
            order_id,
            issued_by,
            target,
            priority,
            timestamp,
            summary,
            narrator,
            extra_fields,
            dry_run,
        } => {
            let overrides = OrderOverrides {
                order_id,
                issued_by,
                target,
                priority,
                timestamp_issued: timestamp,
                summary,
                narrator_profile: narrator,
                extra_fields,
            };
            let translator = config.translator()?;
            let outcome = emitter::emit(
                &translator_payload,
                &destination,
                &overrides,
                &translator,
                dry_run,
            )?;
            match outcome.written {
                Some(path) => println!("Wrote factory order -> {}", path.display()),
                None => println!("{}", serde_json::to_string_pretty(&outcome.order)?),
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::CheckExchange { paths } => {
            let outcomes = exchange_check::check_paths(&paths)?;
            for outcome in &outcomes {
                println!("{outcome}");
            }
            if outcomes.iter().all(|o| o.is_valid()) {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }

        Command::MonitorOrders { samples, log } => {
            let translator = config.translator()?;
            let report = order_monitor::monitor_orders(&samples, &translator, Utc::now())?;
            let log_path =
                log.unwrap_or_else(|| config.log_dir.join(order_monitor::MONITOR_LOG_NAME));
            order_monitor::append_log(&report, &log_path)?;
            println!("{}", report.lines().join("\n"));
            if report.is_ok() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }

        Command::CheckTelemetry { path } => {
            let result = telemetry_check::check_export(&path, &DataQualityRules::default())?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if result.accepted {
                Ok(ExitCode::SUCCESS)
            } else {
                warn!(path = %path.display(), "{}", result.summary());
                Ok(ExitCode::FAILURE)
            }
        }

        Command::Simulate {
            order_id,
            workspace,
            run_id,
            log_dir,
            attachments_dir,
            script,
        } => {
            let script = match script {
                Some(path) => {
                    let source = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    TutorialScript::from_json_str(&source)
                        .with_context(|| format!("Invalid tutorial script {}", path.display()))?
                }
                None => TutorialScript::from_json_str(playtest_writer::BUILTIN_TUTORIAL)
                    .context("Built-in tutorial script is malformed")?,
            };
            let start = Utc::now();
            let simulation = Simulation {
                stamp: RunStamp {
                    order_id,
                    run_id: run_id.unwrap_or_else(|| playtest_writer::default_run_id(start)),
                    workspace,
                },
                start,
                script,
                bindings: WheelBindings::default(),
            };

            let translator = config.translator()?;
            let (events, summary) = simulation.run(&translator, Utc::now())?;
            let paths = playtest_writer::write_outputs(
                &events,
                &summary,
                &log_dir.unwrap_or(config.log_dir),
                &attachments_dir.unwrap_or(config.attachments_dir),
            )?;
            println!("Wrote events to {}", paths.events.display());
            println!("Wrote telemetry to {}", paths.telemetry.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    info!(command = ?args.command, "exchange-tools starting");

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("[exchange-tools] {e:#}");
            ExitCode::FAILURE
        }
    }
}
