//! Iterative file-by-file campaign tracker.
//!
//! Keeps a per-file work queue under `<root>/<data_dir>/`, hands pending
//! batches to an external worker and keeps the JSON store and markdown view in
//! sync. See `campaign --help`.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use campaign::core::filters::ScanFilters;
use campaign::core::kind::CampaignKind;
use campaign::core::types::Severity;
use campaign::exit_codes;
use campaign::io::config::load_config;
use campaign::io::init::{CampaignPaths, InitOptions, init_campaign, now_timestamp};
use campaign::io::prompt::{PromptEngine, PromptInputs};
use campaign::io::registry_store::{Completion, check_completion};
use campaign::io::report::{Finding, append_finding};
use campaign::io::scanner::summarize_dirs;
use campaign::io::worker::CommandWorker;
use campaign::logging;
use campaign::looping::{LoopEvent, LoopStop, run_loop};
use campaign::mark::{mark_done, remove_matching};
use campaign::select::render_next;

#[derive(Parser)]
#[command(
    name = "campaign",
    version,
    about = "Iterative file-by-file code reading and security audit tracker"
)]
struct Cli {
    /// Directory the campaign covers.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,
    /// Campaign kind.
    #[arg(long, global = true, default_value = "read", value_parser = parse_kind)]
    kind: CampaignKind,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the root and (re)create the task store and view.
    Init {
        /// Extra directory names to prune (comma separated).
        #[arg(long, default_value = "")]
        ignore_dirs: String,
        /// Only keep these extensions (comma separated). Empty disables.
        #[arg(long)]
        include_exts: Option<String>,
        /// Drop these extensions (comma separated).
        #[arg(long, default_value = "")]
        exclude_exts: String,
    },
    /// Print the pending excerpt for the next worker round.
    Next,
    /// Mark files completed.
    Done {
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Drop tasks whose path contains any pattern.
    Remove {
        #[arg(required = true)]
        patterns: Vec<String>,
    },
    /// Summarize the directory structure below the root.
    Scan {
        #[arg(long, default_value_t = 3)]
        max_depth: usize,
    },
    /// Append a vulnerability to the audit report.
    Report {
        #[arg(long)]
        title: String,
        #[arg(long, value_parser = parse_severity)]
        severity: Severity,
        #[arg(long)]
        file: String,
        #[arg(long)]
        desc: Option<String>,
    },
    /// Print progress; exits 2 when every task is completed.
    Status,
    /// Drive the worker until the campaign is complete.
    Loop {
        /// Overrides `max_iterations` from config.toml.
        #[arg(long)]
        max_iterations: Option<u32>,
    },
}

fn parse_kind(raw: &str) -> std::result::Result<CampaignKind, String> {
    raw.parse().map_err(|err: anyhow::Error| err.to_string())
}

fn parse_severity(raw: &str) -> std::result::Result<Severity, String> {
    raw.parse().map_err(|err: anyhow::Error| err.to_string())
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return Ok(usage_exit(&err)),
    };
    let root = fs::canonicalize(&cli.root)
        .with_context(|| format!("resolve root {}", cli.root.display()))?;
    if !root.is_dir() {
        bail!("root {} is not a directory", root.display());
    }
    let paths = CampaignPaths::new(root, cli.kind);

    match cli.command {
        Command::Init {
            ignore_dirs,
            include_exts,
            exclude_exts,
        } => cmd_init(&paths, &ignore_dirs, include_exts.as_deref(), &exclude_exts),
        Command::Next => cmd_next(&paths),
        Command::Done { files } => cmd_done(&paths, &files),
        Command::Remove { patterns } => cmd_remove(&paths, &patterns),
        Command::Scan { max_depth } => cmd_scan(&paths, max_depth),
        Command::Report {
            title,
            severity,
            file,
            desc,
        } => cmd_report(
            &paths,
            Finding {
                title,
                severity,
                file,
                description: desc,
            },
        ),
        Command::Status => cmd_status(&paths),
        Command::Loop { max_iterations } => cmd_loop(&paths, max_iterations),
    }
}

/// Prints a clap error and maps it onto our exit codes, so bad arguments
/// never share clap's default `2` with [`exit_codes::COMPLETE`].
fn usage_exit(err: &clap::Error) -> i32 {
    if err.print().is_err() {
        eprintln!("{err}");
    }
    if err.use_stderr() {
        exit_codes::INVALID
    } else {
        exit_codes::OK
    }
}

fn cmd_init(
    paths: &CampaignPaths,
    ignore_dirs: &str,
    include_exts: Option<&str>,
    exclude_exts: &str,
) -> Result<i32> {
    let filters = ScanFilters::from_csv(paths.kind, ignore_dirs, include_exts, exclude_exts);
    let registry = init_campaign(paths, &InitOptions { filters })?;
    println!(
        "Initialized {} campaign: {} files discovered.",
        paths.kind,
        registry.targets.len()
    );
    println!("View: {}", paths.view_path.display());
    Ok(exit_codes::OK)
}

fn cmd_next(paths: &CampaignPaths) -> Result<i32> {
    let engine = prompt_engine(paths)?;
    let text = render_next(paths, &engine, &prompt_inputs(paths)?)?;
    println!("{text}");
    Ok(exit_codes::OK)
}

fn cmd_done(paths: &CampaignPaths, files: &[String]) -> Result<i32> {
    let summary = mark_done(paths, files)?;
    for path in &summary.updated {
        println!("Completed: {path}");
    }
    for path in &summary.already_completed {
        println!("Already completed: {path}");
    }
    for path in &summary.unknown {
        println!("Warning: {path} is not in the task list");
    }
    Ok(exit_codes::OK)
}

fn cmd_remove(paths: &CampaignPaths, patterns: &[String]) -> Result<i32> {
    let summary = remove_matching(paths, patterns)?;
    if summary.changed() {
        println!(
            "Removed {} tasks; {} remaining.",
            summary.removed.len(),
            summary.remaining
        );
    } else {
        println!("No tasks matched.");
    }
    Ok(exit_codes::OK)
}

fn cmd_scan(paths: &CampaignPaths, max_depth: usize) -> Result<i32> {
    let ignored = ScanFilters::from_csv(paths.kind, "", None, "").ignored_dirs;
    let summaries = summarize_dirs(&paths.root, &ignored, max_depth)?;
    println!("Directory structure of {}:", paths.root.display());
    for summary in summaries {
        let exts = summary
            .top_exts
            .iter()
            .map(|(ext, count)| format!("{ext}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{}{}/ ({} files{})",
            "  ".repeat(summary.depth),
            summary.path,
            summary.file_count,
            if exts.is_empty() {
                String::new()
            } else {
                format!("; {exts}")
            }
        );
    }
    Ok(exit_codes::OK)
}

fn cmd_report(paths: &CampaignPaths, finding: Finding) -> Result<i32> {
    if paths.kind != CampaignKind::Audit {
        bail!("report is only available for audit campaigns (use --kind audit)");
    }
    append_finding(paths, &finding, &now_timestamp())?;
    println!("Reported: {}", finding.title);
    Ok(exit_codes::OK)
}

fn cmd_status(paths: &CampaignPaths) -> Result<i32> {
    match check_completion(paths)? {
        Completion::Missing => bail!(
            "no campaign found at {} (run `campaign --kind {} init` first)",
            paths.state_path.display(),
            paths.kind
        ),
        Completion::Empty => {
            println!("Campaign has no targets.");
            Ok(exit_codes::OK)
        }
        Completion::Pending(pending) => {
            println!("{pending} tasks pending.");
            Ok(exit_codes::OK)
        }
        Completion::Complete => {
            println!("All tasks completed!");
            Ok(exit_codes::COMPLETE)
        }
    }
}

fn cmd_loop(paths: &CampaignPaths, max_iterations: Option<u32>) -> Result<i32> {
    let mut config = load_config(&paths.config_path)?;
    if max_iterations.is_some() {
        config.max_iterations = max_iterations;
    }
    let worker = CommandWorker::locate(&config.worker)?;
    println!("Worker: {}", worker.program().display());
    let engine = PromptEngine::new(config.prompts.clone(), &paths.data_dir);
    let inputs = prompt_inputs(paths)?;

    let outcome = run_loop(paths, &worker, &engine, &inputs, &config, |event| match event {
        LoopEvent::Planning => println!("No task store yet; running planning phase."),
        LoopEvent::PlanningSkipped => println!("Task store found; skipping planning."),
        LoopEvent::Dispatch { iteration, pending } => {
            println!("Iteration {iteration}: {pending} tasks pending.")
        }
    })?;

    match outcome.stop {
        LoopStop::Complete => println!(
            "All tasks completed after {} iterations.",
            outcome.dispatches
        ),
        LoopStop::MaxIterationsExceeded { max_iterations } => {
            println!("Stopped after reaching max_iterations ({max_iterations}).")
        }
    }
    Ok(exit_codes::OK)
}

fn prompt_engine(paths: &CampaignPaths) -> Result<PromptEngine> {
    let config = load_config(&paths.config_path)?;
    Ok(PromptEngine::new(config.prompts, &paths.data_dir))
}

/// Template inputs; `manager` is this executable, templates add the flags.
fn prompt_inputs(paths: &CampaignPaths) -> Result<PromptInputs> {
    let exe = env::current_exe().context("resolve current executable")?;
    Ok(PromptInputs {
        manager: exe.display().to_string(),
        root: paths.root.display().to_string(),
        goal: paths.kind.default_goal().map(str::to_string),
    })
}
