use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use context_patcher::{
    diag::FailedMatchRecord, Edit, PatchSession, PatchSpecification, SessionError,
};
use serde::Deserialize;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "context-patcher")]
#[command(about = "Context-anchored fuzzy patch engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a patch specification to its target file
    Apply {
        /// Path to the JSON specification ({"file": ..., "edits": [...]})
        spec: PathBuf,

        /// Dry run - show what would change without modifying the file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Serialize failed matches into this directory for offline replay
        #[arg(long)]
        record_failures: Option<PathBuf>,
    },

    /// Locate every anchor without applying anything
    Verify {
        /// Path to the JSON specification
        spec: PathBuf,
    },

    /// Pretty-print a parsed specification
    Show {
        /// Path to the JSON specification
        spec: PathBuf,
    },
}

/// On-disk specification: the target file plus the ordered edits.
#[derive(Deserialize)]
struct SpecFile {
    file: PathBuf,
    edits: Vec<Edit>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            spec,
            dry_run,
            diff,
            record_failures,
        } => cmd_apply(spec, dry_run, diff, record_failures),

        Commands::Verify { spec } => cmd_verify(spec),

        Commands::Show { spec } => cmd_show(spec),
    }
}

fn load_spec(path: &PathBuf) -> Result<SpecFile> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read specification {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse specification {}", path.display()))
}

fn cmd_apply(
    spec_path: PathBuf,
    dry_run: bool,
    diff: bool,
    record_failures: Option<PathBuf>,
) -> Result<()> {
    let spec_file = load_spec(&spec_path)?;
    let spec = PatchSpecification::new(spec_file.edits);

    let mut session = PatchSession::prepare(&spec_file.file)?;
    let pristine = session.pristine_text().to_string();

    if let Err(err) = session.apply(&spec) {
        report_failure(&err, &spec, &spec_file.file, &pristine, record_failures.as_deref())?;
        std::process::exit(1);
    }

    if diff {
        print_diff(&pristine, &session.buffer().to_text());
    }

    if dry_run {
        let (_, changelog) = session.into_preview();
        println!(
            "{} {} edits would apply to {} (dry run)",
            "OK".green().bold(),
            changelog.len(),
            spec_file.file.display()
        );
        return Ok(());
    }

    let changelog = session.commit()?;
    println!(
        "{} applied {} edits to {}",
        "OK".green().bold(),
        changelog.len(),
        spec_file.file.display()
    );
    Ok(())
}

fn cmd_verify(spec_path: PathBuf) -> Result<()> {
    let spec_file = load_spec(&spec_path)?;
    let total = spec_file.edits.len();
    let spec = PatchSpecification::new(spec_file.edits);

    let mut session = PatchSession::prepare(&spec_file.file)?;
    match session.apply(&spec) {
        Ok(()) => {
            println!(
                "{} all {} edits locate cleanly in {}",
                "OK".green().bold(),
                total,
                spec_file.file.display()
            );
            Ok(())
        }
        Err(err) => {
            if let SessionError::EditsFailed { failures, .. } = &err {
                for failure in failures {
                    println!("{} {}", "FAIL".red().bold(), failure);
                }
                println!(
                    "{} {}/{} edits failed",
                    "FAIL".red().bold(),
                    failures.len(),
                    total
                );
            }
            std::process::exit(1);
        }
    }
}

fn cmd_show(spec_path: PathBuf) -> Result<()> {
    let spec_file = load_spec(&spec_path)?;
    println!("target: {}", spec_file.file.display());
    println!("{}", serde_json::to_string_pretty(&spec_file.edits)?);
    Ok(())
}

fn report_failure(
    err: &SessionError,
    spec: &PatchSpecification,
    target: &PathBuf,
    pristine: &str,
    record_dir: Option<&std::path::Path>,
) -> Result<()> {
    let SessionError::EditsFailed { total, failures } = err else {
        eprintln!("{} {}", "ERROR".red().bold(), err);
        return Ok(());
    };

    for failure in failures {
        eprintln!("{} {}", "FAIL".red().bold(), failure);

        if let Some(dir) = record_dir {
            if let Some(pattern) = failed_pattern(&spec.edits[failure.index]) {
                let buffer: Vec<String> = pristine.lines().map(str::to_string).collect();
                let record = FailedMatchRecord::new(target.clone(), pattern, &buffer);
                let path = record.write_to(dir)?;
                eprintln!("  recorded to {}", path.display());
            }
        }
    }
    eprintln!(
        "{} {}/{} edits failed; nothing was written",
        "FAIL".red().bold(),
        failures.len(),
        total
    );
    Ok(())
}

/// The primary pattern of an edit, for failed-match records.
fn failed_pattern(edit: &Edit) -> Option<&[String]> {
    match edit {
        Edit::ReplaceBlock { anchor, .. }
        | Edit::AdaptBlock { anchor, .. }
        | Edit::DeleteBlock { anchor } => anchor
            .before
            .as_ref()
            .or(anchor.after.as_ref())
            .map(|p| p.as_lines()),
        Edit::SearchReplace { pattern, .. } => Some(pattern.as_lines()),
        Edit::AppendAtEnd { .. } => None,
    }
}

fn print_diff(old: &str, new: &str) {
    let diff = TextDiff::from_lines(old, new);
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Delete => print!("{}", format!("-{change}").red()),
            ChangeTag::Insert => print!("{}", format!("+{change}").green()),
            ChangeTag::Equal => print!(" {change}"),
        }
    }
}
