mod logging;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use scriptproof_core::{
    apply, build_map, read_lines, scan, write_lines, CorrectedLogFile, MismatchPolicy,
    PipelineOptions, ProofingPipeline,
};
use scriptproof_export::{export_log, ExportOptions};
use scriptproof_settings::{ProofingConfig, SubstitutionsStore};
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "scriptproof",
    about = "Find untranslated Japanese and Chinese text and patch in corrections",
    author,
    version
)]
struct Cli {
    /// Workspace root holding logs and settings (defaults to current directory).
    #[arg(long, global = true, value_name = "PATH")]
    workspace: Option<PathBuf>,

    /// Fail when the findings and corrected logs differ in length.
    #[arg(long, global = true)]
    strict_count: bool,

    /// Also append log events to this file.
    #[arg(long, global = true, value_name = "FILE")]
    trace_log: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply configured substitutions and list lines still containing kana or kanji.
    Scan(ScanArgs),
    /// Write a corrected log pre-filled with every finding, ready for editing.
    Draft(DraftArgs),
    /// Pair findings with corrections and patch them into a document.
    Fix(FixArgs),
    /// Scan, take corrections from a file and patch the document in one go.
    Run(RunArgs),
    /// Export a log as a paginated EPUB book.
    Export(ExportArgs),
    /// Inspect or edit the configured substitutions.
    #[command(subcommand)]
    Substitutions(SubstitutionsCommand),
}

#[derive(Args)]
struct ScanArgs {
    /// Document to check; rewritten in place when substitutions apply.
    #[arg(value_name = "DOCUMENT")]
    document: PathBuf,

    /// Findings log to write (defaults to the configured findings log).
    #[arg(long, short = 'l', value_name = "LOG")]
    log_file: Option<PathBuf>,
}

#[derive(Args)]
struct DraftArgs {
    /// Findings log to copy (defaults to the configured findings log).
    #[arg(value_name = "FINDINGS")]
    findings: Option<PathBuf>,

    /// Corrected log to create (defaults to the configured corrected log).
    #[arg(long, short, value_name = "CORRECTED")]
    output: Option<PathBuf>,

    /// Replace an existing corrected log.
    #[arg(long)]
    force: bool,
}

#[derive(Args)]
struct FixArgs {
    #[arg(value_name = "FINDINGS")]
    findings: PathBuf,
    #[arg(value_name = "CORRECTED")]
    corrected: PathBuf,
    #[arg(value_name = "TARGET")]
    target: PathBuf,
}

#[derive(Args)]
struct RunArgs {
    #[arg(value_name = "DOCUMENT")]
    document: PathBuf,

    /// Edited corrections, one per finding in findings order.
    #[arg(long, value_name = "FILE")]
    corrected: PathBuf,
}

#[derive(Args)]
struct ExportArgs {
    #[arg(value_name = "LOG")]
    log: PathBuf,

    /// Output file (defaults to the log path with an .epub extension). An
    /// .xhtml or .html path writes a single XHTML page instead.
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    author: Option<String>,

    /// Language tag for the document, e.g. `ko` or `en`.
    #[arg(long)]
    language: Option<String>,

    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    lines_per_page: Option<u32>,
}

#[derive(Subcommand)]
enum SubstitutionsCommand {
    /// Print every rule in application order.
    List,
    /// Add a rule or change its replacement.
    Set {
        #[arg(value_name = "OLD")]
        pattern: String,
        #[arg(value_name = "NEW")]
        replacement: String,
    },
    /// Delete a rule.
    Remove {
        #[arg(value_name = "OLD")]
        pattern: String,
    },
}

/// Workspace root plus its loaded configuration.
struct Session {
    root: PathBuf,
    config: ProofingConfig,
}

impl Session {
    fn open(workspace: Option<PathBuf>, strict_count: bool) -> Result<Self> {
        let root = resolve_workspace(workspace)?;
        let mut config = ProofingConfig::load_from_workspace(&root)
            .with_context(|| format!("load configuration for workspace {}", root.display()))?;
        if strict_count {
            config.mismatch = MismatchPolicy::Strict;
        }
        debug!(workspace = %root.display(), mismatch = ?config.mismatch, "workspace opened");
        Ok(Self { root, config })
    }

    fn options(&self) -> PipelineOptions {
        self.config.pipeline_options(&self.root)
    }

    fn substitutions_path(&self) -> PathBuf {
        self.config.resolve(&self.root).substitutions
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli {
        workspace,
        strict_count,
        trace_log,
        verbose,
        command,
    } = Cli::parse();
    logging::init(verbose, trace_log.as_deref())?;

    let session = Session::open(workspace, strict_count)?;
    match command {
        Commands::Scan(args) => execute_scan(args, &session),
        Commands::Draft(args) => execute_draft(args, &session),
        Commands::Fix(args) => execute_fix(args, &session),
        Commands::Run(args) => execute_run(args, &session),
        Commands::Export(args) => execute_export(args, &session),
        Commands::Substitutions(subcommand) => execute_substitutions(subcommand, &session),
    }
}

fn execute_scan(args: ScanArgs, session: &Session) -> Result<()> {
    let document = resolve_input_path(&args.document)?;
    let findings_log = match args.log_file {
        Some(path) => resolve_input_path(&path)?,
        None => session.options().findings_log,
    };
    let substitutions = SubstitutionsStore::load(session.substitutions_path()).into_table();

    let report = scan(&document, &substitutions, &findings_log)
        .with_context(|| format!("scan {}", document.display()))?;
    if report.document_rewritten {
        println!(
            "Applied {} configured substitution(s) to {}",
            report.substitutions_fired,
            document.display()
        );
    }
    if report.found_any() {
        println!(
            "Found {} line(s) with Japanese or Chinese characters; saved to {}",
            report.findings.len(),
            findings_log.display()
        );
    } else {
        println!("No Japanese or Chinese characters were found in the document.");
    }
    Ok(())
}

fn execute_draft(args: DraftArgs, session: &Session) -> Result<()> {
    let options = session.options();
    let findings_log = match args.findings {
        Some(path) => resolve_input_path(&path)?,
        None => options.findings_log,
    };
    let output = match args.output {
        Some(path) => resolve_input_path(&path)?,
        None => options.corrected_log,
    };
    if output.exists() && !args.force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            output.display()
        );
    }

    let findings = read_lines(&findings_log);
    if findings.is_empty() {
        bail!(
            "no findings to draft from {}; run `scan` first",
            findings_log.display()
        );
    }
    write_lines(&output, &findings).with_context(|| format!("write {}", output.display()))?;
    println!(
        "Wrote {} draft correction(s) to {}; edit each line in place without reordering",
        findings.len(),
        output.display()
    );
    Ok(())
}

fn execute_fix(args: FixArgs, session: &Session) -> Result<()> {
    let findings = resolve_input_path(&args.findings)?;
    let corrected = resolve_input_path(&args.corrected)?;
    let target = resolve_input_path(&args.target)?;

    let map = build_map(&findings, &corrected, session.config.mismatch)
        .context("build replacement map from logs")?;
    let report = apply(&target, &map).with_context(|| format!("patch {}", target.display()))?;
    print_apply_status(report.changed, report.applied_count);
    Ok(())
}

fn execute_run(args: RunArgs, session: &Session) -> Result<()> {
    let document = resolve_input_path(&args.document)?;
    let corrected = resolve_input_path(&args.corrected)?;
    let substitutions = SubstitutionsStore::load(session.substitutions_path()).into_table();

    let pipeline = ProofingPipeline::new(session.options(), substitutions);
    let report = pipeline
        .run(&document, &mut CorrectedLogFile::new(corrected))
        .with_context(|| format!("proof {}", document.display()))?;

    println!(
        "Found {} line(s) with Japanese or Chinese characters",
        report.scan.findings.len()
    );
    match report.apply {
        Some(applied) => print_apply_status(applied.changed, applied.applied_count),
        None => println!("No Japanese or Chinese characters were found in the document."),
    }
    Ok(())
}

fn execute_export(args: ExportArgs, session: &Session) -> Result<()> {
    let log = resolve_input_path(&args.log)?;
    let output = args
        .output
        .as_deref()
        .map(resolve_input_path)
        .transpose()?;

    let defaults = &session.config.export;
    let options = ExportOptions {
        title: args.title.unwrap_or_else(|| defaults.title.clone()),
        author: args.author.unwrap_or_else(|| defaults.author.clone()),
        language: args.language.unwrap_or_else(|| defaults.language.clone()),
        lines_per_page: args
            .lines_per_page
            .map(|n| n as usize)
            .unwrap_or(defaults.lines_per_page),
        header: defaults.header.clone(),
        footer: defaults.footer.clone(),
    };

    let report = export_log(&log, output.as_deref(), &options)
        .with_context(|| format!("export {}", log.display()))?;
    println!(
        "Exported {} line(s) on {} page(s) to {}",
        report.lines,
        report.pages,
        report.output.display()
    );
    Ok(())
}

fn execute_substitutions(command: SubstitutionsCommand, session: &Session) -> Result<()> {
    let path = session.substitutions_path();
    match command {
        SubstitutionsCommand::List => {
            let store = SubstitutionsStore::try_load(&path)
                .with_context(|| format!("load substitutions from {}", path.display()))?;
            if store.table().is_empty() {
                println!("No substitutions configured.");
                return Ok(());
            }
            for rule in store.table() {
                println!("{}\t{}", rule.pattern, rule.replacement);
            }
        }
        SubstitutionsCommand::Set {
            pattern,
            replacement,
        } => {
            let mut store = SubstitutionsStore::try_load(&path)
                .with_context(|| format!("load substitutions from {}", path.display()))?;
            let previous = store
                .set(pattern.clone(), replacement.clone())
                .context("save substitutions")?;
            match previous {
                Some(old) => println!("Updated '{pattern}': '{old}' -> '{replacement}'"),
                None => println!("Added '{pattern}' -> '{replacement}'"),
            }
        }
        SubstitutionsCommand::Remove { pattern } => {
            let mut store = SubstitutionsStore::try_load(&path)
                .with_context(|| format!("load substitutions from {}", path.display()))?;
            if !store.remove(&pattern).context("save substitutions")? {
                bail!("no substitution configured for '{pattern}'");
            }
            println!("Removed '{pattern}'");
        }
    }
    Ok(())
}

fn print_apply_status(changed: bool, applied_count: usize) {
    if changed {
        println!("File modification successful. {applied_count} replacements were made.");
    } else {
        println!("No changes were made. The file content might already be up to date.");
    }
}

fn resolve_workspace(workspace: Option<PathBuf>) -> Result<PathBuf> {
    match workspace {
        Some(path) => resolve_input_path(&path),
        None => std::env::current_dir().context("determine current directory"),
    }
}

fn resolve_input_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .context("determine current directory")?
            .join(path))
    }
}
