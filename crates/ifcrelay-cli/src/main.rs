//! ifcrelay CLI - IFC file validation and inspection
//!
//! Runs the same checks the conversion relay applies before handing an IFC
//! file to a converter plugin.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ifcrelay_step::{
    format_json, format_report, Entity, EntityGraph, ParamValue, Stats, Validator,
    ValidatorConfig,
};
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ifcrelay")]
#[command(about = "Validate and inspect IFC files", long_about = None)]
struct Cli {
    /// Enable debug logging (otherwise RUST_LOG applies)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an IFC file and print a report
    Validate {
        /// Input IFC file
        file: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Validator configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Accept files without the .ifc extension
        #[arg(long)]
        any_extension: bool,
    },
    /// Show entities of an IFC file
    Inspect {
        /// Input IFC file
        file: PathBuf,
        /// Show one entity and resolve its references
        #[arg(long, conflicts_with = "type_name")]
        id: Option<u64>,
        /// List every entity of a type (e.g. IFCWALL)
        #[arg(long = "type")]
        type_name: Option<String>,
        /// Validator configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    exit_code(run(cli))
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Validate {
            file,
            format,
            config,
            any_extension,
        } => validate_file(&file, format, config.as_deref(), any_extension),
        Commands::Inspect {
            file,
            id,
            type_name,
            config,
        } => {
            inspect_file(&file, id, type_name.as_deref(), config.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// 0 valid, 1 invalid, 2 when the file could not be checked at all.
fn exit_code(outcome: Result<ExitCode>) -> ExitCode {
    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_validator(config: Option<&Path>) -> Result<Validator> {
    let config = match config {
        Some(path) => ValidatorConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ValidatorConfig::default(),
    };
    debug!(?config, "validator configuration");
    Ok(Validator::new(config)?)
}

/// Reject paths the relay would not accept as IFC input.
fn check_input_path(path: &Path, any_extension: bool) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("File does not exist: {}", path.display());
    }
    if !path.is_file() {
        anyhow::bail!("Not a file: {}", path.display());
    }
    let is_ifc = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ifc"));
    if !is_ifc && !any_extension {
        anyhow::bail!(
            "Invalid file format: {} (only .ifc files are accepted, use --any-extension to override)",
            path.display()
        );
    }
    Ok(())
}

fn read_input(path: &Path, any_extension: bool) -> Result<String> {
    check_input_path(path, any_extension)?;
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    info!(file = %path.display(), bytes = bytes.len(), "read input");
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn validate_file(
    file: &Path,
    format: OutputFormat,
    config: Option<&Path>,
    any_extension: bool,
) -> Result<ExitCode> {
    let validator = load_validator(config)?;
    let content = read_input(file, any_extension)?;
    let result = validator.validate(&content);

    match format {
        OutputFormat::Text => print!("{}", format_report(&result)),
        OutputFormat::Json => println!("{}", format_json(&result)?),
    }

    Ok(if result.is_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn inspect_file(
    file: &Path,
    id: Option<u64>,
    type_name: Option<&str>,
    config: Option<&Path>,
) -> Result<()> {
    let validator = load_validator(config)?;
    let content = read_input(file, true)?;
    let parsed = validator.parse(&content)?;
    let graph = &parsed.graph;

    for warning in &parsed.warnings {
        eprintln!("warning: {warning}");
    }

    if let Some(id) = id {
        let entity = graph
            .get(id)
            .ok_or_else(|| anyhow::anyhow!("Entity #{} not found", id))?;
        print!("{}", describe_entity(graph, entity));
    } else if let Some(type_name) = type_name {
        let type_name = type_name.to_uppercase();
        print!("{}", list_entities(graph, &type_name));
    } else {
        println!("IFC file: {}", file.display());
        print!("{}", summarize(&Stats::collect(graph)));
    }

    Ok(())
}

fn describe_entity(graph: &EntityGraph, entity: &Entity) -> String {
    let mut out = String::new();
    writeln!(
        out,
        "#{} = {} (line {})",
        entity.id, entity.type_name, entity.line
    )
    .unwrap();
    for (i, param) in entity.params.iter().enumerate() {
        let value = match param {
            ParamValue::Reference(target) => match graph.resolve(param) {
                Some(e) => format!("#{target} -> {} (line {})", e.type_name, e.line),
                None => format!("#{target} -> broken"),
            },
            ParamValue::Number(v) => v.to_string(),
            ParamValue::String(s) => s.clone(),
            ParamValue::Null => "$".to_string(),
        };
        writeln!(out, "  [{i}] {value}").unwrap();
    }
    out
}

fn list_entities(graph: &EntityGraph, type_name: &str) -> String {
    let mut out = String::new();
    let mut count = 0;
    for entity in graph.entities_of_type(type_name) {
        writeln!(out, "{:>6}  {}", entity.line, entity.source).unwrap();
        count += 1;
    }
    writeln!(out, "{count} {type_name} entit{}", if count == 1 { "y" } else { "ies" }).unwrap();
    out
}

fn summarize(stats: &Stats) -> String {
    let mut out = String::new();
    writeln!(out, "  Entities: {}", stats.total_entities).unwrap();
    writeln!(out, "  Entity types: {}", stats.entity_types).unwrap();

    let mut counts: Vec<(&String, &usize)> = stats.entity_counts.iter().collect();
    counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    if !counts.is_empty() {
        writeln!(out, "\nTypes:").unwrap();
        for (type_name, count) in counts {
            writeln!(out, "  {count:>6}  {type_name}").unwrap();
        }
    }
    out
}
