use clap::{Parser, Subcommand, ValueEnum};
use fhir_conformance::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fhir-conformance")]
#[command(about = "Check FHIR JSON documents for structural conformance")]
#[command(version)]
struct Cli {
    /// Type descriptor file (JSON array); defaults to the bundled R4 core types
    #[arg(short, long, global = true)]
    schema: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one or more JSON documents
    Validate {
        /// Documents to validate
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Validate as this type instead of the document's resourceType
        #[arg(short = 't', long = "type")]
        type_name: Option<String>,
        /// Stop at the first violation in each document
        #[arg(long)]
        fail_fast: bool,
        /// Report fields the type does not declare
        #[arg(long)]
        reject_unknown: bool,
        /// Maximum nesting depth
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List the registered types
    Types {
        /// Only list resource types
        #[arg(long)]
        resources: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

/// Returns whether every document conformed.
fn run(cli: Cli) -> Result<bool> {
    let loaded;
    let registry = match &cli.schema {
        Some(path) => {
            loaded = SchemaRegistry::load_from_path(path)?;
            &loaded
        }
        None => embedded::core_registry(),
    };

    match cli.command {
        Commands::Validate {
            files,
            type_name,
            fail_fast,
            reject_unknown,
            max_depth,
            format,
        } => {
            let mode = if fail_fast {
                ValidationMode::FailFast
            } else {
                ValidationMode::CollectAll
            };
            let config = ValidatorConfig::default()
                .with_mode(mode)
                .with_max_depth(max_depth)
                .with_reject_unknown_fields(reject_unknown);
            let validator = Validator::with_config(registry, config);

            let mut all_valid = true;
            for file in &files {
                let result = validate_file(&validator, file, type_name.as_deref())?;
                all_valid &= result.is_valid();
                print_result(file, &result, format)?;
            }
            Ok(all_valid)
        }
        Commands::Types { resources } => {
            let names = if resources {
                registry.resource_types()
            } else {
                registry.type_names()
            };
            for name in names {
                println!("{name}");
            }
            Ok(true)
        }
    }
}

fn validate_file(
    validator: &Validator<'_>,
    file: &Path,
    type_name: Option<&str>,
) -> Result<ValidationResult> {
    let content = std::fs::read_to_string(file)?;
    let document: serde_json::Value = serde_json::from_str(&content)?;
    validator.validate_json(&document, type_name)
}

fn print_result(file: &Path, result: &ValidationResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "file": file.display().to_string(),
                "result": result,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text if result.is_valid() => {
            println!("{}: ok", file.display());
        }
        OutputFormat::Text => {
            println!("{}: {} violation(s)", file.display(), result.len());
            for violation in &result.violations {
                println!("  {violation}");
            }
        }
    }
    Ok(())
}
