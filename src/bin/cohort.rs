//! Cohort CLI - Command-line interface for Cohort Flux
//!
//! Commands:
//! - compute: Compute per-individual metrics from observation records
//! - validate: Validate observation records
//! - schema: Print input/output schema information

use clap::{Parser, Subcommand, ValueEnum};
use log::warn;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use cohort_flux::config::{MetricsConfig, NullCommunityPolicy};
use cohort_flux::encoder::{MetricsEncoder, REPORT_VERSION};
use cohort_flux::schema::{RecordAdapter, ValidationError, SCHEMA_VERSION};
use cohort_flux::types::METRIC_COLUMNS;
use cohort_flux::{ColumnMap, MetricsProcessor, COHORT_VERSION};

/// Cohort - Batch compute engine for group and community behavior metrics
#[derive(Parser)]
#[command(name = "cohort")]
#[command(author = "Synheart AI Inc")]
#[command(version = COHORT_VERSION)]
#[command(about = "Compute per-individual group and community metrics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute per-individual metrics (batch mode)
    Compute {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "report")]
        output_format: OutputFormat,

        /// Load run configuration from a JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Remap an input column, e.g. --column time=step
        #[arg(long = "column", value_name = "LOGICAL=PHYSICAL")]
        columns: Vec<String>,

        /// How community_size treats observations without a community color
        #[arg(long)]
        null_community: Option<PolicyArg>,

        /// Evaluate metric columns in parallel
        #[arg(long)]
        parallel: bool,
    },

    /// Validate observation records
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Remap an input column, e.g. --column time=step
        #[arg(long = "column", value_name = "LOGICAL=PHYSICAL")]
        columns: Vec<String>,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Full report with producer metadata (pretty-printed JSON)
    Report,
    /// Newline-delimited JSON (one individual per line)
    Ndjson,
    /// Pretty-printed JSON array of rows
    JsonPretty,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Leave the observation out of the average
    Skip,
    /// Count the observation as size 0
    Zero,
    /// Fail the run
    Reject,
}

impl From<PolicyArg> for NullCommunityPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Skip => NullCommunityPolicy::Skip,
            PolicyArg::Zero => NullCommunityPolicy::Zero,
            PolicyArg::Reject => NullCommunityPolicy::Reject,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (cohort.observation.v1)
    Input,
    /// Output schema (cohort.metrics.v1)
    Output,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CohortCliError> {
    match cli.command {
        Commands::Compute {
            input,
            output,
            input_format,
            output_format,
            config,
            columns,
            null_community,
            parallel,
        } => {
            let mut run_config = match config {
                Some(path) => MetricsConfig::from_json(&fs::read_to_string(path)?)?,
                None => MetricsConfig::default(),
            };
            apply_column_overrides(&mut run_config.columns, &columns)?;
            if let Some(policy) = null_community {
                run_config.null_community = policy.into();
            }
            run_config.parallel |= parallel;

            cmd_compute(&input, &output, input_format, output_format, run_config)
        }

        Commands::Validate {
            input,
            input_format,
            columns,
            json,
        } => {
            let mut column_map = ColumnMap::default();
            apply_column_overrides(&mut column_map, &columns)?;
            cmd_validate(&input, input_format, &column_map, json)
        }

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn cmd_compute(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    config: MetricsConfig,
) -> Result<(), CohortCliError> {
    let input_data = read_input(input)?;
    let output_data = compute_output(&input_data, &input_format, &output_format, config)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn compute_output(
    input_data: &str,
    input_format: &InputFormat,
    output_format: &OutputFormat,
    config: MetricsConfig,
) -> Result<String, CohortCliError> {
    let records = parse_records(input_data, input_format)?;
    if records.is_empty() {
        warn!("no records in input, writing an empty report");
    }

    let table = RecordAdapter::to_table(&records, &config.columns)?;
    let processor = MetricsProcessor::with_config(config);
    let metrics = processor.compute(&table)?;

    let output_data = match output_format {
        OutputFormat::Report => MetricsEncoder::new().encode_to_json(&metrics)?,
        OutputFormat::Ndjson => MetricsEncoder::encode_rows_ndjson(&metrics)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&metrics.rows)?,
    };
    Ok(output_data)
}

fn cmd_validate(
    input: &Path,
    input_format: InputFormat,
    columns: &ColumnMap,
    json: bool,
) -> Result<(), CohortCliError> {
    let input_data = read_input(input)?;
    let records = parse_records(&input_data, &input_format)?;

    let results = RecordAdapter::validate_records(&records, columns);

    let report = ValidationReport {
        total_records: records.len(),
        valid_records: records.len() - results.len(),
        invalid_records: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                individual: r.individual.clone(),
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Valid records:   {}", report.valid_records);
        println!("Invalid records: {}", report.invalid_records);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - Record {} (individual {}): {}",
                    err.index,
                    err.individual.as_deref().unwrap_or("unknown"),
                    err.error
                );
            }
        }
    }

    if report.invalid_records > 0 {
        Err(CohortCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), CohortCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: {}", SCHEMA_VERSION);
                println!();
                println!("One flat record per (individual, time) observation:");
                println!();
                println!("- time:       time step (string or integer, required)");
                println!("- group:      occupied group (nullable)");
                println!("- individual: tracked individual (string or integer, required)");
                println!("- gcolor:     dominant community color of the group (nullable)");
                println!("- icolor:     the individual's own community color (nullable)");
                println!();
                println!("Column names can be remapped with --column logical=physical.");
                println!("Each individual's records must appear in chronological order.");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: {}", REPORT_VERSION);
                println!();
                println!("- report_version, producer {{ name, version, instance_id }}");
                println!("- computed_at_utc");
                println!("- summary: {{ observations, individuals, time_steps, subgroups }}");
                println!("- rows: one per individual, first-appearance order, columns:");
                for column in METRIC_COLUMNS {
                    println!("  - {}", column);
                }
            }
        }
    }

    Ok(())
}

// Helper functions

fn read_input(input: &Path) -> Result<String, CohortCliError> {
    if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            return Err(CohortCliError::InteractiveStdin);
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn parse_records(
    input_data: &str,
    input_format: &InputFormat,
) -> Result<Vec<serde_json::Value>, CohortCliError> {
    let records = match input_format {
        InputFormat::Ndjson => RecordAdapter::parse_ndjson(input_data)?,
        InputFormat::Json => RecordAdapter::parse_array(input_data)?,
    };
    Ok(records)
}

fn apply_column_overrides(columns: &mut ColumnMap, overrides: &[String]) -> Result<(), CohortCliError> {
    for spec in overrides {
        columns.apply_override(spec)?;
    }
    Ok(())
}

fn get_input_json_schema() -> String {
    let nullable_label = serde_json::json!({ "type": ["string", "integer", "null"] });
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://synheart.ai/schemas/cohort.observation.v1.json",
        "title": SCHEMA_VERSION,
        "description": "One observation of an individual at a time step",
        "type": "object",
        "required": ["time", "individual"],
        "properties": {
            "time": { "type": ["string", "integer"] },
            "group": nullable_label,
            "individual": { "type": ["string", "integer"] },
            "gcolor": nullable_label,
            "icolor": nullable_label
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    let row_properties: serde_json::Map<String, serde_json::Value> = METRIC_COLUMNS
        .iter()
        .map(|column| {
            let schema = match *column {
                "individual" => serde_json::json!({ "type": ["string", "integer"] }),
                "cyclicity" => serde_json::json!({ "type": "integer", "minimum": 0 }),
                _ => serde_json::json!({ "type": "number" }),
            };
            (column.to_string(), schema)
        })
        .collect();

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://synheart.ai/schemas/cohort.metrics.v1.json",
        "title": REPORT_VERSION,
        "description": "Per-individual group and community metrics",
        "type": "object",
        "required": ["report_version", "producer", "computed_at_utc", "summary", "columns", "rows"],
        "properties": {
            "report_version": { "type": "string" },
            "producer": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" },
                    "instance_id": { "type": "string" }
                }
            },
            "computed_at_utc": { "type": "string", "format": "date-time" },
            "summary": {
                "type": "object",
                "properties": {
                    "observations": { "type": "integer" },
                    "individuals": { "type": "integer" },
                    "time_steps": { "type": "integer" },
                    "subgroups": { "type": "integer" }
                }
            },
            "columns": { "type": "array", "items": { "type": "string" } },
            "rows": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": METRIC_COLUMNS,
                    "properties": row_properties
                }
            }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum CohortCliError {
    Io(io::Error),
    Compute(cohort_flux::ComputeError),
    Json(serde_json::Error),
    Validation(ValidationError),
    ValidationFailed(usize),
    InteractiveStdin,
}

impl From<io::Error> for CohortCliError {
    fn from(e: io::Error) -> Self {
        CohortCliError::Io(e)
    }
}

impl From<cohort_flux::ComputeError> for CohortCliError {
    fn from(e: cohort_flux::ComputeError) -> Self {
        match e {
            cohort_flux::ComputeError::InvalidRecord { source, .. } => {
                CohortCliError::Validation(source)
            }
            other => CohortCliError::Compute(other),
        }
    }
}

impl From<serde_json::Error> for CohortCliError {
    fn from(e: serde_json::Error) -> Self {
        CohortCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<CohortCliError> for CliError {
    fn from(e: CohortCliError) -> Self {
        match e {
            CohortCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            CohortCliError::Compute(e) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the run configuration and the input records".to_string()),
            },
            CohortCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            CohortCliError::Validation(e) => CliError {
                code: "VALIDATION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'cohort validate' for details".to_string()),
            },
            CohortCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            CohortCliError::InteractiveStdin => CliError {
                code: "NO_INPUT".to_string(),
                message: "stdin is a terminal, expected piped records".to_string(),
                hint: Some("Pipe records into the command or pass --input <file>".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    individual: Option<String>,
    error: String,
}
