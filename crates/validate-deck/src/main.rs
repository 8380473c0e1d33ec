use anyhow::{Context, Result};
use clap::Parser;
use simdeck_db::{Deck, DeckContext, IngestOptions, IngestSource, ValidateOptions};
use simdeck_schema::SchemaRegistry;
use std::fs;
use std::path::PathBuf;
use std::process;

/// Validate a simulation input deck against a generated schema
#[derive(Parser, Debug)]
#[command(name = "validate-deck")]
#[command(about = "Validate simulation input decks against schemas", long_about = None)]
struct Args {
    /// Path to the YAML deck to validate
    #[arg(long, value_name = "FILE")]
    input: PathBuf,

    /// Path to the generated schema JSON
    #[arg(long, value_name = "FILE")]
    schema: PathBuf,

    /// Node type to use as the tree root
    #[arg(long, value_name = "TYPE", default_value = "Run")]
    root: String,

    /// Fail when a key resolves to no schema field instead of
    /// side-storing it
    #[arg(long)]
    strict: bool,

    /// Print a line for every active field, not just failing ones
    #[arg(long)]
    verbose: bool,

    /// Base directory for file-existence rules (defaults to the deck's
    /// directory)
    #[arg(long, value_name = "DIR")]
    working_directory: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let schema_content = fs::read_to_string(&args.schema)
        .with_context(|| format!("Failed to read schema file: {}", args.schema.display()))?;
    let registry = SchemaRegistry::from_json(&schema_content)
        .with_context(|| format!("Failed to load schema from {}", args.schema.display()))?;

    let working_directory = args
        .working_directory
        .clone()
        .or_else(|| args.input.parent().map(PathBuf::from));

    let mut ctx = DeckContext::new().with_strict(args.strict);
    if let Some(dir) = working_directory {
        ctx = ctx.with_working_directory(dir);
    }

    let mut deck = Deck::new(&registry, &args.root)
        .with_context(|| format!("Failed to build a `{}` tree", args.root))?;
    let root = deck.root();

    deck.ingest(
        root,
        IngestSource::YamlFile(&args.input),
        &IngestOptions {
            fail_on_undefined: args.strict,
        },
        &ctx,
    )
    .with_context(|| format!("Failed to ingest deck {}", args.input.display()))?;

    let report = simdeck_db::validate::validate(
        &deck,
        root,
        &ValidateOptions {
            verbose: args.verbose,
        },
        &ctx,
    );

    if !report.lines().is_empty() {
        println!("{}", report.rendered());
    }

    if report.is_valid() {
        println!("✓ Validation successful");
        println!("  Input: {}", args.input.display());
        println!("  Schema: {}", args.schema.display());
        Ok(())
    } else {
        eprintln!(
            "✗ Validation failed with {} error{}",
            report.error_count,
            if report.error_count == 1 { "" } else { "s" }
        );
        process::exit(1);
    }
}
