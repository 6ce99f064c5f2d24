// Copyright 2026 The Stratloop Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

#![forbid(unsafe_code)]

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use stratloop_engine::schema::{SchemaKind, generate_schema_json};
use stratloop_engine::{
    ARCHETYPE_NAMES, AnalysisConfig, Archetype, CldDocument, PatchOp, Tier, analyze, apply_patch,
};

mod report;

#[derive(Parser)]
#[command(
    name = "stratloop",
    version,
    about = "Analyze causal loop diagrams built from SWOT entries"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Impact {
    Low,
    Medium,
    High,
}

impl From<Impact> for Tier {
    fn from(impact: Impact) -> Tier {
        match impact {
            Impact::Low => Tier::Low,
            Impact::Medium => Tier::Medium,
            Impact::High => Tier::High,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis: loops, leverage points and strategic options
    Analyze {
        /// Document JSON, or - for stdin
        path: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Override the minimum reported leverage impact
        #[arg(long, value_enum)]
        min_impact: Option<Impact>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the feedback loops in a document
    Loops {
        path: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the available system archetypes
    Archetypes {
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Add a system archetype to a document
    Instantiate {
        /// Archetype name, e.g. fixes_that_fail
        name: String,
        /// Id prefix for the new nodes and links
        #[arg(long)]
        prefix: String,
        /// Existing document to extend; a new document is created otherwise
        #[arg(long)]
        doc: Option<PathBuf>,
        /// Archetype variable, e.g. --set symptom="Low Cash"
        #[arg(long = "set", value_name = "KEY=VALUE")]
        vars: Vec<String>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Apply a JSON list of patch operations to a document
    Patch {
        path: PathBuf,
        #[arg(long)]
        ops: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print a JSON Schema
    Schema {
        /// One of: document, config, analysis, archetype, patch
        #[arg(default_value = "document")]
        kind: String,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "stratloop_engine=debug,stratloop=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut contents = String::new();
        io::stdin()
            .read_to_string(&mut contents)
            .context("reading stdin")?;
        return Ok(contents);
    }
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn write_output(output: Option<&Path>, contents: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(contents.as_bytes())?;
            if !contents.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            Ok(())
        }
    }
}

fn load_document(path: &Path) -> Result<CldDocument> {
    let contents = read_input(path)?;
    CldDocument::from_json(&contents).with_context(|| format!("loading {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    let Some(path) = path else {
        return Ok(AnalysisConfig::default());
    };
    let contents = read_input(path)?;
    AnalysisConfig::from_json(&contents).with_context(|| format!("loading {}", path.display()))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("serializing output")
}

/// Build an archetype from its name and `KEY=VALUE` variable assignments.
fn archetype_from_args(name: &str, vars: &[String]) -> Result<Archetype> {
    if !ARCHETYPE_NAMES.contains(&name) {
        bail!(
            "unknown archetype '{name}'; expected one of: {}",
            ARCHETYPE_NAMES.join(", ")
        );
    }
    let mut fields = serde_json::Map::new();
    fields.insert("type".to_owned(), name.into());
    for var in vars {
        let (key, value) = var
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{var}'"))?;
        fields.insert(key.trim().to_owned(), value.into());
    }
    let json = serde_json::Value::Object(fields).to_string();
    Ok(Archetype::from_json(&json)?)
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            path,
            config,
            format,
            min_impact,
            output,
        } => {
            let doc = load_document(&path)?;
            let mut config = load_config(config.as_deref())?;
            if let Some(min_impact) = min_impact {
                config.leverage.min_reported_impact = min_impact.into();
            }
            let analysis = analyze(&doc, &config);
            let contents = match format {
                Format::Text => report::render_analysis(&analysis),
                Format::Json => to_json(&analysis)?,
            };
            write_output(output.as_deref(), &contents)
        }
        Commands::Loops {
            path,
            config,
            format,
            output,
        } => {
            let doc = load_document(&path)?;
            let config = load_config(config.as_deref())?;
            let analysis = analyze(&doc, &config);
            let contents = match format {
                Format::Text => report::render_loops(&analysis),
                Format::Json => to_json(&analysis.loops)?,
            };
            write_output(output.as_deref(), &contents)
        }
        Commands::Archetypes { format } => {
            let archetypes = Archetype::all();
            let contents = match format {
                Format::Text => report::render_archetypes(&archetypes),
                Format::Json => to_json(&archetypes)?,
            };
            write_output(None, &contents)
        }
        Commands::Instantiate {
            name,
            prefix,
            doc,
            vars,
            output,
        } => {
            let archetype = archetype_from_args(&name, &vars)?;
            let mut document = match &doc {
                Some(path) => load_document(path)?,
                None => CldDocument::new(),
            };
            let ids = document
                .instantiate_archetype(&archetype, &prefix)
                .with_context(|| format!("instantiating {name}"))?;
            debug!(nodes = ?ids, "added archetype nodes");
            write_output(output.as_deref(), &to_json(&document)?)
        }
        Commands::Patch { path, ops, output } => {
            let mut document = load_document(&path)?;
            let ops_json = read_input(&ops)?;
            let ops: Vec<PatchOp> = serde_json::from_str(&ops_json)
                .with_context(|| format!("parsing {}", ops.display()))?;
            apply_patch(&mut document, &ops).context("applying patch")?;
            write_output(output.as_deref(), &to_json(&document)?)
        }
        Commands::Schema { kind } => {
            let schema_kind = SchemaKind::from_name(&kind)
                .ok_or_else(|| anyhow!("unknown schema '{kind}'"))?;
            write_output(None, &generate_schema_json(schema_kind)?)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli)
}
