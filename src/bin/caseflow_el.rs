//! Command-line interface for the caseflow expression engine
//!
//! Evaluates, parses and rewrites `${...}` / `#{...}` templates.

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use caseflow_el::model::{JsonNode, MapVariableContainer};
use caseflow_el::{ElValue, EngineConfig, ExpressionManager};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value as JsonValue;

#[derive(Parser)]
#[command(name = "caseflow-el")]
#[command(about = "Evaluate workflow EL expressions against a variable scope")]
#[command(version)]
#[command(author = "OctoFHIR Team <funyloony@gmail.com>")]
struct Cli {
    /// Read engine configuration from a JSON file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a template against variables given as a JSON object
    Evaluate {
        /// Template to evaluate, e.g. "${amount > 100}"
        expression: String,
        /// JSON file holding the variables (reads stdin when piped)
        #[arg(short, long)]
        vars: Option<String>,
        /// Principal the evaluation runs for
        #[arg(short, long)]
        principal: Option<String>,
        /// Keep variables as JSON nodes instead of lists and maps
        #[arg(long)]
        json_nodes: bool,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Parse a template and print its canonical form
    Parse {
        /// Template to parse
        expression: String,
        /// Print the syntax tree as well
        #[arg(long)]
        tree: bool,
    },
    /// Print a template after shorthand rewriting
    Rewrite {
        /// Template to rewrite
        expression: String,
    },
}

fn main() {
    human_panic::setup_panic!();
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{} {e:#}", "✗".red().bold());
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading configuration '{path}'"))?;
            EngineConfig::from_json_str(&text)?
        }
        None => EngineConfig::from_env()?,
    };
    let manager = ExpressionManager::with_config(config);

    match cli.command {
        Commands::Evaluate {
            expression,
            vars,
            principal,
            json_nodes,
            pretty,
        } => {
            let variables = read_variables(vars.as_deref())?;
            let scope = build_scope(variables, json_nodes)?;
            let result = manager.evaluate_with(
                &expression,
                ElValue::Container(Arc::new(scope)),
                principal.as_deref(),
            )?;
            let json = result.to_json();
            let output = if pretty {
                serde_json::to_string_pretty(&json)?
            } else {
                serde_json::to_string(&json)?
            };
            println!("{output}");
        }
        Commands::Parse { expression, tree } => {
            let template = manager.parse(&expression)?;
            println!("{} {template}", "✓".green().bold());
            if tree {
                println!("{template:#?}");
            }
        }
        Commands::Rewrite { expression } => {
            println!("{}", manager.enhance(&expression));
        }
    }
    Ok(())
}

fn read_variables(path: Option<&str>) -> Result<Option<JsonValue>> {
    let text = match path {
        Some("-") | None if !io::stdin().is_terminal() => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("reading variables from stdin")?;
            buffer
        }
        Some(path) if path != "-" => {
            fs::read_to_string(path).with_context(|| format!("reading variables '{path}'"))?
        }
        _ => return Ok(None),
    };
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&text).context("parsing variables")?))
}

fn build_scope(variables: Option<JsonValue>, json_nodes: bool) -> Result<MapVariableContainer> {
    let mut scope = MapVariableContainer::new();
    let Some(variables) = variables else {
        return Ok(scope);
    };
    let JsonValue::Object(entries) = variables else {
        bail!("variables must be a JSON object");
    };
    for (name, value) in &entries {
        let value = if json_nodes {
            ElValue::Json(JsonNode::from_serde(value))
        } else {
            ElValue::from_json(value)
        };
        scope = scope.with_variable(name.clone(), value);
    }
    Ok(scope)
}
