//! Command-line interface for relshape.
//!
//! # Usage
//!
//! ```bash
//! # Check a schema document
//! relshape check schema.json
//!
//! # Print the relation graph
//! relshape graph schema.json --max-depth 2
//!
//! # Print the ORM query for a spec
//! relshape compile schema.json --entity user --spec '{"fields":["id"],"relations":{"posts":true}}'
//!
//! # Reshape a raw ORM result
//! relshape parse schema.json --entity user --spec '{}' --input result.json
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use relshape_core::{DiagnosticBag, DiagnosticSeverity};
use relshape_query::{QueryExecutor, QueryRegistry, QuerySpec, RegistryConfig, SafeParseResult};
use relshape_schema::{check, extract_relation_graph, GraphConfig, SchemaDocument, DEFAULT_MAX_DEPTH};
use serde_json::Value;
use std::path::{Path, PathBuf};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(name = "relshape")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a schema document for errors
    Check {
        schema: PathBuf,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// Print the relation graph extracted from a schema
    Graph {
        schema: PathBuf,

        /// Only print this entity
        #[arg(short, long)]
        entity: Option<String>,

        /// Maximum relation nesting depth
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// Print the compiled ORM query for a query spec
    Compile {
        schema: PathBuf,

        /// Root entity
        #[arg(short, long)]
        entity: String,

        /// Query spec as JSON
        #[arg(short, long, default_value = "{}")]
        spec: String,

        /// Maximum relation nesting depth
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// Reshape and validate a raw ORM result
    Parse {
        schema: PathBuf,

        /// Root entity
        #[arg(short, long)]
        entity: String,

        /// Query spec as JSON
        #[arg(short, long, default_value = "{}")]
        spec: String,

        /// Raw result file, `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Treat the input as a list of results
        #[arg(long)]
        array: bool,

        /// Maximum relation nesting depth
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// Print version information
    Version,
}

/// Runs a parsed command and returns the process exit code.
pub fn run(cli: Cli) -> CliResult<i32> {
    match cli.command {
        Commands::Check { schema, strict } => check_schema(&schema, strict, cli.quiet),
        Commands::Graph {
            schema,
            entity,
            max_depth,
        } => print_graph(&schema, entity.as_deref(), max_depth),
        Commands::Compile {
            schema,
            entity,
            spec,
            max_depth,
        } => {
            let executor = build_query(&schema, &entity, &spec, max_depth)?;
            print_json(&executor.compiled_query().to_json())?;
            Ok(0)
        }
        Commands::Parse {
            schema,
            entity,
            spec,
            input,
            array,
            max_depth,
        } => {
            let executor = build_query(&schema, &entity, &spec, max_depth)?;
            let raw: Value = serde_json::from_str(&read_input(&input)?)?;
            let result = parse_raw(&executor, &raw, array);
            print_json(&serde_json::to_value(&result)?)?;
            Ok(i32::from(!result.is_success()))
        }
        Commands::Version => {
            println!("relshape {}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
    }
}

fn check_schema(path: &Path, strict: bool, quiet: bool) -> CliResult<i32> {
    let schema = SchemaDocument::load(path)?;
    let diagnostics = check(&schema);
    report(&diagnostics);

    let problems = if strict {
        diagnostics.len()
    } else {
        diagnostics.error_count()
    };
    if problems > 0 {
        eprintln!(
            "{} {} problem(s) in {}",
            "Error:".red().bold(),
            problems,
            path.display()
        );
        return Ok(1);
    }
    if !quiet {
        println!(
            "{} {} model(s) checked",
            "Success:".green().bold(),
            schema.models.len()
        );
    }
    Ok(0)
}

fn report(diagnostics: &DiagnosticBag) {
    for diagnostic in diagnostics.iter() {
        let label = match diagnostic.severity {
            DiagnosticSeverity::Error => "error".red().bold(),
            DiagnosticSeverity::Warning => "warning".yellow().bold(),
        };
        eprintln!(
            "{}[{}] {} {}",
            label,
            diagnostic.code,
            diagnostic.location.to_string().blue(),
            diagnostic.title
        );
        if let Some(message) = &diagnostic.message {
            eprintln!("      {message}");
        }
    }
}

fn print_graph(path: &Path, entity: Option<&str>, max_depth: usize) -> CliResult<i32> {
    let schema = SchemaDocument::load(path)?.validated()?;
    let graph = extract_relation_graph(&schema, &GraphConfig::new().with_max_depth(max_depth));

    let value = match entity {
        Some(entity) => match graph.relations(entity) {
            Some(relations) => serde_json::to_value(relations)?,
            None => {
                eprintln!("{} unknown entity `{entity}`", "Error:".red().bold());
                return Ok(1);
            }
        },
        None => serde_json::to_value(&graph)?,
    };
    print_json(&value)?;
    Ok(0)
}

/// Loads a schema and builds an executor for `entity` and the JSON `spec`.
pub fn build_query(
    schema: &Path,
    entity: &str,
    spec: &str,
    max_depth: usize,
) -> CliResult<QueryExecutor> {
    let schema = SchemaDocument::load(schema)?.validated()?;
    let spec: QuerySpec = serde_json::from_str(spec)?;
    let config = RegistryConfig::from_schema(&schema, &GraphConfig::new().with_max_depth(max_depth))?;

    tracing::debug!(entity, max_depth, "relshape.cli.query");
    let registry = QueryRegistry::new(config);
    Ok(registry.create_query(entity)?.build(spec))
}

/// Reshapes one result, or a list of results when `array` is set.
#[must_use]
pub fn parse_raw(executor: &QueryExecutor, raw: &Value, array: bool) -> SafeParseResult<Value> {
    if array {
        executor.array().safe_parse(raw).map(Value::Array)
    } else {
        executor.safe_parse(raw)
    }
}

fn read_input(path: &Path) -> CliResult<String> {
    if path == Path::new("-") {
        Ok(std::io::read_to_string(std::io::stdin())?)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

fn print_json(value: &Value) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn blog() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../relshape_schema/tests/fixtures/blog.json")
    }

    #[test]
    fn test_parse_args() {
        let cli = Cli::try_parse_from([
            "relshape",
            "parse",
            "schema.json",
            "--entity",
            "user",
            "--input",
            "rows.json",
            "--array",
        ])
        .unwrap();

        match cli.command {
            Commands::Parse {
                entity,
                spec,
                array,
                max_depth,
                ..
            } => {
                assert_eq!(entity, "user");
                assert_eq!(spec, "{}");
                assert!(array);
                assert_eq!(max_depth, DEFAULT_MAX_DEPTH);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_compile_requires_entity() {
        assert!(Cli::try_parse_from(["relshape", "compile", "schema.json"]).is_err());
    }

    #[test]
    fn test_build_query() {
        let executor = build_query(
            &blog(),
            "user",
            r#"{"fields":["id"],"relations":{"posts":true}}"#,
            DEFAULT_MAX_DEPTH,
        )
        .unwrap();
        assert_eq!(
            executor.compiled_query().to_json(),
            json!({ "select": { "id": true, "posts": true } })
        );
    }

    #[test]
    fn test_build_query_unknown_entity() {
        assert!(build_query(&blog(), "invoice", "{}", DEFAULT_MAX_DEPTH).is_err());
    }

    #[test]
    fn test_parse_raw_array() {
        let executor = build_query(&blog(), "post", r#"{"fields":["id"]}"#, 1).unwrap();

        let ok = parse_raw(&executor, &json!([{ "id": "p1" }, { "id": "p2" }]), true);
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({ "success": true, "data": [{ "id": "p1" }, { "id": "p2" }] })
        );

        let failed = parse_raw(&executor, &json!([{ "id": "p1" }, null]), true);
        assert!(!failed.is_success());
        assert_eq!(failed.error().unwrap().path().unwrap().to_string(), "[1]");
    }
}
