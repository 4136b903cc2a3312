//! urlkit - URL and query-string utilities for embedded scripts
//!
//! Runs scripts with the `url` module installed, or calls the same
//! operations directly from the command line.

use clap::{Parser, Subcommand};
use colored::Colorize;
use miette::{IntoDiagnostic, Result, miette};
use std::path::PathBuf;

use urlkit::cli::{Repl, ReplConfig};
use urlkit::query::{self, QueryValue};
use urlkit::record::{self, BuildOptions};
use urlkit::runtime::{Runtime, RuntimeConfig};

#[derive(Parser)]
#[command(name = "urlkit")]
#[command(author, version, about = "URL parsing, building and query strings for scripts")]
struct Cli {
    /// Script file to execute
    file: Option<PathBuf>,

    /// Evaluate code from command line
    #[arg(short, long)]
    eval: Option<String>,

    /// Global name of the url module inside scripts
    #[arg(long, default_value = "url")]
    module_name: String,

    /// Deepest nesting converted from script values
    #[arg(long, default_value_t = 64)]
    max_depth: usize,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a script file
    Run {
        /// Script file to run
        file: PathBuf,
    },
    /// Start an interactive REPL
    Repl,
    /// Run script code from stdin
    Stdin,
    /// Parse a URL and print its parts as JSON
    Parse {
        url: String,
    },
    /// Build a URL from its parts
    Build {
        #[arg(long)]
        scheme: Option<String>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        path: Option<String>,
        /// Raw, already-encoded query
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        fragment: Option<String>,
    },
    /// Encode a JSON object as a bracketed query string
    Query {
        /// e.g. '{"a": [1, 2], "b": {"c": "d"}}'
        json: String,
    },
    /// Resolve a reference against a base URL
    Resolve {
        base: String,
        reference: String,
    },
    /// Classify a string as ip, domain, host, url or unknown
    Type {
        input: String,
    },
    /// Percent-encode a string as a query component
    Encode {
        input: String,
    },
    /// Decode a query component (malformed input is printed unchanged)
    Decode {
        input: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = RuntimeConfig {
        module_name: cli.module_name,
        max_depth: cli.max_depth,
        ..Default::default()
    };

    match cli.command {
        Some(Commands::Run { file }) => run_file(&file, config)?,
        Some(Commands::Repl) => run_repl(config)?,
        Some(Commands::Stdin) => run_stdin(config)?,
        Some(Commands::Parse { url }) => {
            let parsed = record::parse(&url).into_diagnostic()?;
            let json = serde_json::to_string_pretty(&parsed).into_diagnostic()?;
            println!("{}", json);
        }
        Some(Commands::Build {
            scheme,
            user,
            password,
            host,
            path,
            query,
            fragment,
        }) => {
            let options = BuildOptions {
                scheme,
                username: user,
                password,
                host,
                path,
                raw_query: query,
                query: None,
                fragment,
            };
            println!("{}", record::build(&options));
        }
        Some(Commands::Query { json }) => {
            let value: serde_json::Value = serde_json::from_str(&json).into_diagnostic()?;
            let QueryValue::Map(entries) = QueryValue::from(value) else {
                return Err(miette!("expected a JSON object"));
            };
            println!("{}", query::encode(&entries));
        }
        Some(Commands::Resolve { base, reference }) => {
            let resolved = record::resolve(&base, &reference).into_diagnostic()?;
            println!("{}", resolved);
        }
        Some(Commands::Type { input }) => {
            println!("{}", urlkit::classify(&input));
        }
        Some(Commands::Encode { input }) => {
            println!("{}", query::escape(&input));
        }
        Some(Commands::Decode { input }) => {
            let decoded = query::unescape(&input).unwrap_or_else(|e| {
                log::warn!("{e}");
                input.clone()
            });
            println!("{}", decoded);
        }
        None => {
            if let Some(code) = cli.eval {
                eval_code(&code, config)?;
            } else if let Some(file) = cli.file {
                run_file(&file, config)?;
            } else {
                // No file or code provided, start REPL
                run_repl(config)?;
            }
        }
    }

    Ok(())
}

/// Start the interactive REPL
fn run_repl(config: RuntimeConfig) -> Result<()> {
    let mut repl = Repl::with_config(ReplConfig::default(), config).into_diagnostic()?;
    repl.run().into_diagnostic()?;
    Ok(())
}

/// Run code from stdin
fn run_stdin(config: RuntimeConfig) -> Result<()> {
    use std::io::Read;

    let mut code = String::new();
    std::io::stdin()
        .read_to_string(&mut code)
        .into_diagnostic()?;

    eval_code(&code, config)
}

/// Execute a script file
fn run_file(path: &PathBuf, config: RuntimeConfig) -> Result<()> {
    let mut runtime = Runtime::with_config(config).into_diagnostic()?;

    match runtime.run_file(path) {
        Ok(value) => {
            if !value.is_undefined() {
                let result = runtime.value_to_string(&value);
                println!("{}", result);
            }
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Evaluate code from the command line
fn eval_code(code: &str, config: RuntimeConfig) -> Result<()> {
    let mut runtime = Runtime::with_config(config).into_diagnostic()?;

    match runtime.eval(code, "eval.js") {
        Ok(value) => {
            if !value.is_undefined() {
                let result = runtime.value_to_string(&value);
                println!("{}", result);
            }
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            std::process::exit(1);
        }
    }

    Ok(())
}
