//! Script runtime powered by the Boa engine
//!
//! Hosts the `url` module inside a Boa context so scripts can call the
//! crate's URL and query-string functions.
//!
//! Features provided:
//! - Console API (console.log, console.error, etc.)
//! - The `url` module (parse, build, build_query_string, resolve, type,
//!   urlencode, urldecode)
//! - Promise/async-await job processing after each evaluation

use boa_engine::{Context, JsResult, JsValue, Source, context::ContextBuilder};
use boa_gc::{Finalize, Trace};
use boa_runtime::{ConsoleState, Logger, extensions::ConsoleExtension, register_extensions};
use std::path::Path;
use thiserror::Error;

mod marshal;
mod url;

pub use self::url::register_url_module;

/// Errors that can occur during runtime execution
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("JavaScript error: {0}")]
    JsError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Console logger that prints to stdout/stderr
#[derive(Debug, Clone, Default, Trace, Finalize)]
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, msg: String, _state: &ConsoleState, _context: &mut Context) -> JsResult<()> {
        println!("{}", msg);
        Ok(())
    }

    fn info(&self, msg: String, _state: &ConsoleState, _context: &mut Context) -> JsResult<()> {
        println!("[INFO] {}", msg);
        Ok(())
    }

    fn warn(&self, msg: String, _state: &ConsoleState, _context: &mut Context) -> JsResult<()> {
        eprintln!("[WARN] {}", msg);
        Ok(())
    }

    fn error(&self, msg: String, _state: &ConsoleState, _context: &mut Context) -> JsResult<()> {
        eprintln!("[ERROR] {}", msg);
        Ok(())
    }
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Global name the url module is registered under
    pub module_name: String,
    /// Deepest container nesting converted from script values; deeper values
    /// are dropped like any other unsupported value
    pub max_depth: usize,
    /// Whether to install the console API
    pub console: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            module_name: "url".to_string(),
            max_depth: 64,
            console: true,
        }
    }
}

/// A Boa context with the url module installed
pub struct Runtime {
    context: Context,
    config: RuntimeConfig,
}

impl Runtime {
    /// Create a new runtime with default configuration
    pub fn new() -> RuntimeResult<Self> {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a new runtime with custom configuration
    pub fn with_config(config: RuntimeConfig) -> RuntimeResult<Self> {
        let mut context = ContextBuilder::default()
            .build()
            .map_err(|e| RuntimeError::JsError(e.to_string()))?;

        if config.console {
            register_extensions(ConsoleExtension(ConsoleLogger), None, &mut context)
                .map_err(|e| RuntimeError::JsError(e.to_string()))?;
        }

        register_url_module(&mut context, &config)
            .map_err(|e| RuntimeError::JsError(e.to_string()))?;

        Ok(Self { context, config })
    }

    /// Evaluate script code and return the result
    pub fn eval(&mut self, code: &str, filename: &str) -> RuntimeResult<JsValue> {
        log::debug!("evaluating {filename}");

        let source = Source::from_bytes(code.as_bytes());
        let result = self.context.eval(source);

        // Run any pending promise jobs
        self.context
            .run_jobs()
            .map_err(|e| RuntimeError::JsError(e.to_string()))?;

        result.map_err(|e| RuntimeError::JsError(e.to_string()))
    }

    /// Evaluate a script file
    pub fn run_file(&mut self, path: &Path) -> RuntimeResult<JsValue> {
        let source = std::fs::read_to_string(path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("input.js");

        self.eval(&source, filename)
    }

    /// Get mutable reference to the underlying context
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    /// The configuration this runtime was built with
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Convert a JsValue to a displayable string
    pub fn value_to_string(&mut self, value: &JsValue) -> String {
        value
            .to_string(&mut self.context)
            .map(|s| s.to_std_string_escaped())
            .unwrap_or_else(|_| "[error converting value]".to_string())
    }
}
