//! urlkit - URL and query-string utilities for embedded scripts
//!
//! urlkit combines:
//! - `url` / `percent-encoding`: URL parsing, resolution and escaping
//! - A deterministic PHP/Rack-style query-string encoder for nested values
//! - Boa: ECMAScript engine written in Rust, hosting the `url` module
//! - boa_runtime: console support for scripts

pub mod classify;
pub mod cli;
pub mod query;
pub mod record;
pub mod runtime;

// Re-export commonly used types
pub use classify::{Kind, classify};
pub use query::{EscapeError, QueryValue, encode, escape, unescape};
pub use record::{BuildOptions, QueryParam, UrlError, UrlRecord, UrlResult, build, parse, resolve};
pub use runtime::{Runtime, RuntimeConfig, RuntimeError, RuntimeResult};
