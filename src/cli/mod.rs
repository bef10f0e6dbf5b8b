//! # CLI
//!
//! ## `generate`
//!
//! ```bash
//! x402-proxy-gen generate --config proxy.toml --output weather-proxy
//! ```
//!
//! Options:
//! - `--config <FILE>` - proxy configuration, TOML/YAML/JSON (required)
//! - `--output <DIR>` - output directory, defaults to `./<project_name>`
//! - `--openapi <FILE>` - take routes from an OpenAPI document
//! - `--force` - write into a non-empty directory
//! - `--dry-run` - list the files without writing them
//! - `--skip-fmt` - do not run `cargo fmt` afterwards
//! - `--dependencies-config <FILE>` - override the generated `[dependencies]`
//!
//! ## `inspect`
//!
//! ```bash
//! x402-proxy-gen inspect --openapi openapi.yaml
//! ```
//!
//! Lists the endpoints and the security schemes usable as upstream auth.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, Cli, Commands};
