//! # Generator
//!
//! Turns a validated [`ProjectConfig`](crate::config::ProjectConfig) into a
//! standalone axum project that charges for every request with x402 and
//! forwards paid requests to the upstream API.
//!
//! ```text
//! ProjectConfig ─┬─ routes ──► normalize ──► ServerModule ──┐
//!                └─ auth ────► AuthSnippets ────────────────┼─► askama ─► GeneratedProject ─► disk
//!                              DependenciesConfig ──────────┘
//! ```
//!
//! ## Generated Structure
//!
//! ```text
//! my-proxy/
//! ├── Cargo.toml              # pinned axum / x402 / reqwest / tokio stack, strict lints
//! ├── rust-toolchain.toml
//! ├── .env                    # only when secrets were supplied
//! ├── .env.example
//! ├── .gitignore
//! ├── README.md
//! ├── openapi.yaml            # copy of the ingested document, if any
//! └── src/
//!     └── main.rs             # paywall table, forwarding handlers, router
//! ```
//!
//! ## Programmatic Usage
//!
//! ```rust,ignore
//! use x402_proxy_gen::config::load_config;
//! use x402_proxy_gen::generator::{generate_project, GenerateOptions};
//!
//! let loaded = load_config("proxy.toml".as_ref(), None)?;
//! let mut options = GenerateOptions::new("weather-proxy");
//! options.openapi_source = loaded.openapi;
//! generate_project(&loaded.project, &options)?;
//! ```
//!
//! Templates live in `templates/` at the crate root and are compiled in by askama.

pub mod auth;
pub mod dependencies_config;
mod error;
mod naming;
mod project;
pub mod routes;
pub mod server;
mod templates;

pub use auth::{AuthSnippets, EnvBinding, EnvEntry, EnvFileKind};
pub use dependencies_config::{DependenciesConfig, DependencySpec};
pub use error::GenerateError;
pub use naming::{env_suffix, sanitize_identifier, to_snake_case};
pub use project::{
    format_project, generate_project, openapi_file_name, render_project, GenerateOptions,
    GeneratedFile, GeneratedProject, RenderOptions, CARGO_BIN_ENV,
};
pub use routes::{normalize, NormalizedRoute};
pub use server::ServerModule;
