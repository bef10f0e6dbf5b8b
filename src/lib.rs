//! # x402-proxy-gen
//!
//! Scaffolds reverse proxies that put an [x402](https://www.x402.org) paywall in
//! front of an existing HTTP API. Each request to the generated server must
//! carry a payment proof; paid requests are forwarded upstream, optionally
//! with credentials the proxy owner configured.
//!
//! ## Architecture
//!
//! - **[`config`]** - configuration file loading and validation into a [`ProjectConfig`]
//! - **[`spec`]** - OpenAPI ingestion: endpoints and security schemes
//! - **[`generator`]** - route normalization, auth snippets, askama rendering and project writing
//! - **[`cli`]** - the `x402-proxy-gen` command line
//! - **[`logging`]** - tracing subscriber setup for the binary
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant CLI as CLI<br/>(x402-proxy-gen)
//!     participant Config as config::load_config
//!     participant Spec as spec::load_openapi
//!     participant Gen as generator::render_project
//!     participant FS as File System
//!
//!     User->>CLI: generate --config proxy.toml
//!     CLI->>Config: load_config("proxy.toml")
//!     Config->>Spec: load_openapi(openapi) (optional)
//!     Spec-->>Config: endpoints
//!     Config-->>CLI: ProjectConfig
//!     CLI->>Gen: render_project(&config)
//!     Gen-->>CLI: GeneratedProject
//!     CLI->>FS: write files, copy OpenAPI document
//!     CLI->>FS: cargo fmt
//! ```
//!
//! ## Example
//!
//! ```rust
//! use x402_proxy_gen::config::{Network, ProjectConfig, Route};
//! use x402_proxy_gen::generator::{render_project, RenderOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = ProjectConfig::new(
//!     "weather-proxy",
//!     "https://api.example.com".parse()?,
//!     "$0.001".parse()?,
//!     "0x1111111111111111111111111111111111111111",
//!     Network::BaseSepolia,
//! );
//! config.routes.push(Route::new("/api/*"));
//!
//! let project = render_project(&config, &RenderOptions::default())?;
//! assert!(project.contents("src/main.rs").is_some());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod generator;
pub mod logging;
pub mod spec;

pub use config::{load_config, ConfigError, ProjectConfig};
pub use generator::{generate_project, render_project, GenerateError};
pub use spec::load_openapi;
