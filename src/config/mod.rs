//! # Configuration
//!
//! The validated, immutable input to project generation and the file-based
//! collector that produces it.
//!
//! [`ProjectConfig`] is built once by [`load_config`] (or directly in code) and
//! is only read afterwards. Every price, address and URL it carries has already
//! been validated, so the generator performs no further input checks beyond
//! its own preconditions.
//!
//! ## File format
//!
//! ```toml
//! project_name = "weather-proxy"
//! base_url = "https://api.example.com"
//! default_price = "$0.001"
//! seller_address = "0x1111111111111111111111111111111111111111"
//! network = "base-sepolia"
//! openapi = "openapi.yaml"        # optional
//!
//! [[routes]]
//! path = "/forecast/{city}"
//! price = "$0.01"
//! methods = ["GET"]
//!
//! [prices]
//! "/alerts" = "$0.05"
//!
//! [auth]
//! type = "api_key_header"
//! header = "X-API-Key"
//! value = "secret"
//! ```

mod load;
mod types;

pub use load::{load_config, validate, ConfigError, LoadedConfig, RawConfig, RawRoute};
pub use types::*;
