//! # OpenAPI ingestion
//!
//! Optional input to generation: reads an OpenAPI 3 document and exposes the
//! paths, methods and authentication schemes of the upstream API so that a
//! proxy can be generated without listing every route by hand.
//!
//! Only the routable surface is extracted. Schemas, parameters and responses
//! are ignored, and only `apiKey` / `http` security schemes are kept.

mod load;
mod types;

pub use load::{build_endpoints, extract_security_schemes, load_openapi};
pub use types::*;
