//! Reads a proxy configuration file and validates it into a [`ProjectConfig`].

use super::types::{AuthConfig, Network, NetworkFamily, Price, ProjectConfig, Route};
use crate::spec::load_openapi;
use http::{HeaderName, Method};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

static PROJECT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9-]*$").expect("valid project name regex"));
static EVM_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("valid EVM address regex"));
static SOLANA_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").expect("valid Solana address regex")
});
static QUERY_OR_COOKIE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-\[\]]+$").expect("valid parameter name regex"));

const ALLOWED_METHODS: [Method; 8] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::HEAD,
    Method::OPTIONS,
    Method::TRACE,
];

/// Errors raised while reading or validating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: String, reason: String },
    #[error("failed to load OpenAPI document {}: {message}", path.display())]
    OpenApi { path: PathBuf, message: String },
}

impl ConfigError {
    fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// On-disk shape of the configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    pub project_name: String,
    #[serde(default)]
    pub description: String,
    pub base_url: String,
    pub default_price: String,
    pub seller_address: String,
    pub network: String,
    #[serde(default)]
    pub facilitator_url: Option<String>,
    /// OpenAPI document, relative to the configuration file
    #[serde(default)]
    pub openapi: Option<PathBuf>,
    #[serde(default)]
    pub routes: Vec<RawRoute>,
    /// Path -> price overrides, applied to manual and OpenAPI routes alike
    #[serde(default)]
    pub prices: BTreeMap<String, String>,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRoute {
    pub path: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// A validated configuration plus the OpenAPI document it was built from, if any.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub project: ProjectConfig,
    pub openapi: Option<PathBuf>,
}

/// Read `path` (TOML, YAML or JSON by extension) and validate it.
///
/// `openapi_override` replaces the `openapi` key of the file.
pub fn load_config(path: &Path, openapi_override: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = parse_raw(path, &contents)?;

    let openapi = match openapi_override {
        Some(p) => Some(p.to_path_buf()),
        None => raw.openapi.as_ref().map(|p| match path.parent() {
            Some(dir) if p.is_relative() => dir.join(p),
            _ => p.clone(),
        }),
    };
    let openapi_routes = match &openapi {
        Some(spec_path) => {
            let surface = load_openapi(spec_path).map_err(|err| ConfigError::OpenApi {
                path: spec_path.clone(),
                message: format!("{err:#}"),
            })?;
            info!(
                spec = %spec_path.display(),
                endpoints = surface.endpoints.len(),
                "routes discovered from OpenAPI document"
            );
            surface.endpoints.into_iter().map(Route::from).collect()
        }
        None => Vec::new(),
    };

    let project = validate(raw, openapi_routes)?;
    debug!(
        project = %project.project_name,
        routes = project.routes.len(),
        network = %project.network,
        "configuration validated"
    );
    Ok(LoadedConfig { project, openapi })
}

fn parse_raw(path: &Path, contents: &str) -> Result<RawConfig, ConfigError> {
    let parse_err = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(contents).map_err(|e| parse_err(e.to_string()))
        }
        Some("json") => serde_json::from_str(contents).map_err(|e| parse_err(e.to_string())),
        _ => toml::from_str(contents).map_err(|e| parse_err(e.to_string())),
    }
}

/// Validate a parsed configuration.
///
/// Manual routes keep their order and come first; OpenAPI routes whose path is
/// already declared manually are skipped.
pub fn validate(raw: RawConfig, openapi_routes: Vec<Route>) -> Result<ProjectConfig, ConfigError> {
    if !PROJECT_NAME.is_match(&raw.project_name) {
        return Err(ConfigError::invalid(
            "project_name",
            format!(
                "`{}` must start with a lowercase letter and contain only lowercase letters, digits and hyphens",
                raw.project_name
            ),
        ));
    }

    let base_url = parse_http_url("base_url", &raw.base_url)?;
    let facilitator_url = raw
        .facilitator_url
        .as_deref()
        .map(|u| parse_http_url("facilitator_url", u))
        .transpose()?;

    let default_price: Price = raw
        .default_price
        .parse()
        .map_err(|e| ConfigError::invalid("default_price", format!("{e}")))?;

    let network: Network = raw
        .network
        .parse()
        .map_err(|e| ConfigError::invalid("network", format!("{e}")))?;

    validate_address(&raw.seller_address, network)?;

    let mut routes = Vec::with_capacity(raw.routes.len() + openapi_routes.len());
    for (idx, raw_route) in raw.routes.into_iter().enumerate() {
        routes.push(validate_route(idx, raw_route)?);
    }
    let mut seen: HashSet<String> = routes.iter().map(|r| r.path.clone()).collect();
    for route in openapi_routes {
        if seen.insert(route.path.clone()) {
            routes.push(route);
        } else {
            debug!(path = %route.path, "OpenAPI path already configured manually");
        }
    }

    for (path, price) in raw.prices {
        let price: Price = price
            .parse()
            .map_err(|e| ConfigError::invalid(format!("prices.\"{path}\""), format!("{e}")))?;
        let route = routes.iter_mut().find(|r| r.path == path).ok_or_else(|| {
            ConfigError::invalid(
                format!("prices.\"{path}\""),
                "no configured route has this path",
            )
        })?;
        route.price = Some(price);
    }

    if let Some(auth) = &raw.auth {
        validate_auth(auth)?;
    }

    Ok(ProjectConfig {
        project_name: raw.project_name,
        description: raw.description,
        base_url,
        default_price,
        seller_address: raw.seller_address,
        network,
        facilitator_url,
        routes,
        auth: raw.auth,
    })
}

fn parse_http_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::invalid(field, format!("`{value}`: {e}")))?;
    match url.scheme() {
        "http" | "https" if url.host().is_some() => Ok(url),
        _ => Err(ConfigError::invalid(
            field,
            format!("`{value}` must be an absolute http(s) URL"),
        )),
    }
}

fn validate_address(address: &str, network: Network) -> Result<(), ConfigError> {
    let ok = match network.family() {
        NetworkFamily::Evm => EVM_ADDRESS.is_match(address),
        NetworkFamily::Solana => SOLANA_ADDRESS.is_match(address),
    };
    if ok {
        return Ok(());
    }
    let expected = match network.family() {
        NetworkFamily::Evm => "an EVM address (0x followed by 40 hex digits)",
        NetworkFamily::Solana => "a base58 Solana address",
    };
    Err(ConfigError::invalid(
        "seller_address",
        format!("`{address}` is not {expected}, as required by network `{network}`"),
    ))
}

fn validate_route(idx: usize, raw: RawRoute) -> Result<Route, ConfigError> {
    let field = format!("routes[{idx}]");
    let path = raw.path.trim().to_string();
    if !(path.starts_with('/') || path == "*") {
        return Err(ConfigError::invalid(
            format!("{field}.path"),
            format!("`{path}` must start with `/`"),
        ));
    }
    if path.chars().any(char::is_whitespace) {
        return Err(ConfigError::invalid(
            format!("{field}.path"),
            format!("`{path}` must not contain whitespace"),
        ));
    }
    if let Some(segment) = path.split('/').find(|seg| !valid_segment(seg)) {
        return Err(ConfigError::invalid(
            format!("{field}.path"),
            format!("`{path}`: segment `{segment}` is not a literal, `*`, `**` or `{{name}}` placeholder"),
        ));
    }

    let price = raw
        .price
        .as_deref()
        .map(str::parse::<Price>)
        .transpose()
        .map_err(|e| ConfigError::invalid(format!("{field}.price"), format!("{e}")))?;

    let mut methods = Vec::new();
    for m in &raw.methods {
        let upper = m.trim().to_ascii_uppercase();
        let method = ALLOWED_METHODS
            .iter()
            .find(|allowed| allowed.as_str() == upper)
            .cloned()
            .ok_or_else(|| {
                ConfigError::invalid(
                    format!("{field}.methods"),
                    format!("unsupported HTTP method `{m}`"),
                )
            })?;
        if !methods.contains(&method) {
            methods.push(method);
        }
    }

    Ok(Route {
        path,
        price,
        methods,
        operation_id: None,
        summary: raw.summary,
    })
}

/// Literal text, a wildcard, or literal text with balanced `{name}` placeholders.
fn valid_segment(seg: &str) -> bool {
    if seg == "*" || seg == "**" {
        return true;
    }
    if seg.starts_with([':', '*']) {
        return false;
    }
    let mut open = false;
    let mut empty = true;
    for c in seg.chars() {
        match (c, open) {
            ('{', false) => {
                open = true;
                empty = true;
            }
            ('}', true) if !empty => open = false,
            ('{', true) | ('}', _) => return false,
            (_, true) => empty = false,
            _ => {}
        }
    }
    !open
}

fn validate_auth(auth: &AuthConfig) -> Result<(), ConfigError> {
    match auth {
        AuthConfig::ApiKeyHeader { header, .. } => validate_header_name("auth.header", header),
        AuthConfig::ApiKeyQuery { param, .. } => validate_param_name("auth.param", param),
        AuthConfig::ApiKeyCookie { cookie, .. } => validate_param_name("auth.cookie", cookie),
        AuthConfig::Bearer { .. } | AuthConfig::Basic { .. } => Ok(()),
        AuthConfig::Custom { headers, query } => {
            if headers.is_empty() && query.is_empty() {
                return Err(ConfigError::invalid(
                    "auth",
                    "custom auth needs at least one header or query entry",
                ));
            }
            for name in headers.keys() {
                validate_header_name("auth.headers", name)?;
            }
            for name in query.keys() {
                validate_param_name("auth.query", name)?;
            }
            Ok(())
        }
    }
}

fn validate_header_name(field: &str, name: &str) -> Result<(), ConfigError> {
    HeaderName::from_bytes(name.as_bytes())
        .map(|_| ())
        .map_err(|_| ConfigError::invalid(field, format!("`{name}` is not a valid header name")))
}

fn validate_param_name(field: &str, name: &str) -> Result<(), ConfigError> {
    if QUERY_OR_COOKIE_NAME.is_match(name) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("`{name}` is not a valid parameter name"),
        ))
    }
}
