use crate::config::{AuthConfig, Route};
use http::Method;
use std::fmt;

/// One path of the upstream API, with the methods it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// OpenAPI path template, e.g. `/pets/{petId}`
    pub path: String,
    /// Declared methods in document order
    pub methods: Vec<Method>,
    /// Operation id when the path declares exactly one operation with one
    pub operation_id: Option<String>,
    pub summary: Option<String>,
}

impl From<Endpoint> for Route {
    fn from(endpoint: Endpoint) -> Self {
        Route {
            path: endpoint.path,
            price: None,
            methods: endpoint.methods,
            operation_id: endpoint.operation_id,
            summary: endpoint.summary,
        }
    }
}

/// Where an `apiKey` scheme carries its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyLocation {
    Header,
    Query,
    Cookie,
}

impl ApiKeyLocation {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "header" => Some(ApiKeyLocation::Header),
            "query" => Some(ApiKeyLocation::Query),
            "cookie" => Some(ApiKeyLocation::Cookie),
            _ => None,
        }
    }
}

impl fmt::Display for ApiKeyLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiKeyLocation::Header => write!(f, "header"),
            ApiKeyLocation::Query => write!(f, "query"),
            ApiKeyLocation::Cookie => write!(f, "cookie"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecuritySchemeKind {
    ApiKey {
        location: ApiKeyLocation,
        param_name: String,
    },
    Http {
        scheme: String,
        bearer_format: Option<String>,
    },
}

/// An `apiKey` or `http` entry from `components.securitySchemes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityScheme {
    pub name: String,
    pub kind: SecuritySchemeKind,
    pub description: Option<String>,
}

impl SecurityScheme {
    /// Upstream auth configuration this scheme implies, without secrets.
    ///
    /// `http` schemes other than `basic` and `bearer` (digest, hoba, ...) have
    /// no counterpart and yield `None`.
    pub fn auth_candidate(&self) -> Option<AuthConfig> {
        match &self.kind {
            SecuritySchemeKind::ApiKey {
                location,
                param_name,
            } => Some(match location {
                ApiKeyLocation::Header => AuthConfig::ApiKeyHeader {
                    header: param_name.clone(),
                    value: None,
                },
                ApiKeyLocation::Query => AuthConfig::ApiKeyQuery {
                    param: param_name.clone(),
                    value: None,
                },
                ApiKeyLocation::Cookie => AuthConfig::ApiKeyCookie {
                    cookie: param_name.clone(),
                    value: None,
                },
            }),
            SecuritySchemeKind::Http { scheme, .. } => match scheme.to_ascii_lowercase().as_str() {
                "basic" => Some(AuthConfig::Basic {
                    username: None,
                    password: None,
                }),
                "bearer" => Some(AuthConfig::Bearer { token: None }),
                _ => None,
            },
        }
    }
}

/// Everything the generator can learn from an OpenAPI document.
#[derive(Debug, Clone, Default)]
pub struct OpenApiSurface {
    pub title: String,
    pub endpoints: Vec<Endpoint>,
    pub security_schemes: Vec<SecurityScheme>,
}

impl OpenApiSurface {
    /// Lower-case, hyphenated form of the document title, usable as a crate name.
    pub fn slug(&self) -> String {
        let slug = self
            .title
            .to_lowercase()
            .replace(|c: char| !c.is_ascii_alphanumeric(), "-");
        slug.split('-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}
