//! Upstream credential snippets for the generated server.
//!
//! Everything is derived from one list of [`EnvBinding`]s: the `Credentials`
//! declaration, the `inject_credentials` body and both env files read the
//! same list, so a variable cannot be declared under one name and documented
//! under another.

use super::error::GenerateError;
use super::naming::{env_suffix, rust_str as lit};
use super::templates::{
    render_credentials, render_inject_credentials, CredentialField, CredentialsTemplate,
    CustomCredential, InjectCredentialsTemplate,
};
use crate::config::{AuthConfig, Secret};
use std::collections::HashMap;

pub const API_KEY_VAR: &str = "API_KEY";
pub const BEARER_TOKEN_VAR: &str = "BEARER_TOKEN";
pub const BASIC_USERNAME_VAR: &str = "BASIC_AUTH_USERNAME";
pub const BASIC_PASSWORD_VAR: &str = "BASIC_AUTH_PASSWORD";
pub const CUSTOM_HEADER_PREFIX: &str = "CUSTOM_HEADER_";
pub const CUSTOM_QUERY_PREFIX: &str = "CUSTOM_QUERY_";

/// Where a binding's value lives inside the generated `Credentials` struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingSlot {
    /// A dedicated `Option<String>` field
    Field(&'static str),
    /// An entry of `custom_headers`, keyed by header name
    CustomHeader(String),
    /// An entry of `custom_query`, keyed by parameter name
    CustomQuery(String),
}

/// One credential read from the environment by the generated server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvBinding {
    /// Environment variable name
    pub var: String,
    pub slot: BindingSlot,
    /// Value collected at generation time, if any
    pub secret: Option<Secret>,
    /// One-line explanation written above the variable in env files
    pub comment: String,
}

impl EnvBinding {
    fn new(var: impl Into<String>, slot: BindingSlot, secret: Option<&Secret>, comment: String) -> Self {
        EnvBinding {
            var: var.into(),
            slot,
            secret: secret.filter(|s| !s.is_empty()).cloned(),
            comment,
        }
    }

    /// Placeholder used in `.env.example`.
    pub fn placeholder(&self) -> String {
        format!("your_{}_here", self.var.to_ascii_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvFileKind {
    /// `.env`: collected values
    Real,
    /// `.env.example`: placeholders only
    Example,
}

/// A single `NAME=value` line with an optional comment above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvEntry {
    pub comment: Option<String>,
    pub name: String,
    pub value: String,
}

impl EnvEntry {
    pub fn new(comment: Option<String>, name: impl Into<String>, value: impl Into<String>) -> Self {
        EnvEntry {
            comment,
            name: name.into(),
            value: value.into(),
        }
    }

    /// `NAME=value`, quoted when dotenv would otherwise misread the value.
    pub fn line(&self) -> String {
        format!("{}={}", self.name, dotenv_quote(&self.value))
    }
}

fn dotenv_quote(value: &str) -> String {
    let plain = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "_-.:/@+,%".contains(c));
    if plain {
        value.to_string()
    } else if !value.contains('\'') {
        format!("'{value}'")
    } else {
        let escaped = value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('$', "\\$")
            .replace('\n', "\\n");
        format!("\"{escaped}\"")
    }
}

/// The three correlated fragments for one [`AuthConfig`].
#[derive(Debug, Clone)]
pub struct AuthSnippets {
    /// Summary for the README, e.g. "Bearer token"
    pub label: String,
    pub bindings: Vec<EnvBinding>,
    /// `struct Credentials` and `Credentials::from_env`
    pub declaration: String,
    /// Complete `fn inject_credentials`
    pub injection: String,
    /// Generated code calls `set_header`
    pub uses_set_header: bool,
    /// Generated code calls `append_cookie`
    pub uses_cookie: bool,
    /// Generated code needs the `base64` crate
    pub uses_base64: bool,
}

impl AuthSnippets {
    pub fn build(auth: &AuthConfig) -> Result<Self, GenerateError> {
        let bindings = bindings_for(auth)?;
        let declaration = declaration(auth, &bindings)?;
        let injection = injection(auth)?;
        let (uses_set_header, uses_cookie, uses_base64) = match auth {
            AuthConfig::ApiKeyHeader { .. } | AuthConfig::Bearer { .. } => (true, false, false),
            AuthConfig::ApiKeyQuery { .. } => (false, false, false),
            AuthConfig::ApiKeyCookie { .. } => (true, true, false),
            AuthConfig::Basic { .. } => (true, false, true),
            AuthConfig::Custom { headers, .. } => (!headers.is_empty(), false, false),
        };
        Ok(AuthSnippets {
            label: auth.describe(),
            bindings,
            declaration,
            injection,
            uses_set_header,
            uses_cookie,
            uses_base64,
        })
    }

    /// Env file entries for the auth variables, in declaration order.
    pub fn env_entries(&self, kind: EnvFileKind) -> Vec<EnvEntry> {
        self.bindings
            .iter()
            .map(|b| {
                let value = match kind {
                    EnvFileKind::Real => b
                        .secret
                        .as_ref()
                        .map(|s| s.expose().to_string())
                        .unwrap_or_default(),
                    EnvFileKind::Example => b.placeholder(),
                };
                EnvEntry::new(Some(b.comment.clone()), b.var.clone(), value)
            })
            .collect()
    }

    /// Whether any binding carries a collected value.
    pub fn has_secrets(&self) -> bool {
        self.bindings.iter().any(|b| b.secret.is_some())
    }
}

fn bindings_for(auth: &AuthConfig) -> Result<Vec<EnvBinding>, GenerateError> {
    let bindings = match auth {
        AuthConfig::ApiKeyHeader { header, value } => vec![EnvBinding::new(
            API_KEY_VAR,
            BindingSlot::Field("api_key"),
            value.as_ref(),
            format!("API key sent in the `{header}` header"),
        )],
        AuthConfig::ApiKeyQuery { param, value } => vec![EnvBinding::new(
            API_KEY_VAR,
            BindingSlot::Field("api_key"),
            value.as_ref(),
            format!("API key sent as the `{param}` query parameter"),
        )],
        AuthConfig::ApiKeyCookie { cookie, value } => vec![EnvBinding::new(
            API_KEY_VAR,
            BindingSlot::Field("api_key"),
            value.as_ref(),
            format!("API key sent as the `{cookie}` cookie"),
        )],
        AuthConfig::Bearer { token } => vec![EnvBinding::new(
            BEARER_TOKEN_VAR,
            BindingSlot::Field("bearer_token"),
            token.as_ref(),
            "Token sent as `Authorization: Bearer <token>`".to_string(),
        )],
        AuthConfig::Basic { username, password } => vec![
            EnvBinding::new(
                BASIC_USERNAME_VAR,
                BindingSlot::Field("basic_username"),
                username.as_ref(),
                "HTTP Basic auth username".to_string(),
            ),
            EnvBinding::new(
                BASIC_PASSWORD_VAR,
                BindingSlot::Field("basic_password"),
                password.as_ref(),
                "HTTP Basic auth password".to_string(),
            ),
        ],
        AuthConfig::Custom { headers, query } => {
            let mut out = Vec::with_capacity(headers.len() + query.len());
            for (name, value) in headers {
                out.push(EnvBinding::new(
                    format!("{CUSTOM_HEADER_PREFIX}{}", env_suffix(name)),
                    BindingSlot::CustomHeader(name.clone()),
                    Some(value),
                    format!("Value of the `{name}` header"),
                ));
            }
            for (name, value) in query {
                out.push(EnvBinding::new(
                    format!("{CUSTOM_QUERY_PREFIX}{}", env_suffix(name)),
                    BindingSlot::CustomQuery(name.clone()),
                    Some(value),
                    format!("Value of the `{name}` query parameter"),
                ));
            }
            out
        }
    };

    check_collisions(&bindings)?;
    Ok(bindings)
}

fn check_collisions(bindings: &[EnvBinding]) -> Result<(), GenerateError> {
    let mut seen: HashMap<&str, &BindingSlot> = HashMap::new();
    for binding in bindings {
        if let Some(first) = seen.insert(binding.var.as_str(), &binding.slot) {
            return Err(GenerateError::EnvVarCollision {
                name: binding.var.clone(),
                first: slot_key(first),
                second: slot_key(&binding.slot),
            });
        }
    }
    Ok(())
}

fn slot_key(slot: &BindingSlot) -> String {
    match slot {
        BindingSlot::Field(field) => (*field).to_string(),
        BindingSlot::CustomHeader(key) | BindingSlot::CustomQuery(key) => key.clone(),
    }
}

fn declaration(auth: &AuthConfig, bindings: &[EnvBinding]) -> Result<String, GenerateError> {
    let mut template = CredentialsTemplate {
        custom: matches!(auth, AuthConfig::Custom { .. }),
        fields: Vec::new(),
        custom_headers: Vec::new(),
        custom_query: Vec::new(),
    };
    for b in bindings {
        let var_lit = lit(&b.var);
        match &b.slot {
            BindingSlot::Field(name) => template.fields.push(CredentialField {
                name: *name,
                var_lit,
            }),
            BindingSlot::CustomHeader(key) => template.custom_headers.push(CustomCredential {
                key_lit: lit(key),
                var_lit,
            }),
            BindingSlot::CustomQuery(key) => template.custom_query.push(CustomCredential {
                key_lit: lit(key),
                var_lit,
            }),
        }
    }
    render_credentials(&template)
}

fn injection(auth: &AuthConfig) -> Result<String, GenerateError> {
    let template = match auth {
        AuthConfig::ApiKeyHeader { header, .. } => InjectCredentialsTemplate {
            uses_headers: true,
            header: Some(lit(header)),
            ..Default::default()
        },
        AuthConfig::ApiKeyQuery { param, .. } => InjectCredentialsTemplate {
            uses_url: true,
            query: Some(lit(param)),
            ..Default::default()
        },
        AuthConfig::ApiKeyCookie { cookie, .. } => InjectCredentialsTemplate {
            uses_headers: true,
            cookie: Some(lit(cookie)),
            ..Default::default()
        },
        AuthConfig::Bearer { .. } => InjectCredentialsTemplate {
            uses_headers: true,
            bearer: true,
            ..Default::default()
        },
        AuthConfig::Basic { .. } => InjectCredentialsTemplate {
            uses_headers: true,
            basic: true,
            ..Default::default()
        },
        AuthConfig::Custom { headers, query } => InjectCredentialsTemplate {
            uses_headers: !headers.is_empty(),
            uses_url: !query.is_empty(),
            custom_headers: !headers.is_empty(),
            custom_query: !query.is_empty(),
            ..Default::default()
        },
    };
    render_inject_credentials(&template)
}
