use askama::Template;

use super::auth::{AuthSnippets, EnvEntry, EnvFileKind};
use super::dependencies_config::DependencySpec;
use super::error::GenerateError;
use super::naming::rust_str;
use super::server::{RouteEntry, ServerModule};
use crate::config::ProjectConfig;

/// Template data for generating main.rs
#[derive(Template)]
#[template(path = "main.rs.txt", escape = "none")]
pub struct MainRsTemplate<'a> {
    pub server: &'a ServerModule,
}

/// One `name = spec` line of `[dependencies]`
#[derive(Debug, Clone)]
pub struct DependencyLine {
    pub name: String,
    /// Inline TOML value, e.g. `{ version = "1", features = ["macros"] }`
    pub spec: String,
}

/// Template data for generating Cargo.toml
#[derive(Template)]
#[template(path = "Cargo.toml.txt", escape = "none")]
pub struct CargoTomlTemplate {
    pub name: String,
    /// TOML string literal, quotes included
    pub description_lit: String,
    pub dependencies: Vec<DependencyLine>,
    pub dev_dependencies: Vec<DependencyLine>,
}

#[derive(Template)]
#[template(path = "rust-toolchain.toml.txt", escape = "none")]
pub struct ToolchainTemplate;

#[derive(Template)]
#[template(path = "gitignore.txt", escape = "none")]
pub struct GitignoreTemplate;

/// Template data for `.env` and `.env.example`
#[derive(Template)]
#[template(path = "env.txt", escape = "none")]
pub struct EnvTemplate<'a> {
    pub title: &'a str,
    pub project_name: &'a str,
    pub core: Vec<EnvEntry>,
    pub auth_label: String,
    pub auth: Vec<EnvEntry>,
}

/// Template data for README.md
#[derive(Template)]
#[template(path = "README.md.txt", escape = "none")]
pub struct ReadmeTemplate<'a> {
    pub name: &'a str,
    pub description: String,
    pub base_url: &'a str,
    pub routes: &'a [RouteEntry],
    pub network: &'a str,
    pub testnet: bool,
    pub seller_address: &'a str,
    pub facilitator_url: &'a str,
    /// Accepted values of `NETWORK` for this network family
    pub networks: Vec<String>,
    pub port: u16,
    pub auth_label: Option<String>,
    pub auth_entries: Vec<EnvEntry>,
    pub openapi_file: Option<&'a str>,
}

/// A dedicated `Option<String>` field of the generated `Credentials`.
#[derive(Debug, Clone)]
pub struct CredentialField {
    pub name: &'static str,
    /// Environment variable as a Rust literal
    pub var_lit: String,
}

/// One `(key, optional_secret(VAR))` pair of a custom header or query list.
#[derive(Debug, Clone)]
pub struct CustomCredential {
    pub key_lit: String,
    pub var_lit: String,
}

/// Template data for the `Credentials` struct and its `from_env`
#[derive(Template)]
#[template(path = "credentials.rs.txt", escape = "none")]
pub struct CredentialsTemplate {
    /// Custom lists instead of dedicated fields
    pub custom: bool,
    pub fields: Vec<CredentialField>,
    pub custom_headers: Vec<CustomCredential>,
    pub custom_query: Vec<CustomCredential>,
}

/// Template data for `fn inject_credentials`. Names are Rust literals.
#[derive(Template, Default)]
#[template(path = "inject_credentials.rs.txt", escape = "none")]
pub struct InjectCredentialsTemplate {
    pub uses_headers: bool,
    pub uses_url: bool,
    /// API key header name
    pub header: Option<String>,
    /// API key query parameter name
    pub query: Option<String>,
    /// API key cookie name
    pub cookie: Option<String>,
    pub bearer: bool,
    pub basic: bool,
    pub custom_headers: bool,
    pub custom_query: bool,
}

fn render<T: Template>(template: &T, name: &'static str) -> Result<String, GenerateError> {
    template
        .render()
        .map_err(|source| GenerateError::Render {
            template: name,
            source,
        })
}

pub fn render_credentials(template: &CredentialsTemplate) -> Result<String, GenerateError> {
    render(template, "credentials.rs")
}

pub fn render_inject_credentials(
    template: &InjectCredentialsTemplate,
) -> Result<String, GenerateError> {
    render(template, "inject_credentials.rs")
}

pub fn render_main_rs(server: &ServerModule) -> Result<String, GenerateError> {
    render(&MainRsTemplate { server }, "main.rs")
}

fn dependency_lines(dependencies: &[(String, DependencySpec)]) -> Vec<DependencyLine> {
    dependencies
        .iter()
        .map(|(name, spec)| DependencyLine {
            name: name.clone(),
            spec: spec.to_toml_inline(),
        })
        .collect()
}

/// Render Cargo.toml with already resolved dependency tables.
pub fn render_cargo_toml(
    config: &ProjectConfig,
    dependencies: &[(String, DependencySpec)],
    dev_dependencies: &[(String, DependencySpec)],
) -> Result<String, GenerateError> {
    let description = if config.description.trim().is_empty() {
        format!("x402 payment-gated proxy for {}", config.upstream_base())
    } else {
        config.description.trim().to_string()
    };
    let template = CargoTomlTemplate {
        name: config.project_name.clone(),
        description_lit: serde_json::to_string(&description).unwrap_or_else(|_| rust_str(&description)),
        dependencies: dependency_lines(dependencies),
        dev_dependencies: dependency_lines(dev_dependencies),
    };
    render(&template, "Cargo.toml")
}

pub fn render_toolchain() -> Result<String, GenerateError> {
    render(&ToolchainTemplate, "rust-toolchain.toml")
}

pub fn render_gitignore() -> Result<String, GenerateError> {
    render(&GitignoreTemplate, ".gitignore")
}

/// Variables every generated server reads, with their non-secret values.
pub fn core_env_entries(config: &ProjectConfig) -> Vec<EnvEntry> {
    vec![
        EnvEntry::new(
            Some("x402 facilitator that verifies and settles payments".to_string()),
            "FACILITATOR_URL",
            config.facilitator_url(),
        ),
        EnvEntry::new(
            Some("Wallet address receiving payments".to_string()),
            "ADDRESS",
            config.seller_address.clone(),
        ),
        EnvEntry::new(
            Some("Payment network".to_string()),
            "NETWORK",
            config.network.as_str(),
        ),
        EnvEntry::new(
            Some("Upstream API".to_string()),
            "API_BASE_URL",
            config.upstream_base(),
        ),
        EnvEntry::new(
            Some("Listen port".to_string()),
            "PORT",
            crate::config::DEFAULT_PORT.to_string(),
        ),
    ]
}

pub fn render_env(
    config: &ProjectConfig,
    auth: Option<&AuthSnippets>,
    kind: EnvFileKind,
) -> Result<String, GenerateError> {
    let (title, name) = match kind {
        EnvFileKind::Real => ("Runtime configuration. Keep this file out of version control.", ".env"),
        EnvFileKind::Example => ("Copy to .env and fill in the values.", ".env.example"),
    };
    let template = EnvTemplate {
        title,
        project_name: &config.project_name,
        core: core_env_entries(config),
        auth_label: auth.map(|a| a.label.clone()).unwrap_or_default(),
        auth: auth.map(|a| a.env_entries(kind)).unwrap_or_default(),
    };
    render(&template, name)
}

pub fn render_readme(
    config: &ProjectConfig,
    server: &ServerModule,
    openapi_file: Option<&str>,
) -> Result<String, GenerateError> {
    let description = if config.description.trim().is_empty() {
        format!("Pay-per-request access to {}.", config.upstream_base())
    } else {
        config.description.trim().to_string()
    };
    let template = ReadmeTemplate {
        name: &config.project_name,
        description,
        base_url: config.upstream_base(),
        routes: &server.routes,
        network: config.network.as_str(),
        testnet: config.network.is_testnet(),
        seller_address: &config.seller_address,
        facilitator_url: config.facilitator_url(),
        networks: server
            .payment
            .networks
            .iter()
            .map(|n| n.name.clone())
            .collect(),
        port: server.default_port,
        auth_label: server.auth.as_ref().map(|a| a.label.clone()),
        auth_entries: server
            .auth
            .as_ref()
            .map(|a| a.env_entries(EnvFileKind::Example))
            .unwrap_or_default(),
        openapi_file,
    };
    render(&template, "README.md")
}
