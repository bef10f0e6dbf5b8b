//! Dependency table of the generated `Cargo.toml`.
//!
//! Defaults are pinned here. A project can override or extend them with an
//! `x402-proxy-dependencies.toml` placed next to its configuration file (or
//! passed explicitly on the command line):
//!
//! ```toml
//! [dependencies]
//! x402-axum = { git = "https://github.com/x402-rs/x402-rs", branch = "main" }
//! tower-http = { version = "0.6", features = ["catch-panic", "trace", "cors"] }
//!
//! [conditional.base64]
//! detect = "auth:basic"
//! version = "0.22"
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name looked up next to the proxy configuration.
pub const DEPENDENCIES_FILE_NAME: &str = "x402-proxy-dependencies.toml";

/// Feature emitted when the upstream uses HTTP Basic auth.
pub const FEATURE_AUTH_BASIC: &str = "auth:basic";
/// Feature emitted when some handler substitutes an upstream path template.
pub const FEATURE_TEMPLATED_ROUTES: &str = "routes:templated";
/// Feature emitted for EVM networks (payment recipient parsed as an address).
pub const FEATURE_NETWORK_EVM: &str = "network:evm";
/// Feature emitted for Solana networks.
pub const FEATURE_NETWORK_SOLANA: &str = "network:solana";

/// Dependency specification for Cargo.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DependencySpec {
    /// Simple version string: "0.7"
    Version(String),
    /// Workspace dependency: { workspace = true }
    Workspace {
        workspace: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        features: Option<Vec<String>>,
    },
    /// Full specification: { version = "1", features = ["macros"] }
    Full {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        git: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        branch: Option<String>,
        #[serde(
            default,
            rename = "default-features",
            skip_serializing_if = "Option::is_none"
        )]
        default_features: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        features: Option<Vec<String>>,
    },
}

fn quoted(s: &str) -> String {
    // JSON string syntax is a subset of TOML basic strings.
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

fn quoted_list(items: &[String]) -> String {
    let inner = items.iter().map(|s| quoted(s)).collect::<Vec<_>>().join(", ");
    format!("[{inner}]")
}

impl DependencySpec {
    pub fn version(version: &str) -> Self {
        DependencySpec::Version(version.to_string())
    }

    pub fn with_features(version: &str, features: &[&str]) -> Self {
        DependencySpec::Full {
            version: Some(version.to_string()),
            path: None,
            git: None,
            branch: None,
            default_features: None,
            features: Some(features.iter().map(|f| f.to_string()).collect()),
        }
    }

    /// Right-hand side of a `name = ...` line in `[dependencies]`.
    pub fn to_toml_inline(&self) -> String {
        match self {
            DependencySpec::Version(v) => quoted(v),
            DependencySpec::Workspace {
                workspace,
                features,
            } => {
                let mut parts = vec![format!("workspace = {workspace}")];
                if let Some(features) = features {
                    parts.push(format!("features = {}", quoted_list(features)));
                }
                format!("{{ {} }}", parts.join(", "))
            }
            DependencySpec::Full {
                version,
                path,
                git,
                branch,
                default_features,
                features,
            } => {
                let mut parts = Vec::new();
                for (key, value) in [
                    ("version", version),
                    ("path", path),
                    ("git", git),
                    ("branch", branch),
                ] {
                    if let Some(value) = value {
                        parts.push(format!("{key} = {}", quoted(value)));
                    }
                }
                if let Some(default_features) = default_features {
                    parts.push(format!("default-features = {default_features}"));
                }
                if let Some(features) = features {
                    parts.push(format!("features = {}", quoted_list(features)));
                }
                format!("{{ {} }}", parts.join(", "))
            }
        }
    }
}

/// Dependency that is only added when the generator detects a feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConditionalDependency {
    /// Feature key, e.g. `auth:basic`
    pub detect: String,
    #[serde(flatten)]
    pub spec: DependencySpec,
}

/// Dependencies of the generated project.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DependenciesConfig {
    /// Always included
    #[serde(default)]
    pub dependencies: BTreeMap<String, DependencySpec>,
    /// `[dev-dependencies]` of the generated project
    #[serde(default, rename = "dev-dependencies")]
    pub dev_dependencies: BTreeMap<String, DependencySpec>,
    /// Included when their `detect` feature is present
    #[serde(default)]
    pub conditional: BTreeMap<String, ConditionalDependency>,
}

impl DependenciesConfig {
    /// Pinned defaults for an axum 0.8 proxy.
    pub fn defaults() -> Self {
        let mut dependencies = BTreeMap::new();
        let mut add = |name: &str, spec: DependencySpec| {
            dependencies.insert(name.to_string(), spec);
        };
        add("axum", DependencySpec::version("0.8"));
        add(
            "tokio",
            DependencySpec::with_features("1", &["macros", "rt-multi-thread", "net", "signal"]),
        );
        add(
            "reqwest",
            DependencySpec::Full {
                version: Some("0.12".to_string()),
                path: None,
                git: None,
                branch: None,
                default_features: Some(false),
                features: Some(vec!["rustls-tls".to_string()]),
            },
        );
        add("dotenvy", DependencySpec::version("0.15"));
        add("serde_json", DependencySpec::version("1"));
        add("tracing", DependencySpec::version("0.1"));
        add(
            "tracing-subscriber",
            DependencySpec::with_features("0.3", &["env-filter"]),
        );
        add(
            "tower-http",
            DependencySpec::with_features("0.6", &["catch-panic", "trace"]),
        );
        add("url", DependencySpec::version("2"));
        add("x402-axum", DependencySpec::version("1"));
        add("x402-types", DependencySpec::version("1"));

        let conditional = [
            ("base64", FEATURE_AUTH_BASIC, DependencySpec::version("0.22")),
            ("percent-encoding", FEATURE_TEMPLATED_ROUTES, DependencySpec::version("2")),
            ("alloy-primitives", FEATURE_NETWORK_EVM, DependencySpec::version("1")),
            (
                "x402-chain-eip155",
                FEATURE_NETWORK_EVM,
                DependencySpec::with_features("1", &["server"]),
            ),
            (
                "x402-chain-solana",
                FEATURE_NETWORK_SOLANA,
                DependencySpec::with_features("1", &["server"]),
            ),
        ]
        .into_iter()
        .map(|(name, detect, spec)| {
            (
                name.to_string(),
                ConditionalDependency {
                    detect: detect.to_string(),
                    spec,
                },
            )
        })
        .collect();

        let dev_dependencies = BTreeMap::from([(
            "tower".to_string(),
            DependencySpec::with_features("0.5", &["util"]),
        )]);

        DependenciesConfig {
            dependencies,
            dev_dependencies,
            conditional,
        }
    }

    /// Entries of `other` replace entries of `self` with the same name.
    pub fn merge(mut self, other: DependenciesConfig) -> Self {
        self.dependencies.extend(other.dependencies);
        self.dev_dependencies.extend(other.dev_dependencies);
        self.conditional.extend(other.conditional);
        self
    }

    /// Final `[dependencies]` table for a project with the given features, sorted by name.
    pub fn resolve(&self, features: &BTreeSet<String>) -> Vec<(String, DependencySpec)> {
        let mut resolved = self.dependencies.clone();
        for (name, dep) in &self.conditional {
            if features.contains(&dep.detect) {
                debug!(dependency = %name, feature = %dep.detect, "conditional dependency enabled");
                resolved.insert(name.clone(), dep.spec.clone());
            }
        }
        resolved.into_iter().collect()
    }

    /// `[dev-dependencies]` table, sorted by name.
    pub fn resolve_dev(&self) -> Vec<(String, DependencySpec)> {
        self.dev_dependencies
            .iter()
            .map(|(name, spec)| (name.clone(), spec.clone()))
            .collect()
    }
}

/// Load dependencies configuration from a TOML file
///
/// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but fails to parse.
pub fn load_dependencies_config(config_path: &Path) -> anyhow::Result<Option<DependenciesConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(config_path).with_context(|| {
        format!(
            "Failed to read dependencies config: {}",
            config_path.display()
        )
    })?;

    let config: DependenciesConfig = toml::from_str(&contents).with_context(|| {
        format!(
            "Failed to parse dependencies config: {}",
            config_path.display()
        )
    })?;

    Ok(Some(config))
}

/// Look for `x402-proxy-dependencies.toml` next to the proxy configuration file.
pub fn auto_detect_config_path(proxy_config: &Path) -> Option<PathBuf> {
    let dir = proxy_config.parent()?;
    let candidate = dir.join(DEPENDENCIES_FILE_NAME);
    candidate.exists().then_some(candidate)
}

/// Resolve dependencies config path
///
/// Priority:
/// 1. Explicitly provided path (via CLI)
/// 2. Auto-detected alongside the proxy configuration
/// 3. None (defaults only)
pub fn resolve_config_path(explicit_path: Option<&Path>, proxy_config: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        warn!(path = %path.display(), "dependencies config not found, falling back to auto-detection");
    }

    auto_detect_config_path(proxy_config)
}

/// Defaults merged with the resolved override file, if any.
pub fn dependencies_for(explicit_path: Option<&Path>, proxy_config: &Path) -> anyhow::Result<DependenciesConfig> {
    let defaults = DependenciesConfig::defaults();
    let Some(path) = resolve_config_path(explicit_path, proxy_config) else {
        return Ok(defaults);
    };
    match load_dependencies_config(&path)? {
        Some(overrides) => {
            debug!(path = %path.display(), "applying dependency overrides");
            Ok(defaults.merge(overrides))
        }
        None => Ok(defaults),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_rendering() {
        assert_eq!(DependencySpec::version("0.7").to_toml_inline(), "\"0.7\"");
        assert_eq!(
            DependencySpec::with_features("1", &["macros"]).to_toml_inline(),
            "{ version = \"1\", features = [\"macros\"] }"
        );
        let defaults = DependenciesConfig::defaults();
        assert_eq!(
            defaults.dependencies["reqwest"].to_toml_inline(),
            "{ version = \"0.12\", default-features = false, features = [\"rustls-tls\"] }"
        );
        let ws = DependencySpec::Workspace {
            workspace: true,
            features: None,
        };
        assert_eq!(ws.to_toml_inline(), "{ workspace = true }");
    }

    #[test]
    fn test_resolve_includes_detected_conditionals_only() {
        let deps = DependenciesConfig::defaults();
        let none = deps.resolve(&BTreeSet::new());
        assert!(!none.iter().any(|(n, _)| n == "base64"));

        let features = BTreeSet::from([FEATURE_AUTH_BASIC.to_string()]);
        let names: Vec<_> = deps.resolve(&features).into_iter().map(|(n, _)| n).collect();
        assert!(names.contains(&"base64".to_string()));
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_payment_crates_follow_network_family() {
        let deps = DependenciesConfig::defaults();
        let names = |feature: &str| -> Vec<String> {
            deps.resolve(&BTreeSet::from([feature.to_string()]))
                .into_iter()
                .map(|(n, _)| n)
                .collect()
        };

        let evm = names(FEATURE_NETWORK_EVM);
        assert!(evm.contains(&"x402-chain-eip155".to_string()));
        assert!(evm.contains(&"alloy-primitives".to_string()));
        assert!(!evm.contains(&"x402-chain-solana".to_string()));

        let solana = names(FEATURE_NETWORK_SOLANA);
        assert!(solana.contains(&"x402-chain-solana".to_string()));
        assert!(!solana.contains(&"x402-chain-eip155".to_string()));

        for set in [&evm, &solana] {
            assert!(set.contains(&"x402-axum".to_string()));
            assert!(set.contains(&"x402-types".to_string()));
            assert!(!set.contains(&"x402-rs".to_string()));
        }
        assert_eq!(
            deps.conditional["x402-chain-eip155"].spec.to_toml_inline(),
            "{ version = \"1\", features = [\"server\"] }"
        );
        assert_eq!(deps.resolve_dev()[0].0, "tower");
    }

    #[test]
    fn test_parse_and_merge_override_file() {
        let overrides: DependenciesConfig = toml::from_str(
            r#"
[dependencies]
x402-axum = { git = "https://github.com/x402-rs/x402-rs", branch = "main" }
axum = "0.8.4"

[conditional.base64]
detect = "auth:basic"
version = "0.21"
"#,
        )
        .unwrap();
        let merged = DependenciesConfig::defaults().merge(overrides);
        assert_eq!(merged.dependencies["axum"], DependencySpec::version("0.8.4"));
        assert_eq!(
            merged.dependencies["x402-axum"].to_toml_inline(),
            "{ git = \"https://github.com/x402-rs/x402-rs\", branch = \"main\" }"
        );
        assert_eq!(
            merged.conditional["base64"].spec,
            DependencySpec::version("0.21")
        );
        assert!(merged.dependencies.contains_key("tokio"));
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEPENDENCIES_FILE_NAME);
        assert!(load_dependencies_config(&path).unwrap().is_none());
        assert!(auto_detect_config_path(&dir.path().join("proxy.toml")).is_none());

        std::fs::write(&path, "[dependencies]\nserde = \"1\"\n").unwrap();
        let found = resolve_config_path(None, &dir.path().join("proxy.toml")).unwrap();
        assert_eq!(found, path);
        let deps = dependencies_for(None, &dir.path().join("proxy.toml")).unwrap();
        assert!(deps.dependencies.contains_key("serde"));
    }
}
