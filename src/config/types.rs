use http::Method;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

/// Facilitator used when the configuration does not name one.
pub const DEFAULT_FACILITATOR_URL: &str = "https://x402.org/facilitator";

/// Port the generated proxy listens on when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 4021;

static PRICE_AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("valid price regex"));

/// Chain families the payment middleware knows how to settle on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkFamily {
    /// EVM chains, addresses are `0x` + 40 hex digits
    Evm,
    /// Solana, addresses are base58 public keys
    Solana,
}

/// Networks supported by the generated payment gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    Base,
    BaseSepolia,
    Avalanche,
    AvalancheFuji,
    Polygon,
    PolygonAmoy,
    Sei,
    SeiTestnet,
    Iotex,
    Solana,
    SolanaDevnet,
}

impl Network {
    /// Every supported network, mainnets first.
    pub const ALL: [Network; 11] = [
        Network::Base,
        Network::Avalanche,
        Network::Polygon,
        Network::Sei,
        Network::Iotex,
        Network::Solana,
        Network::BaseSepolia,
        Network::AvalancheFuji,
        Network::PolygonAmoy,
        Network::SeiTestnet,
        Network::SolanaDevnet,
    ];

    /// Identifier used by x402 facilitators and in the generated `.env`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Base => "base",
            Network::BaseSepolia => "base-sepolia",
            Network::Avalanche => "avalanche",
            Network::AvalancheFuji => "avalanche-fuji",
            Network::Polygon => "polygon",
            Network::PolygonAmoy => "polygon-amoy",
            Network::Sei => "sei",
            Network::SeiTestnet => "sei-testnet",
            Network::Iotex => "iotex",
            Network::Solana => "solana",
            Network::SolanaDevnet => "solana-devnet",
        }
    }

    pub fn family(&self) -> NetworkFamily {
        match self {
            Network::Solana | Network::SolanaDevnet => NetworkFamily::Solana,
            _ => NetworkFamily::Evm,
        }
    }

    pub fn is_testnet(&self) -> bool {
        matches!(
            self,
            Network::BaseSepolia
                | Network::AvalancheFuji
                | Network::PolygonAmoy
                | Network::SeiTestnet
                | Network::SolanaDevnet
        )
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a network identifier is not in [`Network::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported network `{0}`")]
pub struct UnknownNetwork(pub String);

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Network::ALL
            .into_iter()
            .find(|n| n.as_str() == wanted)
            .ok_or_else(|| UnknownNetwork(s.to_string()))
    }
}

/// Error returned when a price string is not a positive dollar amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid price `{0}`: expected a dollar amount such as $0.001")]
pub struct InvalidPrice(pub String);

/// Canonical price string: `$` followed by a positive decimal amount.
///
/// Both `0.001` and `$0.001` parse; the stored form always carries the `$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Price(String);

impl Price {
    /// The decimal amount without the currency prefix.
    pub fn amount(&self) -> &str {
        self.0.trim_start_matches('$')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Price {
    type Err = InvalidPrice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let amount = trimmed.strip_prefix('$').unwrap_or(trimmed);
        if !PRICE_AMOUNT.is_match(amount) || amount.chars().all(|c| c == '0' || c == '.') {
            return Err(InvalidPrice(s.to_string()));
        }
        Ok(Price(format!("${amount}")))
    }
}

impl TryFrom<String> for Price {
    type Error = InvalidPrice;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Price> for String {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A credential value. `Debug` never prints the contents.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Secret(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Secret(<empty>)")
        } else {
            f.write_str("Secret(***)")
        }
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Secret::new(value)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Secret(value)
    }
}

fn collected(secret: &Option<Secret>) -> bool {
    secret.as_ref().is_some_and(|s| !s.is_empty())
}

/// How the generated proxy authenticates against the upstream API.
///
/// One variant per credential placement, so "exactly one placement" holds by
/// construction. Values are optional: a proxy can be generated before the
/// secrets exist and pick them up from the environment later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum AuthConfig {
    /// API key sent in a request header
    ApiKeyHeader {
        header: String,
        #[serde(default)]
        value: Option<Secret>,
    },
    /// API key appended as a query parameter
    ApiKeyQuery {
        param: String,
        #[serde(default)]
        value: Option<Secret>,
    },
    /// API key sent as a cookie
    ApiKeyCookie {
        cookie: String,
        #[serde(default)]
        value: Option<Secret>,
    },
    /// `Authorization: Bearer <token>`
    Bearer {
        #[serde(default)]
        token: Option<Secret>,
    },
    /// `Authorization: Basic base64(username:password)`
    Basic {
        #[serde(default)]
        username: Option<Secret>,
        #[serde(default)]
        password: Option<Secret>,
    },
    /// Arbitrary headers and/or query parameters
    Custom {
        #[serde(default)]
        headers: BTreeMap<String, Secret>,
        #[serde(default)]
        query: BTreeMap<String, Secret>,
    },
}

impl AuthConfig {
    /// Human readable summary used in logs and the generated README.
    pub fn describe(&self) -> String {
        match self {
            AuthConfig::ApiKeyHeader { header, .. } => format!("API key in header `{header}`"),
            AuthConfig::ApiKeyQuery { param, .. } => {
                format!("API key in query parameter `{param}`")
            }
            AuthConfig::ApiKeyCookie { cookie, .. } => format!("API key in cookie `{cookie}`"),
            AuthConfig::Bearer { .. } => "Bearer token".to_string(),
            AuthConfig::Basic { .. } => "HTTP Basic authentication".to_string(),
            AuthConfig::Custom { headers, query } => {
                let mut parts = Vec::new();
                if !headers.is_empty() {
                    parts.push(format!("{} custom header(s)", headers.len()));
                }
                if !query.is_empty() {
                    parts.push(format!("{} custom query parameter(s)", query.len()));
                }
                parts.join(" and ")
            }
        }
    }

    /// Whether any credential value was actually supplied.
    pub fn has_collected_secrets(&self) -> bool {
        match self {
            AuthConfig::ApiKeyHeader { value, .. }
            | AuthConfig::ApiKeyQuery { value, .. }
            | AuthConfig::ApiKeyCookie { value, .. } => collected(value),
            AuthConfig::Bearer { token } => collected(token),
            AuthConfig::Basic { username, password } => collected(username) || collected(password),
            AuthConfig::Custom { headers, query } => headers
                .values()
                .chain(query.values())
                .any(|secret| !secret.is_empty()),
        }
    }
}

/// A proxied route pattern and its pricing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Exact path, wildcard (`/api/*`) or OpenAPI template (`/users/{id}`)
    pub path: String,
    /// Route-specific price; `None` falls back to the project default
    pub price: Option<Price>,
    /// Declared methods; empty accepts every method
    pub methods: Vec<Method>,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
}

impl Route {
    pub fn new(path: impl Into<String>) -> Self {
        Route {
            path: path.into(),
            price: None,
            methods: Vec::new(),
            operation_id: None,
            summary: None,
        }
    }

    pub fn with_price(mut self, price: Price) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    /// The override price when present, otherwise `default`.
    pub fn resolved_price<'a>(&'a self, default: &'a Price) -> &'a Price {
        self.price.as_ref().unwrap_or(default)
    }
}

/// Validated input to project generation.
///
/// Built once by the collector and only read afterwards.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Crate name of the generated project (`[a-z][a-z0-9-]*`)
    pub project_name: String,
    /// Free text, only used in documentation
    pub description: String,
    /// Upstream API being proxied
    pub base_url: Url,
    pub default_price: Price,
    /// Payment recipient
    pub seller_address: String,
    pub network: Network,
    pub facilitator_url: Option<Url>,
    /// Routes in registration order
    pub routes: Vec<Route>,
    pub auth: Option<AuthConfig>,
}

impl ProjectConfig {
    pub fn new(
        project_name: impl Into<String>,
        base_url: Url,
        default_price: Price,
        seller_address: impl Into<String>,
        network: Network,
    ) -> Self {
        ProjectConfig {
            project_name: project_name.into(),
            description: String::new(),
            base_url,
            default_price,
            seller_address: seller_address.into(),
            network,
            facilitator_url: None,
            routes: Vec::new(),
            auth: None,
        }
    }

    /// Configured facilitator or [`DEFAULT_FACILITATOR_URL`].
    pub fn facilitator_url(&self) -> &str {
        self.facilitator_url
            .as_ref()
            .map(Url::as_str)
            .unwrap_or(DEFAULT_FACILITATOR_URL)
    }

    /// Upstream base URL without a trailing slash.
    pub fn upstream_base(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn price_for<'a>(&'a self, route: &'a Route) -> &'a Price {
        route.resolved_price(&self.default_price)
    }
}
