//! Data model for the generated `src/main.rs`.
//!
//! [`ServerModule::build`] resolves everything the template needs (router
//! paths, handler names, prices, Rust literals) so the template itself only
//! iterates and prints.

use super::auth::AuthSnippets;
use super::error::GenerateError;
use super::naming::{rust_str, sanitize_identifier, unique_name};
use super::routes::{normalize, route_slug, NormalizedRoute};
use crate::config::{Network, NetworkFamily, ProjectConfig, Route, DEFAULT_PORT};
use http::Method;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Function names the template defines itself; handlers never reuse them.
const RESERVED_FNS: &[&str] = &[
    "main",
    "build_router",
    "forward",
    "forward_headers",
    "upstream_url",
    "expand_template",
    "mirror_response",
    "not_found",
    "handle_panic",
    "missing_parameter",
    "bad_gateway",
    "internal_error",
    "error_response",
    "shutdown_signal",
    "inject_credentials",
    "optional_secret",
    "set_header",
    "append_cookie",
];

/// One row of the generated `PAYWALL` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaywallEntry {
    /// Router path (axum syntax)
    pub route: String,
    /// Pattern as configured
    pub pattern: String,
    /// Canonical price, e.g. `$0.001`
    pub price: String,
    /// Bare decimal amount handed to the payment middleware
    pub amount: String,
    pub description: String,
}

impl PaywallEntry {
    pub fn route_lit(&self) -> String {
        rust_str(&self.route)
    }

    pub fn pattern_lit(&self) -> String {
        rust_str(&self.pattern)
    }

    pub fn price_lit(&self) -> String {
        rust_str(&self.price)
    }

    pub fn amount_lit(&self) -> String {
        rust_str(&self.amount)
    }

    pub fn description_lit(&self) -> String {
        rust_str(&self.description)
    }
}

/// A forwarding handler function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerEntry {
    pub fn_name: String,
    /// Doc line, e.g. `GET /users/{id}`
    pub doc: String,
    /// `None` accepts every method
    pub method: Option<Method>,
    /// Upstream template as a Rust literal; `None` forwards the request path
    pub template_lit: Option<String>,
    /// `Some("rest")` / `None` as Rust source
    pub catch_all_expr: String,
}

impl HandlerEntry {
    pub fn extracts_params(&self) -> bool {
        self.template_lit.is_some()
    }
}

/// One `.route(...)` registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// Index into `PAYWALL`
    pub index: usize,
    pub normalized: NormalizedRoute,
    pub price: String,
    /// `ANY` or a comma separated method list
    pub methods_label: String,
    /// Method router expression, e.g. `get(get_users).post(post_users)`
    pub method_router: String,
    pub handlers: Vec<HandlerEntry>,
    pub summary: Option<String>,
}

/// `NETWORK` value and the `USDC::<ctor>()` deployment it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkArm {
    pub name: String,
    pub ctor: String,
}

/// Payment scheme wiring for the configured network family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentScheme {
    pub evm: bool,
    /// Type providing `price_tag`, e.g. `V1Eip155Exact`
    pub scheme_type: &'static str,
    /// Crate exporting `scheme_type` and `known_networks_trait`
    pub chain_crate: &'static str,
    /// Trait that adds the `USDC::<network>()` constructors
    pub known_networks_trait: &'static str,
    pub networks: Vec<NetworkArm>,
}

impl PaymentScheme {
    pub fn for_family(family: NetworkFamily) -> Self {
        let networks = Network::ALL
            .into_iter()
            .filter(|n| n.family() == family)
            .map(|n| NetworkArm {
                name: n.as_str().to_string(),
                ctor: n.as_str().replace('-', "_"),
            })
            .collect();
        match family {
            NetworkFamily::Evm => PaymentScheme {
                evm: true,
                scheme_type: "V1Eip155Exact",
                chain_crate: "x402_chain_eip155",
                known_networks_trait: "KnownNetworkEip155",
                networks,
            },
            NetworkFamily::Solana => PaymentScheme {
                evm: false,
                scheme_type: "V1SolanaExact",
                chain_crate: "x402_chain_solana",
                known_networks_trait: "KnownNetworkSolana",
                networks,
            },
        }
    }

    /// `use` line bringing the scheme and the USDC constructors into scope.
    pub fn chain_import(&self) -> String {
        format!(
            "use {}::{{{}, {}}};",
            self.chain_crate, self.known_networks_trait, self.scheme_type
        )
    }

    /// `"base", "base-sepolia", ...` for the generated `SUPPORTED_NETWORKS`.
    pub fn network_list(&self) -> String {
        self.networks
            .iter()
            .map(|n| rust_str(&n.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Everything `main.rs.txt` renders.
#[derive(Debug, Clone)]
pub struct ServerModule {
    pub project_name: String,
    pub routes: Vec<RouteEntry>,
    pub paywall: Vec<PaywallEntry>,
    pub auth: Option<AuthSnippets>,
    /// Free functions imported from `axum::routing`
    pub routing_imports: Vec<String>,
    /// Some handler substitutes an upstream template
    pub uses_templates: bool,
    pub payment: PaymentScheme,
    pub default_base_url: String,
    pub default_facilitator_url: String,
    pub default_port: u16,
    /// A path no route matches, when one exists; used by the generated tests
    pub unrouted_path: Option<String>,
}

/// First segment of [`ServerModule::unrouted_path`].
const UNROUTED_SEGMENT: &str = "__unrouted__";

impl ServerModule {
    pub fn build(config: &ProjectConfig, auth: Option<&AuthSnippets>) -> Result<Self, GenerateError> {
        if config.routes.is_empty() {
            return Err(GenerateError::NoRoutes);
        }

        let mut seen_fns: HashSet<String> = RESERVED_FNS.iter().map(|s| s.to_string()).collect();
        let mut shapes: HashMap<String, String> = HashMap::new();
        let mut routing_imports = BTreeSet::new();
        let mut routes = Vec::with_capacity(config.routes.len());
        let mut paywall = Vec::with_capacity(config.routes.len());

        for (index, route) in config.routes.iter().enumerate() {
            let normalized = normalize(&route.path);
            if let Some(first) = shapes.insert(normalized.shape(), route.path.clone()) {
                return Err(GenerateError::DuplicateRoute {
                    first,
                    second: route.path.clone(),
                    axum_path: normalized.axum_path,
                });
            }

            let price = config.price_for(route);
            let handlers = handlers_for(route, &normalized, &mut seen_fns);
            let method_router = method_router(&handlers, &mut routing_imports);
            let methods_label = if route.methods.is_empty() {
                "ANY".to_string()
            } else {
                route
                    .methods
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            };

            paywall.push(PaywallEntry {
                route: normalized.axum_path.clone(),
                pattern: route.path.clone(),
                price: price.to_string(),
                amount: price.amount().to_string(),
                description: route
                    .summary
                    .clone()
                    .unwrap_or_else(|| format!("Access to {}", route.path)),
            });
            routes.push(RouteEntry {
                index,
                normalized,
                price: price.to_string(),
                methods_label,
                method_router,
                handlers,
                summary: route.summary.clone(),
            });
        }

        let uses_templates = routes
            .iter()
            .flat_map(|r| &r.handlers)
            .any(HandlerEntry::extracts_params);
        let unrouted_path = routes
            .iter()
            .all(|r| {
                let first = r.normalized.axum_path.trim_start_matches('/');
                let first = first.split('/').next().unwrap_or_default();
                !first.starts_with('{') && first != UNROUTED_SEGMENT
            })
            .then(|| format!("/{UNROUTED_SEGMENT}/path"));

        Ok(ServerModule {
            project_name: config.project_name.clone(),
            routes,
            paywall,
            auth: auth.cloned(),
            routing_imports: routing_imports.into_iter().collect(),
            uses_templates,
            payment: PaymentScheme::for_family(config.network.family()),
            default_base_url: config.upstream_base().to_string(),
            default_facilitator_url: config.facilitator_url().to_string(),
            default_port: DEFAULT_PORT,
            unrouted_path,
        })
    }

    /// A handler that substitutes captured parameters, if any route has one.
    pub fn first_templated_handler(&self) -> Option<&HandlerEntry> {
        self.routes
            .iter()
            .flat_map(|r| &r.handlers)
            .find(|h| h.extracts_params())
    }

    pub fn handler_count(&self) -> usize {
        self.routes.iter().map(|r| r.handlers.len()).sum()
    }

    pub fn default_base_url_lit(&self) -> String {
        rust_str(&self.default_base_url)
    }
}

fn handlers_for(
    route: &Route,
    normalized: &NormalizedRoute,
    seen: &mut HashSet<String>,
) -> Vec<HandlerEntry> {
    let slug = route_slug(&route.path);
    let template_lit = normalized.upstream_template.as_deref().map(rust_str);
    let catch_all_expr = match (&normalized.wildcard, &template_lit) {
        (Some(name), Some(_)) => format!("Some({})", rust_str(name)),
        _ => "None".to_string(),
    };
    let doc_suffix = route
        .summary
        .as_deref()
        .map(|s| format!(": {}", s.lines().next().unwrap_or_default().trim()))
        .unwrap_or_default();

    if route.methods.is_empty() {
        let fn_name = unique_name(seen, &sanitize_identifier(&format!("proxy_{slug}")));
        return vec![HandlerEntry {
            fn_name,
            doc: format!("Any method on `{}`{doc_suffix}", route.path),
            method: None,
            template_lit,
            catch_all_expr,
        }];
    }

    route
        .methods
        .iter()
        .map(|method| {
            let base = match (&route.operation_id, route.methods.len()) {
                (Some(op), 1) => sanitize_identifier(op),
                _ => sanitize_identifier(&format!(
                    "{}_{slug}",
                    method.as_str().to_ascii_lowercase()
                )),
            };
            HandlerEntry {
                fn_name: unique_name(seen, &base),
                doc: format!("`{} {}`{doc_suffix}", method, route.path),
                method: Some(method.clone()),
                template_lit: template_lit.clone(),
                catch_all_expr: catch_all_expr.clone(),
            }
        })
        .collect()
}

fn routing_fn(method: &Method) -> String {
    method.as_str().to_ascii_lowercase()
}

fn method_router(handlers: &[HandlerEntry], imports: &mut BTreeSet<String>) -> String {
    let mut expr = String::new();
    for (i, handler) in handlers.iter().enumerate() {
        let call = match &handler.method {
            Some(method) => routing_fn(method),
            None => "any".to_string(),
        };
        if i == 0 {
            imports.insert(call.clone());
            expr.push_str(&format!("{call}({})", handler.fn_name));
        } else {
            expr.push_str(&format!(".{call}({})", handler.fn_name));
        }
    }
    expr
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Price, Route};
    use url::Url;

    fn config(routes: Vec<Route>) -> ProjectConfig {
        let mut cfg = ProjectConfig::new(
            "demo",
            Url::parse("https://api.example.com/").unwrap(),
            "$0.001".parse::<Price>().unwrap(),
            format!("0x{}", "1".repeat(40)),
            Network::Base,
        );
        cfg.routes = routes;
        cfg
    }

    #[test]
    fn test_any_method_route() {
        let module = ServerModule::build(&config(vec![Route::new("/api/*")]), None).unwrap();
        let route = &module.routes[0];
        assert_eq!(route.method_router, "any(proxy_api_wildcard)");
        assert_eq!(route.methods_label, "ANY");
        assert_eq!(module.routing_imports, vec!["any"]);
        assert_eq!(route.handlers[0].catch_all_expr, "Some(\"rest\")");
        assert_eq!(module.default_base_url, "https://api.example.com");
    }

    #[test]
    fn test_declared_methods_get_one_handler_each() {
        let route = Route::new("/pets/{petId}").with_methods([Method::GET, Method::DELETE]);
        let module = ServerModule::build(&config(vec![route]), None).unwrap();
        let entry = &module.routes[0];
        let names: Vec<_> = entry.handlers.iter().map(|h| h.fn_name.as_str()).collect();
        assert_eq!(names, vec!["get_pets_by_pet_id", "delete_pets_by_pet_id"]);
        assert_eq!(
            entry.method_router,
            "get(get_pets_by_pet_id).delete(delete_pets_by_pet_id)"
        );
        assert_eq!(entry.methods_label, "GET, DELETE");
        assert!(module.uses_templates);
        assert_eq!(entry.handlers[0].catch_all_expr, "None");
    }

    #[test]
    fn test_operation_id_names_single_method_handler() {
        let mut route = Route::new("/pets").with_methods([Method::GET]);
        route.operation_id = Some("listPets".into());
        let module = ServerModule::build(&config(vec![route]), None).unwrap();
        assert_eq!(module.routes[0].handlers[0].fn_name, "list_pets");
    }

    #[test]
    fn test_handler_names_avoid_template_functions() {
        let mut route = Route::new("/forward").with_methods([Method::POST]);
        route.operation_id = Some("forward".into());
        let module = ServerModule::build(&config(vec![route]), None).unwrap();
        assert_eq!(module.routes[0].handlers[0].fn_name, "forward_1");
    }

    #[test]
    fn test_duplicate_shapes_are_rejected() {
        let err = ServerModule::build(
            &config(vec![Route::new("/u/{id}"), Route::new("/u/{name}")]),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, GenerateError::DuplicateRoute { .. }));
    }

    #[test]
    fn test_no_routes() {
        assert!(matches!(
            ServerModule::build(&config(Vec::new()), None),
            Err(GenerateError::NoRoutes)
        ));
    }

    #[test]
    fn test_unrouted_path_only_without_root_captures() {
        let module = ServerModule::build(
            &config(vec![Route::new("/api/*"), Route::new("/users/{id}")]),
            None,
        )
        .unwrap();
        assert_eq!(module.unrouted_path.as_deref(), Some("/__unrouted__/path"));
        assert_eq!(
            module.first_templated_handler().map(|h| h.fn_name.as_str()),
            Some("proxy_api_wildcard")
        );

        let module = ServerModule::build(&config(vec![Route::new("/*")]), None).unwrap();
        assert!(module.unrouted_path.is_none());
        assert!(module.first_templated_handler().is_none());

        let module = ServerModule::build(&config(vec![Route::new("/{tenant}/x")]), None).unwrap();
        assert!(module.unrouted_path.is_none());
    }

    #[test]
    fn test_payment_scheme_by_family() {
        let evm = PaymentScheme::for_family(NetworkFamily::Evm);
        assert!(evm.evm);
        assert!(evm.networks.iter().any(|n| n.ctor == "base_sepolia"));
        assert!(!evm.networks.iter().any(|n| n.name == "solana"));
        assert_eq!(
            evm.chain_import(),
            "use x402_chain_eip155::{KnownNetworkEip155, V1Eip155Exact};"
        );
        let sol = PaymentScheme::for_family(NetworkFamily::Solana);
        assert_eq!(sol.network_list(), "\"solana\", \"solana-devnet\"");
        assert_eq!(
            sol.chain_import(),
            "use x402_chain_solana::{KnownNetworkSolana, V1SolanaExact};"
        );
    }
}
