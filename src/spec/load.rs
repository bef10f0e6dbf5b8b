use super::types::{ApiKeyLocation, Endpoint, OpenApiSurface, SecurityScheme, SecuritySchemeKind};
use anyhow::Context;
use oas3::OpenApiV3Spec;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

fn strip_unknown_verbs(val: &mut Value) {
    const METHODS: [&str; 8] = ["get", "post", "put", "delete", "patch", "options", "head", "trace"];

    let Some(Value::Object(paths_map)) = val.get_mut("paths") else {
        return;
    };
    for item in paths_map.values_mut() {
        if let Value::Object(obj) = item {
            obj.retain(|k, _| {
                let lk = k.to_ascii_lowercase();
                match lk.as_str() {
                    "summary" | "description" | "servers" | "parameters" | "$ref" => true,
                    m if METHODS.contains(&m) => true,
                    _ => k.starts_with("x-"),
                }
            });
        }
    }
}

/// Read an OpenAPI document into a JSON value, choosing the parser by extension.
fn read_document(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read OpenAPI document {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let value = if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse {} as YAML", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {} as JSON", path.display()))?
    };
    Ok(value)
}

/// Collect the `apiKey` and `http` security schemes; everything else is dropped.
pub fn extract_security_schemes(doc: &Value) -> Vec<SecurityScheme> {
    let Some(schemes) = doc
        .pointer("/components/securitySchemes")
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for (name, scheme) in schemes {
        let field = |key: &str| scheme.get(key).and_then(Value::as_str).map(str::to_string);
        let kind = match field("type").as_deref() {
            Some("apiKey") => {
                let location = field("in").as_deref().and_then(ApiKeyLocation::parse);
                match (location, field("name")) {
                    (Some(location), Some(param_name)) if !param_name.is_empty() => {
                        SecuritySchemeKind::ApiKey {
                            location,
                            param_name,
                        }
                    }
                    _ => {
                        warn!(scheme = %name, "apiKey scheme without a usable `in`/`name`, skipping");
                        continue;
                    }
                }
            }
            Some("http") => match field("scheme") {
                Some(http_scheme) => SecuritySchemeKind::Http {
                    scheme: http_scheme.to_ascii_lowercase(),
                    bearer_format: field("bearerFormat"),
                },
                None => {
                    warn!(scheme = %name, "http scheme without `scheme`, skipping");
                    continue;
                }
            },
            other => {
                debug!(scheme = %name, kind = ?other, "ignoring unsupported security scheme");
                continue;
            }
        };
        out.push(SecurityScheme {
            name: name.clone(),
            kind,
            description: field("description"),
        });
    }
    out
}

/// Turn the typed document into one [`Endpoint`] per path.
pub fn build_endpoints(spec: &OpenApiV3Spec) -> Vec<Endpoint> {
    let mut endpoints = Vec::new();
    let Some(paths_map) = spec.paths.as_ref() else {
        return endpoints;
    };
    for (path, item) in paths_map {
        let mut methods = Vec::new();
        let mut operation_ids = Vec::new();
        let mut summary = item.summary.clone();
        for (method, operation) in item.methods() {
            if let Some(id) = operation.operation_id.as_ref() {
                operation_ids.push(id.clone());
            }
            if summary.is_none() {
                summary = operation.summary.clone();
            }
            methods.push(method.clone());
        }
        if methods.is_empty() {
            debug!(path = %path, "path declares no operations, skipping");
            continue;
        }
        let operation_id = match (methods.len(), operation_ids.len()) {
            (1, 1) => operation_ids.pop(),
            _ => None,
        };
        endpoints.push(Endpoint {
            path: path.clone(),
            methods,
            operation_id,
            summary,
        });
    }
    endpoints
}

/// Load an OpenAPI 3 document (YAML or JSON) and extract its routable surface.
pub fn load_openapi(path: &Path) -> anyhow::Result<OpenApiSurface> {
    let mut value = read_document(path)?;
    let security_schemes = extract_security_schemes(&value);

    strip_unknown_verbs(&mut value);
    let spec: OpenApiV3Spec = serde_json::from_value(value)
        .with_context(|| format!("{} is not a valid OpenAPI 3 document", path.display()))?;

    let endpoints = build_endpoints(&spec);
    debug!(
        title = %spec.info.title,
        endpoints = endpoints.len(),
        schemes = security_schemes.len(),
        "loaded OpenAPI document"
    );
    Ok(OpenApiSurface {
        title: spec.info.title.clone(),
        endpoints,
        security_schemes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_unknown_verbs() {
        let mut v = json!({
            "paths": {
                "/x": { "get": {}, "patch": {}, "unknown": {}, "x-rate": 1 }
            }
        });
        strip_unknown_verbs(&mut v);
        assert!(v["paths"]["/x"].get("unknown").is_none());
        assert!(v["paths"]["/x"].get("x-rate").is_some());
        assert!(v["paths"]["/x"].get("patch").is_some());
    }

    #[test]
    fn test_extract_security_schemes_filters_oauth() {
        let doc = json!({
            "components": {
                "securitySchemes": {
                    "key": { "type": "apiKey", "in": "header", "name": "X-API-Key" },
                    "basic": { "type": "http", "scheme": "Basic" },
                    "jwt": { "type": "http", "scheme": "bearer", "bearerFormat": "JWT" },
                    "oauth": { "type": "oauth2", "flows": {} },
                    "oidc": { "type": "openIdConnect", "openIdConnectUrl": "https://x" },
                    "mtls": { "type": "mutualTLS" }
                }
            }
        });
        let schemes = extract_security_schemes(&doc);
        let mut names: Vec<_> = schemes.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["basic", "jwt", "key"]);
        let jwt = schemes.iter().find(|s| s.name == "jwt").unwrap();
        assert_eq!(
            jwt.kind,
            SecuritySchemeKind::Http {
                scheme: "bearer".into(),
                bearer_format: Some("JWT".into())
            }
        );
    }

    #[test]
    fn test_extract_security_schemes_without_components() {
        assert!(extract_security_schemes(&json!({"openapi": "3.0.0"})).is_empty());
    }
}
