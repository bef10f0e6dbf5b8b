//! Route pattern normalization.
//!
//! Configured patterns come in three shapes:
//!
//! | Pattern | Router path | Upstream |
//! |---|---|---|
//! | `/status` | `/status` | request path |
//! | `/api/*`, `/files/**` | `/api/{*rest}` | `/{rest}` (mount prefix stripped) |
//! | `*`, `/*`, `/**` | `/{*rest}` | request path |
//! | `/users/{id}` | `/users/{id}` | `/users/{id}` |
//! | `/a/*/b` | `/a/{wildcard1}/b` | `/a/{wildcard1}/b` |
//!
//! Upstream templates use `{name}` placeholders that the generated server
//! fills from the captured path parameters.

use super::naming::{to_snake_case, unique_name};
use std::collections::HashSet;

/// Name of the trailing catch-all capture, before de-duplication.
pub const CATCH_ALL: &str = "rest";

/// Prefix for mid-path single segment wildcards (`wildcard1`, `wildcard2`, ...).
pub const SEGMENT_WILDCARD: &str = "wildcard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRoute {
    /// Pattern as configured
    pub pattern: String,
    /// Path in axum 0.8 syntax (`{name}`, `{*name}`)
    pub axum_path: String,
    /// Upstream path template; `None` forwards the incoming request path unchanged
    pub upstream_template: Option<String>,
    /// Named single-segment captures, in path order
    pub params: Vec<String>,
    /// Whether the route captures anything at all
    pub has_params: bool,
    /// Name of the trailing catch-all capture
    pub wildcard: Option<String>,
}

impl NormalizedRoute {
    /// Exact path: no captures, request path forwarded as-is.
    pub fn is_exact(&self) -> bool {
        !self.has_params
    }

    /// Trailing wildcard with nothing but static segments before it.
    pub fn is_prefix_wildcard(&self) -> bool {
        self.wildcard.is_some() && self.params.is_empty()
    }

    /// Every capture name the handler must find at request time.
    pub fn captures(&self) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .map(String::as_str)
            .chain(self.wildcard.as_deref())
    }

    /// Router path with capture names erased, used to detect conflicting routes.
    pub fn shape(&self) -> String {
        self.axum_path
            .split('/')
            .map(|seg| {
                if seg.starts_with("{*") {
                    "*"
                } else if seg.starts_with('{') {
                    ":"
                } else {
                    seg
                }
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

enum Segment<'a> {
    Static(&'a str),
    Param(String),
    Wildcard,
}

fn classify(seg: &str) -> Segment<'_> {
    if seg == "*" || seg == "**" {
        return Segment::Wildcard;
    }
    if let Some(inner) = seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        if !inner.is_empty() && !inner.contains(['{', '}']) {
            return Segment::Param(inner.to_string());
        }
    }
    if seg.contains('{') && seg.contains('}') {
        // `{id}.json` style: capture the whole segment, forward it verbatim.
        let name = to_snake_case(seg);
        return Segment::Param(if name.is_empty() { "segment".to_string() } else { name });
    }
    Segment::Static(seg)
}

/// Normalize a configured route pattern for the generated axum router.
pub fn normalize(pattern: &str) -> NormalizedRoute {
    let trimmed = pattern.trim();
    if matches!(trimmed, "*" | "/*" | "/**") {
        return NormalizedRoute {
            pattern: pattern.to_string(),
            axum_path: format!("/{{*{CATCH_ALL}}}"),
            upstream_template: None,
            params: Vec::new(),
            has_params: true,
            wildcard: Some(CATCH_ALL.to_string()),
        };
    }

    let body = trimmed.strip_prefix('/').unwrap_or(trimmed);
    let raw_segments: Vec<&str> = body.split('/').collect();
    let last = raw_segments.len().saturating_sub(1);

    let mut taken = HashSet::new();
    let mut params = Vec::new();
    let mut wildcard = None;
    let mut wildcard_count = 0;
    let mut axum_segments = Vec::with_capacity(raw_segments.len());
    let mut template_segments = Vec::with_capacity(raw_segments.len());
    let mut all_static_before_wildcard = true;

    // Reserve explicit parameter names first so generated names never shadow them.
    for seg in &raw_segments {
        if let Segment::Param(name) = classify(seg) {
            taken.insert(name);
        }
    }

    for (idx, seg) in raw_segments.iter().enumerate() {
        match classify(seg) {
            Segment::Static(s) => {
                axum_segments.push(s.to_string());
                template_segments.push(s.to_string());
            }
            Segment::Param(name) => {
                all_static_before_wildcard = false;
                axum_segments.push(format!("{{{name}}}"));
                template_segments.push(format!("{{{name}}}"));
                if !params.contains(&name) {
                    params.push(name);
                }
            }
            Segment::Wildcard if idx == last => {
                let name = unique_name(&mut taken, CATCH_ALL);
                axum_segments.push(format!("{{*{name}}}"));
                template_segments.push(format!("{{{name}}}"));
                wildcard = Some(name);
            }
            Segment::Wildcard => {
                all_static_before_wildcard = false;
                let name = loop {
                    wildcard_count += 1;
                    let candidate = format!("{SEGMENT_WILDCARD}{wildcard_count}");
                    if taken.insert(candidate.clone()) {
                        break candidate;
                    }
                };
                axum_segments.push(format!("{{{name}}}"));
                template_segments.push(format!("{{{name}}}"));
                params.push(name);
            }
        }
    }

    let has_params = !params.is_empty() || wildcard.is_some();
    let axum_path = format!("/{}", axum_segments.join("/"));
    let upstream_template = match (&wildcard, has_params) {
        (_, false) => None,
        (Some(name), true) if all_static_before_wildcard => Some(format!("/{{{name}}}")),
        _ => Some(format!("/{}", template_segments.join("/"))),
    };

    NormalizedRoute {
        pattern: pattern.to_string(),
        axum_path,
        upstream_template,
        params,
        has_params,
        wildcard,
    }
}

/// Human readable handler slug for a pattern: `/users/{id}` -> `users_by_id`.
pub fn route_slug(pattern: &str) -> String {
    let parts: Vec<String> = pattern
        .split('/')
        .filter(|seg| !seg.is_empty())
        .map(|seg| match classify(seg) {
            Segment::Static(s) => to_snake_case(s),
            Segment::Param(name) => format!("by_{}", to_snake_case(&name)),
            Segment::Wildcard => "wildcard".to_string(),
        })
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        "root".to_string()
    } else {
        parts.join("_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_path_is_unchanged() {
        let r = normalize("/status");
        assert_eq!(r.axum_path, "/status");
        assert!(!r.has_params);
        assert!(r.is_exact());
        assert_eq!(r.upstream_template, None);

        assert_eq!(normalize("/").axum_path, "/");
        assert_eq!(normalize("/v1/health/").axum_path, "/v1/health/");
    }

    #[test]
    fn test_openapi_params() {
        let r = normalize("/users/{id}/posts/{postId}");
        assert_eq!(r.axum_path, "/users/{id}/posts/{postId}");
        assert_eq!(r.params, vec!["id", "postId"]);
        assert!(r.has_params);
        assert_eq!(r.upstream_template.as_deref(), Some("/users/{id}/posts/{postId}"));
        assert_eq!(r.wildcard, None);
    }

    #[test]
    fn test_prefix_wildcard_strips_mount() {
        for pattern in ["/api/*", "/api/**"] {
            let r = normalize(pattern);
            assert_eq!(r.axum_path, "/api/{*rest}");
            assert_eq!(r.wildcard.as_deref(), Some("rest"));
            assert!(r.is_prefix_wildcard());
            assert_eq!(r.upstream_template.as_deref(), Some("/{rest}"));
        }
    }

    #[test]
    fn test_whole_path_wildcard() {
        for pattern in ["*", "/*", "/**"] {
            let r = normalize(pattern);
            assert_eq!(r.axum_path, "/{*rest}");
            assert_eq!(r.upstream_template, None);
            assert!(r.has_params);
        }
    }

    #[test]
    fn test_mid_path_wildcards() {
        let r = normalize("/a/*/b/*/c");
        assert_eq!(r.axum_path, "/a/{wildcard1}/b/{wildcard2}/c");
        assert_eq!(r.params, vec!["wildcard1", "wildcard2"]);
        assert_eq!(
            r.upstream_template.as_deref(),
            Some("/a/{wildcard1}/b/{wildcard2}/c")
        );
    }

    #[test]
    fn test_templated_catch_all_keeps_template() {
        let r = normalize("/files/{bucket}/**");
        assert_eq!(r.axum_path, "/files/{bucket}/{*rest}");
        assert_eq!(r.upstream_template.as_deref(), Some("/files/{bucket}/{rest}"));
        assert!(!r.is_prefix_wildcard());
        assert_eq!(r.captures().collect::<Vec<_>>(), vec!["bucket", "rest"]);
    }

    #[test]
    fn test_catch_all_name_avoids_param_clash() {
        let r = normalize("/x/{rest}/*");
        assert_eq!(r.axum_path, "/x/{rest}/{*rest_1}");
        assert_eq!(r.wildcard.as_deref(), Some("rest_1"));

        let r = normalize("/x/{wildcard1}/*/y");
        assert_eq!(r.axum_path, "/x/{wildcard1}/{wildcard2}/y");
    }

    #[test]
    fn test_embedded_placeholder_captures_segment() {
        let r = normalize("/reports/{id}.json");
        assert_eq!(r.axum_path, "/reports/{id_json}");
        assert_eq!(r.upstream_template.as_deref(), Some("/reports/{id_json}"));
    }

    #[test]
    fn test_shape_erases_names() {
        assert_eq!(normalize("/u/{id}").shape(), normalize("/u/{name}").shape());
        assert_ne!(normalize("/u/{id}").shape(), normalize("/u/me").shape());
        assert_eq!(normalize("/api/*").shape(), "/api/*");
    }

    #[test]
    fn test_route_slug() {
        assert_eq!(route_slug("/users/{id}"), "users_by_id");
        assert_eq!(route_slug("/api/*"), "api_wildcard");
        assert_eq!(route_slug("/"), "root");
        assert_eq!(route_slug("*"), "wildcard");
        assert_eq!(route_slug("/v1/weather-alerts"), "v1_weather_alerts");
    }
}
