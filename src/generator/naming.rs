//! Identifier helpers shared by the route and auth builders.

use std::collections::HashSet;
use tracing::warn;

const KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield", "gen",
];

/// Lower snake case with every non-alphanumeric run collapsed to `_`.
///
/// `getUserById` -> `get_user_by_id`, `list-pets` -> `list_pets`.
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() && prev_lower && !out.ends_with('_') {
                out.push('_');
            }
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            out.push(c.to_ascii_lowercase());
        } else {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            prev_lower = false;
        }
    }
    out.trim_end_matches('_').to_string()
}

/// Make `name` usable as a Rust function name.
pub fn sanitize_identifier(name: &str) -> String {
    let mut s = to_snake_case(name);
    if s.is_empty() {
        s.push('_');
    }
    if s.starts_with(|c: char| c.is_ascii_digit()) {
        s.insert(0, '_');
    }
    if KEYWORDS.contains(&s.as_str()) {
        s.push('_');
    }
    s
}

/// Environment variable suffix: upper case, every char outside `[A-Z0-9]` becomes `_`.
pub fn env_suffix(key: &str) -> String {
    key.chars()
        .map(|c| {
            let c = c.to_ascii_uppercase();
            if c.is_ascii_uppercase() || c.is_ascii_digit() {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Rust string literal for `s`, quotes and escapes included.
pub fn rust_str(s: &str) -> String {
    format!("{s:?}")
}

/// Return `name`, or `name_1`, `name_2`, ... if already taken, and reserve it.
pub(crate) fn unique_name(seen: &mut HashSet<String>, name: &str) -> String {
    if seen.insert(name.to_string()) {
        return name.to_string();
    }
    let mut counter = 1;
    loop {
        let candidate = format!("{name}_{counter}");
        if seen.insert(candidate.clone()) {
            warn!(name, candidate = %candidate, "duplicate identifier, renamed");
            return candidate;
        }
        counter += 1;
    }
}
