#![allow(dead_code)]

use std::path::{Path, PathBuf};
use url::Url;
use x402_proxy_gen::config::{Network, Price, ProjectConfig, Route};

/// Absolute path of a file under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Write `contents` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// `/api/*` at `$0.001` on `base`, no auth.
pub fn api_config() -> ProjectConfig {
    let mut cfg = ProjectConfig::new(
        "api-proxy",
        Url::parse("https://api.example.com").unwrap(),
        "$0.001".parse::<Price>().unwrap(),
        format!("0x{}", "1".repeat(40)),
        Network::Base,
    );
    cfg.routes = vec![Route::new("/api/*")];
    cfg
}

/// Relative paths of every file under `root`, sorted.
pub fn list_files(root: &Path) -> Vec<String> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                out.push(path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"));
            }
        }
    }
    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}
