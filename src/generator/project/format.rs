use std::path::Path;
use std::process::Command;

/// Overrides the cargo binary used by [`format_project`].
pub const CARGO_BIN_ENV: &str = "X402_PROXY_GEN_CARGO_BIN";

/// Run `cargo fmt` inside a generated project.
pub fn format_project(dir: &Path) -> anyhow::Result<()> {
    let cargo_bin = std::env::var(CARGO_BIN_ENV).unwrap_or_else(|_| "cargo".to_string());

    let status = Command::new(&cargo_bin)
        .arg("fmt")
        .current_dir(dir)
        .status()
        .map_err(|err| anyhow::anyhow!("failed to run `{cargo_bin} fmt`: {err}"))?;
    if !status.success() {
        anyhow::bail!("`{cargo_bin} fmt` exited with {status}");
    }
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::{Mutex, OnceLock};

    // Serialize environment mutations to avoid test races
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn with_stub_cargo(exit_code: i32) -> anyhow::Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let stub = dir.path().join("cargo");
        fs::write(
            &stub,
            format!("#!/bin/sh\nif [ \"$1\" = \"fmt\" ]; then\n    exit {exit_code}\nfi\nexit 0\n"),
        )
        .unwrap();
        let mut perms = fs::metadata(&stub).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&stub, perms).unwrap();

        let _guard = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let old_bin = env::var(CARGO_BIN_ENV).ok();
        env::set_var(CARGO_BIN_ENV, &stub);
        let res = format_project(dir.path());
        match old_bin {
            Some(v) => env::set_var(CARGO_BIN_ENV, v),
            None => env::remove_var(CARGO_BIN_ENV),
        }
        res
    }

    #[test]
    fn test_format_project_noop() {
        assert!(with_stub_cargo(0).is_ok());
    }

    #[test]
    fn test_format_project_error() {
        let err = with_stub_cargo(1).unwrap_err();
        assert!(err.to_string().contains("fmt"));
    }

    #[test]
    fn test_format_project_missing_binary() {
        let _guard = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let old_bin = env::var(CARGO_BIN_ENV).ok();
        env::set_var(CARGO_BIN_ENV, "/nonexistent/cargo-binary");
        let res = format_project(Path::new("."));
        match old_bin {
            Some(v) => env::set_var(CARGO_BIN_ENV, v),
            None => env::remove_var(CARGO_BIN_ENV),
        }
        assert!(res.is_err());
    }
}
