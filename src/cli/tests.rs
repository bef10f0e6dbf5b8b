//! Unit tests for CLI commands

use crate::cli::{Cli, Commands};
use clap::Parser;

#[test]
fn test_generate_defaults() {
    let cli = Cli::try_parse_from(["x402-proxy-gen", "generate", "--config", "proxy.toml"]).unwrap();

    match cli.command {
        Commands::Generate {
            config,
            output,
            openapi,
            force,
            dry_run,
            skip_fmt,
            dependencies_config,
        } => {
            assert_eq!(config.to_string_lossy(), "proxy.toml");
            assert!(output.is_none());
            assert!(openapi.is_none());
            assert!(!force && !dry_run && !skip_fmt);
            assert!(dependencies_config.is_none());
        }
        _ => panic!("Expected Generate command"),
    }
}

#[test]
fn test_generate_with_flags() {
    let cli = Cli::try_parse_from([
        "x402-proxy-gen",
        "generate",
        "-c",
        "proxy.yaml",
        "-o",
        "out/proxy",
        "--openapi",
        "api.json",
        "--force",
        "--dry-run",
        "--skip-fmt",
        "--dependencies-config",
        "deps.toml",
    ])
    .unwrap();

    match cli.command {
        Commands::Generate {
            output,
            openapi,
            force,
            dry_run,
            skip_fmt,
            dependencies_config,
            ..
        } => {
            assert_eq!(output.unwrap().to_string_lossy(), "out/proxy");
            assert_eq!(openapi.unwrap().to_string_lossy(), "api.json");
            assert!(force && dry_run && skip_fmt);
            assert_eq!(dependencies_config.unwrap().to_string_lossy(), "deps.toml");
        }
        _ => panic!("Expected Generate command"),
    }
}

#[test]
fn test_generate_requires_config() {
    assert!(Cli::try_parse_from(["x402-proxy-gen", "generate"]).is_err());
}

#[test]
fn test_inspect_command() {
    let cli = Cli::try_parse_from(["x402-proxy-gen", "inspect", "--openapi", "api.yaml"]).unwrap();
    match cli.command {
        Commands::Inspect { openapi } => assert_eq!(openapi.to_string_lossy(), "api.yaml"),
        _ => panic!("Expected Inspect command"),
    }
}

#[test]
fn test_unknown_command_is_rejected() {
    assert!(Cli::try_parse_from(["x402-proxy-gen", "serve"]).is_err());
}
