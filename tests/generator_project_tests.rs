mod common;

use common::{api_config, fixture, list_files};
use x402_proxy_gen::config::{load_config, AuthConfig};
use x402_proxy_gen::generator::{generate_project, GenerateError, GenerateOptions};

#[test]
fn test_generate_writes_project() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("api-proxy");
    let written = generate_project(&api_config(), &GenerateOptions::new(&out)).unwrap();
    assert_eq!(written, out);
    assert_eq!(
        list_files(&out),
        vec![
            ".env.example",
            ".gitignore",
            "Cargo.toml",
            "README.md",
            "rust-toolchain.toml",
            "src/main.rs",
        ]
    );
    let main_rs = std::fs::read_to_string(out.join("src/main.rs")).unwrap();
    assert!(main_rs.contains("#[tokio::main]"));
}

#[test]
fn test_env_file_holds_collected_secrets() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("proxy");
    let mut cfg = api_config();
    cfg.auth = Some(AuthConfig::ApiKeyQuery {
        param: "apikey".into(),
        value: Some("s3cret".into()),
    });
    generate_project(&cfg, &GenerateOptions::new(&out)).unwrap();
    let env = std::fs::read_to_string(out.join(".env")).unwrap();
    assert!(env.contains("=s3cret"));
    let example = std::fs::read_to_string(out.join(".env.example")).unwrap();
    assert!(!example.contains("s3cret"));
}

#[test]
fn test_non_empty_output_requires_force() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "keep me").unwrap();

    let err = generate_project(&api_config(), &GenerateOptions::new(dir.path())).unwrap_err();
    assert!(matches!(err, GenerateError::OutputExists(_)));
    assert!(!dir.path().join("Cargo.toml").exists());

    let mut options = GenerateOptions::new(dir.path());
    options.force = true;
    generate_project(&api_config(), &options).unwrap();
    assert!(dir.path().join("Cargo.toml").exists());
    assert!(dir.path().join("notes.txt").exists());
}

#[test]
fn test_failed_generation_removes_created_directory() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("proxy");
    let mut options = GenerateOptions::new(&out);
    options.openapi_source = Some(dir.path().join("missing.yaml"));

    let err = generate_project(&api_config(), &options).unwrap_err();
    assert!(matches!(err, GenerateError::Failed { .. }));
    assert!(!out.exists());
}

#[test]
fn test_failed_generation_keeps_existing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = GenerateOptions::new(dir.path());
    options.openapi_source = Some(dir.path().join("missing.yaml"));

    assert!(generate_project(&api_config(), &options).is_err());
    assert!(dir.path().exists());
}

#[test]
fn test_openapi_document_is_copied() {
    let loaded = load_config(&fixture("proxy.yaml"), None).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("pet-store-proxy");
    let mut options = GenerateOptions::new(&out);
    options.openapi_source = loaded.openapi.clone();

    generate_project(&loaded.project, &options).unwrap();
    let copied = std::fs::read_to_string(out.join("openapi.yaml")).unwrap();
    assert!(copied.contains("title: Pet Store"));
    let readme = std::fs::read_to_string(out.join("README.md")).unwrap();
    assert!(readme.contains("openapi.yaml"));
    assert!(readme.contains("`/pets/{petId}`"));
}
