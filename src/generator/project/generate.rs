use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use super::{GenerateOptions, GeneratedFile, GeneratedProject, RenderOptions};
use crate::config::{AuthConfig, NetworkFamily, ProjectConfig};
use crate::generator::auth::{AuthSnippets, EnvFileKind};
use crate::generator::dependencies_config::{
    FEATURE_AUTH_BASIC, FEATURE_NETWORK_EVM, FEATURE_NETWORK_SOLANA, FEATURE_TEMPLATED_ROUTES,
};
use crate::generator::error::GenerateError;
use crate::generator::server::ServerModule;
use crate::generator::templates::{
    render_cargo_toml, render_env, render_gitignore, render_main_rs, render_readme,
    render_toolchain,
};

/// `openapi.yaml` or `openapi.json`, following the source extension.
pub fn openapi_file_name(source: &Path) -> String {
    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|e| matches!(e.as_str(), "json" | "yaml" | "yml"))
        .unwrap_or_else(|| "yaml".to_string());
    format!("openapi.{ext}")
}

fn detected_features(config: &ProjectConfig, server: &ServerModule) -> BTreeSet<String> {
    let mut features = BTreeSet::new();
    if matches!(config.auth, Some(AuthConfig::Basic { .. })) {
        features.insert(FEATURE_AUTH_BASIC.to_string());
    }
    if server.uses_templates {
        features.insert(FEATURE_TEMPLATED_ROUTES.to_string());
    }
    features.insert(
        match config.network.family() {
            NetworkFamily::Evm => FEATURE_NETWORK_EVM,
            NetworkFamily::Solana => FEATURE_NETWORK_SOLANA,
        }
        .to_string(),
    );
    features
}

/// Render every file of the project without touching the filesystem.
///
/// Rendering twice from the same inputs yields identical output.
pub fn render_project(
    config: &ProjectConfig,
    options: &RenderOptions,
) -> Result<GeneratedProject, GenerateError> {
    if config.routes.is_empty() {
        return Err(GenerateError::NoRoutes);
    }

    let auth = config.auth.as_ref().map(AuthSnippets::build).transpose()?;
    let server = ServerModule::build(config, auth.as_ref())?;
    let features = detected_features(config, &server);
    let dependencies = options.dependencies.resolve(&features);
    let dev_dependencies = options.dependencies.resolve_dev();
    debug!(
        routes = server.routes.len(),
        handlers = server.handler_count(),
        features = ?features,
        "rendering project"
    );

    let mut files = vec![
        GeneratedFile::new("Cargo.toml", render_cargo_toml(config, &dependencies, &dev_dependencies)?),
        GeneratedFile::new("rust-toolchain.toml", render_toolchain()?),
        GeneratedFile::new(".gitignore", render_gitignore()?),
        GeneratedFile::new("src/main.rs", render_main_rs(&server)?),
    ];
    if auth.as_ref().is_some_and(AuthSnippets::has_secrets) {
        files.push(GeneratedFile::new(
            ".env",
            render_env(config, auth.as_ref(), EnvFileKind::Real)?,
        ));
    }
    files.push(GeneratedFile::new(
        ".env.example",
        render_env(config, auth.as_ref(), EnvFileKind::Example)?,
    ));
    files.push(GeneratedFile::new(
        "README.md",
        render_readme(config, &server, options.openapi_file_name.as_deref())?,
    ));

    Ok(GeneratedProject {
        name: config.project_name.clone(),
        files,
    })
}

/// Render the project and write it to `options.output_dir`.
///
/// A directory created by this call is removed again if writing fails; a
/// pre-existing directory is left in place.
pub fn generate_project(
    config: &ProjectConfig,
    options: &GenerateOptions,
) -> Result<PathBuf, GenerateError> {
    let project = render_project(config, &options.render_options())?;
    let dir = &options.output_dir;
    let created = prepare_output_dir(dir, options.force)?;

    match write_project(&project, dir, options) {
        Ok(()) => {
            info!(
                project = %project.name,
                path = %dir.display(),
                files = project.files.len(),
                "generated proxy project"
            );
            Ok(dir.clone())
        }
        Err(err) => {
            if created {
                match fs::remove_dir_all(dir) {
                    Ok(()) => warn!(path = %dir.display(), "removed partially generated project"),
                    Err(cleanup) => {
                        error!(path = %dir.display(), error = %cleanup, "failed to remove partial output")
                    }
                }
            }
            Err(err)
        }
    }
}

/// Returns whether the directory was created here.
fn prepare_output_dir(dir: &Path, force: bool) -> Result<bool, GenerateError> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .map_err(|e| GenerateError::failed("could not create the output directory", e))?;
        return Ok(true);
    }
    if !dir.is_dir() {
        return Err(GenerateError::failed(
            "output path is not a directory",
            io::Error::new(io::ErrorKind::AlreadyExists, dir.display().to_string()),
        ));
    }
    let mut entries = fs::read_dir(dir)
        .map_err(|e| GenerateError::failed("could not read the output directory", e))?;
    if entries.next().is_some() {
        if !force {
            return Err(GenerateError::OutputExists(dir.to_path_buf()));
        }
        warn!(path = %dir.display(), "output directory is not empty, overwriting generated files");
    }
    Ok(false)
}

fn write_project(
    project: &GeneratedProject,
    dir: &Path,
    options: &GenerateOptions,
) -> Result<(), GenerateError> {
    for file in &project.files {
        let path = dir.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                error!(path = %parent.display(), error = %e, "cannot create directory");
                GenerateError::failed("could not write the generated files", e)
            })?;
        }
        fs::write(&path, &file.contents).map_err(|e| {
            error!(path = %path.display(), error = %e, "cannot write file");
            GenerateError::failed("could not write the generated files", e)
        })?;
        debug!(path = %file.path.display(), bytes = file.contents.len(), "wrote file");
    }

    if let Some(source) = &options.openapi_source {
        copy_openapi(source, dir)?;
    }
    Ok(())
}

fn copy_openapi(source: &Path, dir: &Path) -> Result<(), GenerateError> {
    let name = openapi_file_name(source);
    let source_canon = fs::canonicalize(source)
        .map_err(|e| GenerateError::failed("could not locate the OpenAPI document", e))?;
    let dir_canon = fs::canonicalize(dir)
        .map_err(|e| GenerateError::failed("could not resolve the output directory", e))?;
    let dest = dir_canon.join(&name);

    if source_canon == dest {
        info!(path = %dest.display(), "OpenAPI document already in place, not copied");
        return Ok(());
    }
    fs::copy(&source_canon, &dest)
        .map_err(|e| GenerateError::failed("could not copy the OpenAPI document", e))?;
    debug!(from = %source_canon.display(), to = %dest.display(), "copied OpenAPI document");
    Ok(())
}
