//! Rendering and persisting a complete proxy project.
//!
//! [`render_project`] is pure: it turns a [`ProjectConfig`](crate::config::ProjectConfig)
//! into an in-memory [`GeneratedProject`]. [`generate_project`] renders and
//! then writes the files, cleaning up a directory it created itself if any
//! write fails.

mod format;
mod generate;

pub use format::{format_project, CARGO_BIN_ENV};
pub use generate::{generate_project, openapi_file_name, render_project};

use super::dependencies_config::DependenciesConfig;
use std::path::{Path, PathBuf};

/// A file of the generated project, relative to its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, contents: String) -> Self {
        GeneratedFile {
            path: path.into(),
            contents,
        }
    }
}

/// Rendered project, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedProject {
    pub name: String,
    pub files: Vec<GeneratedFile>,
}

impl GeneratedProject {
    pub fn file(&self, path: impl AsRef<Path>) -> Option<&GeneratedFile> {
        let path = path.as_ref();
        self.files.iter().find(|f| f.path == path)
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.file(path).map(|f| f.contents.as_str())
    }
}

/// Inputs of [`render_project`] besides the project configuration.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub dependencies: DependenciesConfig,
    /// Name of the OpenAPI copy inside the project, mentioned in the README
    pub openapi_file_name: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            dependencies: DependenciesConfig::defaults(),
            openapi_file_name: None,
        }
    }
}

/// Inputs of [`generate_project`].
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub output_dir: PathBuf,
    /// Write into a non-empty directory
    pub force: bool,
    /// OpenAPI document to copy next to the generated sources
    pub openapi_source: Option<PathBuf>,
    pub dependencies: DependenciesConfig,
}

impl GenerateOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        GenerateOptions {
            output_dir: output_dir.into(),
            force: false,
            openapi_source: None,
            dependencies: DependenciesConfig::defaults(),
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            dependencies: self.dependencies.clone(),
            openapi_file_name: self.openapi_source.as_deref().map(openapi_file_name),
        }
    }
}
