use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while rendering or writing a proxy project.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Nothing to proxy; raised before any text is assembled.
    #[error("cannot generate a proxy without routes")]
    NoRoutes,

    /// Two routes resolve to the same router path.
    #[error("routes `{first}` and `{second}` both resolve to `{axum_path}`")]
    DuplicateRoute {
        first: String,
        second: String,
        axum_path: String,
    },

    /// Two custom auth keys sanitize to the same environment variable.
    #[error("auth keys `{first}` and `{second}` both map to environment variable `{name}`")]
    EnvVarCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error("failed to render {template}")]
    Render {
        template: &'static str,
        #[source]
        source: askama::Error,
    },

    /// Output directory already holds files and `force` was not set.
    #[error("output directory {} is not empty (use --force to overwrite)", .0.display())]
    OutputExists(PathBuf),

    /// Any I/O failure while writing the project.
    #[error("project generation failed: {message}")]
    Failed {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl GenerateError {
    pub(crate) fn failed(message: impl Into<String>, source: std::io::Error) -> Self {
        GenerateError::Failed {
            message: message.into(),
            source,
        }
    }
}
