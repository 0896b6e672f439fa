use thiserror::Error;

/// Errors surfaced by the transform layer itself or propagated from a backend.
///
/// Unresolvable types and decorators are deliberately *not* represented here;
/// the downleveling pass degrades them to an `undefined` marker instead of
/// failing the file.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("{backend} backend failed for {path}: {message}")]
    Backend {
        backend: &'static str,
        path: String,
        message: String,
    },

    #[error("invalid bundler allow-list pattern: {0}")]
    Config(#[from] globset::Error),
}

impl TransformError {
    pub fn backend(backend: &'static str, path: &str, message: impl Into<String>) -> Self {
        TransformError::Backend {
            backend,
            path: path.to_string(),
            message: message.into(),
        }
    }
}
