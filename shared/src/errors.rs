use thiserror::Error;

/// Invalid or unresolvable construction options. Fatal: no instance is created.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("{}", crate::constants::CONTAINER_MISSING_ERROR)]
    MissingContainer,
    #[error("{msg} `{0}`", msg = crate::constants::CONTAINER_NOT_FOUND_ERROR)]
    UnresolvedContainer(String),
    #[error("option `{name}` must be {expected}")]
    InvalidOption { name: String, expected: &'static str },
    #[error("no effect registered under `{0}`")]
    UnknownEffect(String),
}

impl ConfigurationError {
    pub fn invalid(name: &str, expected: &'static str) -> Self {
        Self::InvalidOption {
            name: name.to_string(),
            expected,
        }
    }
}

/// Failures reported by a [`crate::backend::RenderBackend`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("surface #{0} does not exist")]
    UnknownSurface(u64),
    #[error("container #{0} does not exist")]
    UnknownContainer(u64),
    #[error("failed to create surface: {0}")]
    SurfaceCreation(String),
    #[error("render failed: {0}")]
    Render(String),
    #[error("failed to release {0}")]
    Release(String),
}

/// Errors raised by an effect while building or animating its scene.
#[derive(Debug, Error)]
pub enum EffectError {
    #[error("initialization failed: {0}")]
    Initialization(String),
    #[error("update failed: {0}")]
    RuntimeUpdate(String),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}
