use thiserror::Error;

/// Failures raised by light-source operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LightError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("light capacity reached ({0} lights)")]
    CapacityReached(usize),

    #[error("no light at slot {0}")]
    NoSuchLight(usize),
}

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: {message}")]
    Parse {
        path: String,
        line: usize,
        message: String,
    },

    #[error("{0} contains no triangles")]
    Empty(String),

    #[error("cannot decode image {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// Startup failures. Anything of this type ends the process.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("SDL error: {0}")]
    Sdl(String),

    #[error("{0}")]
    Shader(String),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Light(#[from] LightError),
}

pub type Result<T> = std::result::Result<T, AppError>;
