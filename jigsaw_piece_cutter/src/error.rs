use std::path::PathBuf;

pub type CutterResult<T> = Result<T, CutterError>;

/// Every failure of the cutter is fatal; none of these are retried.
#[derive(thiserror::Error, Debug)]
pub enum CutterError {
    #[error("could not read init file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not convert init file: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("could not load full image {path}: {source}")]
    FullImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("could not create template piece {index} from {path}: {source}")]
    TemplateLoad {
        index: usize,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("could not create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not save piece {index} to {path}: {source}")]
    Persist {
        index: usize,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{0} stage panicked")]
    StagePanicked(&'static str),
}

impl CutterError {
    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        Self::InvalidGrid(msg.into())
    }

    /// Index of the piece the failure is attached to, if any.
    pub fn piece_index(&self) -> Option<usize> {
        match self {
            Self::TemplateLoad { index, .. } | Self::Persist { index, .. } => Some(*index),
            _ => None,
        }
    }
}
