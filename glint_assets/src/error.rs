use std::path::{Path, PathBuf};
use std::sync::PoisonError;

use glint::GlintError;
use glint::shader::ShaderKind;
use thiserror::Error;

use crate::state::ResourceState;

fn describe_path(path: &Option<PathBuf>) -> String {
    path.as_deref()
        .map(|path: &Path| format!(" {}", path.display()))
        .unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Cannot {operation} a resource in the {state} state")]
    InvalidState {
        operation: &'static str,
        state: ResourceState,
    },

    #[error("Failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The {stage} stage failed to compile: {log}")]
    DriverCompile { stage: ShaderKind, log: String },

    #[error("Resource is busy with an in-flight load")]
    ResourceBusy,

    #[error("Failed to decode image{}", describe_path(.path))]
    Decode {
        path: Option<PathBuf>,
        #[source]
        source: ::image::ImageError,
    },

    #[error("Source lists no stages")]
    EmptySource,

    #[error("Asynchronous loads must be started inside a tokio runtime")]
    NoRuntime,

    #[error("Load task did not finish: {0}")]
    Worker(String),

    #[error("Poisoned mutex")]
    Poisoned,

    #[error(transparent)]
    Driver(#[from] GlintError),
}

impl<T> From<PoisonError<T>> for LoaderError {
    fn from(_: PoisonError<T>) -> Self {
        LoaderError::Poisoned
    }
}
