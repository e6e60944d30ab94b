//! Error types shared by every loading and GPU step.

use std::path::PathBuf;

use crate::mesh::MeshError;
use crate::shader::ShaderStage;

/// Everything that can stop a demo before or during its render loop.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("shader program failed to link: {0}")]
    Link(String),
    #[error("GPU object creation failed: {0}")]
    Gpu(String),
    #[error("uniform `{0}` is not active in the program")]
    UniformNotFound(String),
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("window setup failed: {0}")]
    Window(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
