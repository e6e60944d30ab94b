//! A small OpenGL core for stepping from a single triangle to an indexed JSON mesh.
//!
//! The crate covers the parts of a demo that do not need a window: splitting and compiling
//! shaders, loading mesh documents, uploading buffers, the colour animation and the frame loop.
//! Every GPU call goes through an explicit [`gpu::Gpu`] value, and the window is reached
//! through [`render::Surface`].

pub mod config;
pub mod error;
pub mod gpu;
pub mod logging;
pub mod mesh;
pub mod pulse;
pub mod render;
pub mod shader;

pub use config::{Config, Demo};
pub use error::{Error, Result};
pub use gpu::Gpu;
pub use mesh::{Mesh, MeshData, MeshError, VertexLayout};
pub use pulse::ColorPulse;
pub use render::{FrameLoop, Surface};
pub use shader::{Shader, ShaderProgram, ShaderSource, ShaderStage, Uniform};
