//! Mesh data and GPU meshes.
//!
//! [`MeshData`] is loaded from a JSON document of the form
//! `{ "geometry_object": { "vertices": [..], "triangles": [..] } }` and holds flat position and
//! index arrays. [`Mesh`] uploads positions (and optionally indices) into a vertex array on the GPU.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::gpu::{BufferTarget, Gpu};

/// How many floats make up one vertex position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexLayout {
    Position2D,
    Position3D,
}

impl VertexLayout {
    pub fn components(self) -> usize {
        match self {
            VertexLayout::Position2D => 2,
            VertexLayout::Position3D => 3,
        }
    }

    /// Size of one vertex in bytes.
    pub fn stride(self) -> usize {
        self.components() * size_of::<f32>()
    }
}

/// The class of a mesh document parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Not valid JSON.
    Syntax,
    /// Valid JSON with a value of the wrong type, e.g. a negative triangle index.
    Data,
    /// The document ended early.
    Eof,
    Io,
}

impl From<serde_json::error::Category> for ParseErrorKind {
    fn from(category: serde_json::error::Category) -> Self {
        use serde_json::error::Category;
        match category {
            Category::Syntax => ParseErrorKind::Syntax,
            Category::Data => ParseErrorKind::Data,
            Category::Eof => ParseErrorKind::Eof,
            Category::Io => ParseErrorKind::Io,
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParseErrorKind::Syntax => "syntax",
            ParseErrorKind::Data => "data",
            ParseErrorKind::Eof => "unexpected end of input",
            ParseErrorKind::Io => "i/o",
        };
        f.write_str(name)
    }
}

/// Why a mesh document could not be turned into [`MeshData`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    /// The text is not a document of the expected shape. `offset` is a byte index into it.
    #[error("{kind} error in mesh document at line {line}, column {column} (byte {offset}): {message}")]
    Parse {
        kind: ParseErrorKind,
        line: usize,
        column: usize,
        offset: usize,
        message: String,
    },
    /// A required object or array is absent.
    #[error("mesh document has no `{0}` field")]
    MissingField(&'static str),
}

#[derive(Deserialize)]
struct RawDocument {
    geometry_object: Option<RawGeometry>,
}

#[derive(Deserialize)]
struct RawGeometry {
    vertices: Option<Vec<f64>>,
    triangles: Option<Vec<u32>>,
}

/// Flat vertex positions plus triangle-corner indices into them.
///
/// Indices are not checked against the vertex count when loading, since the stride is only
/// known once a [`VertexLayout`] is chosen. See [`MeshData::check_indices`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Parses a mesh document.
    pub fn from_json(text: &str) -> Result<Self, MeshError> {
        let document: RawDocument = serde_json::from_str(text).map_err(|e| {
            let error = MeshError::Parse {
                kind: e.classify().into(),
                line: e.line(),
                column: e.column(),
                offset: byte_offset(text, e.line(), e.column()),
                message: e.to_string(),
            };
            log::error!("{error}");
            error
        })?;

        let geometry = document
            .geometry_object
            .ok_or(MeshError::MissingField("geometry_object"))?;
        let vertices = geometry
            .vertices
            .ok_or(MeshError::MissingField("vertices"))?;
        let triangles = geometry
            .triangles
            .ok_or(MeshError::MissingField("triangles"))?;

        Ok(Self {
            vertices: vertices.into_iter().map(|v| v as f32).collect(),
            indices: triangles,
        })
    }

    /// Reads and parses a mesh document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mesh = Self::from_json(&text)?;
        log::info!(
            "Loaded mesh {} ({} floats, {} indices)",
            path.display(),
            mesh.vertices.len(),
            mesh.indices.len()
        );
        Ok(mesh)
    }

    /// Number of whole vertices when positions are read with `layout`.
    pub fn vertex_count(&self, layout: VertexLayout) -> usize {
        self.vertices.len() / layout.components()
    }

    /// Checks that every index refers to an existing vertex.
    pub fn check_indices(&self, layout: VertexLayout) -> Result<()> {
        let vertex_count = self.vertex_count(layout);
        match self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            Some(&index) => Err(Error::IndexOutOfRange {
                index,
                vertex_count,
            }),
            None => Ok(()),
        }
    }
}

/// Converts serde_json's 1-based line/column into a byte offset into `text`.
fn byte_offset(text: &str, line: usize, column: usize) -> usize {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(text.len())
}

fn as_bytes<T: Copy>(data: &[T]) -> &[u8] {
    // only used with f32 and u32, which have no padding
    unsafe { std::slice::from_raw_parts(data.as_ptr().cast::<u8>(), std::mem::size_of_val(data)) }
}

/// Represents a mesh stored on the GPU side.
pub struct Mesh<G: Gpu> {
    gpu: Arc<G>,
    vao: G::VertexArray,
    vbo: G::Buffer,
    ibo: Option<G::Buffer>,
    count: usize,
}

impl<G: Gpu> Mesh<G> {
    /// Uploads positions only; drawn with a direct array draw.
    pub fn arrays(gpu: &Arc<G>, vertices: &[f32], layout: VertexLayout) -> Result<Self> {
        Self::upload(gpu, vertices, None, layout)
    }

    /// Uploads positions and indices; drawn with an indexed draw.
    ///
    /// Fails with [`Error::IndexOutOfRange`] before touching the GPU if an index has no vertex.
    pub fn indexed(gpu: &Arc<G>, data: &MeshData, layout: VertexLayout) -> Result<Self> {
        data.check_indices(layout)?;
        Self::upload(gpu, &data.vertices, Some(&data.indices), layout)
    }

    fn upload(
        gpu: &Arc<G>,
        vertices: &[f32],
        indices: Option<&[u32]>,
        layout: VertexLayout,
    ) -> Result<Self> {
        let vao = gpu.create_vertex_array().map_err(Error::Gpu)?;
        let vbo = match gpu.create_buffer() {
            Ok(vbo) => vbo,
            Err(e) => {
                gpu.delete_vertex_array(vao);
                return Err(Error::Gpu(e));
            }
        };
        let ibo = match indices.map(|_| gpu.create_buffer()).transpose() {
            Ok(ibo) => ibo,
            Err(e) => {
                gpu.delete_buffer(vbo);
                gpu.delete_vertex_array(vao);
                return Err(Error::Gpu(e));
            }
        };

        gpu.bind_vertex_array(Some(vao));
        gpu.bind_buffer(BufferTarget::Array, Some(vbo));
        gpu.buffer_data(BufferTarget::Array, as_bytes(vertices));
        gpu.float_attribute(0, layout.components() as i32, layout.stride() as i32);

        if let (Some(ibo), Some(indices)) = (ibo, indices) {
            gpu.bind_buffer(BufferTarget::ElementArray, Some(ibo));
            gpu.buffer_data(BufferTarget::ElementArray, as_bytes(indices));
        }

        gpu.bind_vertex_array(None);
        gpu.bind_buffer(BufferTarget::Array, None);
        gpu.bind_buffer(BufferTarget::ElementArray, None);

        let count = match indices {
            Some(indices) => indices.len(),
            None => vertices.len() / layout.components(),
        };

        Ok(Self {
            gpu: Arc::clone(gpu),
            vao,
            vbo,
            ibo,
            count,
        })
    }

    /// Draws the mesh.
    pub fn draw(&self) {
        self.gpu.bind_vertex_array(Some(self.vao));
        if self.ibo.is_some() {
            self.gpu.draw_elements(self.count as i32);
        } else {
            self.gpu.draw_arrays(0, self.count as i32);
        }
        self.gpu.bind_vertex_array(None);
    }

    /// Vertices (array draw) or indices (indexed draw) per draw call.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl<G: Gpu> Drop for Mesh<G> {
    fn drop(&mut self) {
        self.gpu.delete_buffer(self.vbo);
        if let Some(ibo) = self.ibo {
            self.gpu.delete_buffer(ibo);
        }
        self.gpu.delete_vertex_array(self.vao);
    }
}
