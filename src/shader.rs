//! Shader sources, stages and linked programs.
//!
//! Both stages of a program live in one text file, split by `#shader vertex` and
//! `#shader fragment` marker lines. [`ShaderSource`] does the splitting, [`Shader`] compiles a
//! single stage and [`ShaderProgram`] links a vertex/fragment pair. The [`Uniform`] trait pushes
//! host values into a linked program.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use glam::{Mat4, Vec4};

use crate::error::{Error, Result};
use crate::gpu::Gpu;

/// One half of a shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub(crate) fn gl_enum(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }

    /// Reads the stage named on a `#shader` marker line. Only `vertex` is recognised by name;
    /// every other marker selects the fragment stage.
    fn from_marker(line: &str) -> Self {
        if line.contains("vertex") {
            ShaderStage::Vertex
        } else {
            ShaderStage::Fragment
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

const MARKER: &str = "#shader";

/// Vertex and fragment source text taken from one combined file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSource {
    /// Splits in-memory text on `#shader` markers.
    pub fn parse(text: &str) -> Self {
        let mut splitter = Splitter::default();
        for line in text.lines() {
            splitter.push(line);
        }
        splitter.finish()
    }

    /// Reads and splits a combined shader file line by line.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;

        let mut splitter = Splitter::default();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| Error::io(path, e))?;
            splitter.push(&line);
        }

        log::debug!("Loaded shader source from {}", path.display());
        Ok(splitter.finish())
    }

    /// Returns the text collected for `stage`.
    pub fn stage(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }

    fn stage_mut(&mut self, stage: ShaderStage) -> &mut String {
        match stage {
            ShaderStage::Vertex => &mut self.vertex,
            ShaderStage::Fragment => &mut self.fragment,
        }
    }
}

/// Routes lines into the buffer picked by the last marker seen.
#[derive(Default)]
struct Splitter {
    current: Option<ShaderStage>,
    source: ShaderSource,
    dropped: usize,
}

impl Splitter {
    fn push(&mut self, line: &str) {
        if line.contains(MARKER) {
            self.current = Some(ShaderStage::from_marker(line));
            return;
        }

        match self.current {
            Some(stage) => {
                let buffer = self.source.stage_mut(stage);
                buffer.push_str(line);
                buffer.push('\n');
            }
            None => self.dropped += 1,
        }
    }

    fn finish(self) -> ShaderSource {
        if self.dropped > 0 {
            log::debug!(
                "Dropped {} line(s) preceding the first {} marker",
                self.dropped,
                MARKER
            );
        }
        self.source
    }
}

/// A compiled shader stage. Deleted on drop, so it never outlives the program link.
pub struct Shader<G: Gpu> {
    gpu: Arc<G>,
    id: G::Shader,
    stage: ShaderStage,
}

impl<G: Gpu> Shader<G> {
    /// Compiles `source` as `stage`.
    ///
    /// On failure the driver's info log is logged at `error` and returned inside
    /// [`Error::Compile`]; the half-built stage is deleted before returning.
    pub fn compile(gpu: &Arc<G>, stage: ShaderStage, source: &str) -> Result<Self> {
        let id = gpu.create_shader(stage).map_err(Error::Gpu)?;
        gpu.compile_shader(id, source);

        if !gpu.shader_compile_status(id) {
            let log = gpu.shader_info_log(id);
            log::error!("Failed to compile {stage} shader:\n{log}");
            gpu.delete_shader(id);
            return Err(Error::Compile { stage, log });
        }

        Ok(Self {
            gpu: Arc::clone(gpu),
            id,
            stage,
        })
    }

    /// The stage this shader was compiled as.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl<G: Gpu> Drop for Shader<G> {
    fn drop(&mut self) {
        self.gpu.delete_shader(self.id);
    }
}

/// A host value that can be written to a uniform.
pub trait Uniform {
    /// Writes the value to `location` of the currently bound program.
    fn set_uniform<G: Gpu>(&self, gpu: &G, location: &G::UniformLocation);
}

impl Uniform for f32 {
    fn set_uniform<G: Gpu>(&self, gpu: &G, location: &G::UniformLocation) {
        gpu.uniform_f32(location, *self);
    }
}

impl Uniform for Vec4 {
    fn set_uniform<G: Gpu>(&self, gpu: &G, location: &G::UniformLocation) {
        gpu.uniform_vec4(location, *self);
    }
}

impl Uniform for Mat4 {
    fn set_uniform<G: Gpu>(&self, gpu: &G, location: &G::UniformLocation) {
        gpu.uniform_mat4(location, self);
    }
}

impl<T: Uniform> Uniform for &T {
    fn set_uniform<G: Gpu>(&self, gpu: &G, location: &G::UniformLocation) {
        (*self).set_uniform(gpu, location);
    }
}

/// A linked vertex + fragment program.
pub struct ShaderProgram<G: Gpu> {
    gpu: Arc<G>,
    id: G::Program,
}

impl<G: Gpu> ShaderProgram<G> {
    /// Links exactly one vertex and one fragment stage.
    ///
    /// The program is also validated, but validation runs against whatever GL state is current,
    /// so a failure there is logged as a warning and the linked program is still returned.
    pub fn link(gpu: &Arc<G>, vertex: &Shader<G>, fragment: &Shader<G>) -> Result<Self> {
        if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
            return Err(Error::Link(format!(
                "expected a vertex and a fragment stage, got {} and {}",
                vertex.stage, fragment.stage
            )));
        }

        let program = gpu.create_program().map_err(Error::Gpu)?;
        gpu.attach_shader(program, vertex.id);
        gpu.attach_shader(program, fragment.id);
        gpu.link_program(program);

        if !gpu.program_link_status(program) {
            let log = gpu.program_info_log(program);
            log::error!("Failed to link shader program:\n{log}");
            gpu.delete_program(program);
            return Err(Error::Link(log));
        }

        gpu.validate_program(program);
        if !gpu.program_validate_status(program) {
            let log = gpu.program_info_log(program);
            log::warn!("Shader program did not validate against the current state:\n{log}");
        }

        gpu.detach_shader(program, vertex.id);
        gpu.detach_shader(program, fragment.id);

        Ok(Self {
            gpu: Arc::clone(gpu),
            id: program,
        })
    }

    /// Compiles both stages and links them. Stops at the first stage that fails to compile.
    pub fn from_source(gpu: &Arc<G>, source: &ShaderSource) -> Result<Self> {
        let vertex = Shader::compile(gpu, ShaderStage::Vertex, &source.vertex)?;
        let fragment = Shader::compile(gpu, ShaderStage::Fragment, &source.fragment)?;
        Self::link(gpu, &vertex, &fragment)
    }

    /// Loads a combined `#shader` file and builds a program from it.
    pub fn load(gpu: &Arc<G>, path: impl AsRef<Path>) -> Result<Self> {
        let source = ShaderSource::load(path)?;
        Self::from_source(gpu, &source)
    }

    /// Makes this the current program.
    pub fn bind(&self) {
        self.gpu.use_program(Some(self.id));
    }

    /// Looks up an active uniform by name.
    ///
    /// Returns [`Error::UniformNotFound`] if the name is unknown or was optimised out.
    pub fn uniform_location(&self, name: &str) -> Result<G::UniformLocation> {
        self.gpu
            .uniform_location(self.id, name)
            .ok_or_else(|| Error::UniformNotFound(name.to_string()))
    }

    /// Writes `value` to the uniform at `location`. The program must be bound.
    pub fn set_uniform<T: Uniform>(&self, location: &G::UniformLocation, value: T) {
        value.set_uniform(self.gpu.as_ref(), location);
    }

    /// The raw program handle.
    pub fn id(&self) -> G::Program {
        self.id
    }
}

impl<G: Gpu> Drop for ShaderProgram<G> {
    fn drop(&mut self) {
        self.gpu.delete_program(self.id);
    }
}
