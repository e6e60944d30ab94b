//! The GPU context.
//!
//! [`Gpu`] names every call the loaders and the render loop make into the graphics API. Bound
//! state (current program, vertex array and buffers) is reached only through a value implementing
//! it, so every call site says which context it talks to. [`glow::Context`] is the real backend.

use std::fmt::Debug;

use glam::{Mat4, Vec4};
use glow::HasContext;

use crate::shader::ShaderStage;

/// Binding points used for buffer uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data.
    Array,
    /// Triangle-corner indices.
    ElementArray,
}

impl BufferTarget {
    fn gl_enum(self) -> u32 {
        match self {
            BufferTarget::Array => glow::ARRAY_BUFFER,
            BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
        }
    }
}

/// A graphics API the core can drive.
///
/// Methods mirror single GL entry points. Handles are plain values owned by the wrappers in
/// [`crate::shader`] and [`crate::mesh`], which delete them on drop.
pub trait Gpu {
    type Shader: Copy + Debug + PartialEq;
    type Program: Copy + Debug + PartialEq;
    type Buffer: Copy + Debug;
    type VertexArray: Copy + Debug;
    type UniformLocation;

    /// Driver version string.
    fn version(&self) -> String;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    /// Uploads the source text and compiles it.
    fn compile_shader(&self, shader: Self::Shader, source: &str);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn validate_program(&self, program: Self::Program);
    fn program_validate_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn use_program(&self, program: Option<Self::Program>);
    fn delete_program(&self, program: Self::Program);

    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation>;
    fn uniform_f32(&self, location: &Self::UniformLocation, value: f32);
    fn uniform_vec4(&self, location: &Self::UniformLocation, value: Vec4);
    fn uniform_mat4(&self, location: &Self::UniformLocation, value: &Mat4);

    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>);
    /// Fills the buffer currently bound to `target` with static data.
    fn buffer_data(&self, target: BufferTarget, data: &[u8]);
    fn delete_buffer(&self, buffer: Self::Buffer);

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);
    /// Describes and enables a tightly packed float attribute of the bound array buffer.
    fn float_attribute(&self, index: u32, components: i32, stride: i32);

    fn clear_color(&self, color: Vec4);
    fn clear(&self);
    fn draw_arrays(&self, first: i32, count: i32);
    fn draw_elements(&self, count: i32);
}

type GlShader = <glow::Context as HasContext>::Shader;
type GlProgram = <glow::Context as HasContext>::Program;
type GlBuffer = <glow::Context as HasContext>::Buffer;
type GlVertexArray = <glow::Context as HasContext>::VertexArray;
type GlUniformLocation = <glow::Context as HasContext>::UniformLocation;

impl Gpu for glow::Context {
    type Shader = GlShader;
    type Program = GlProgram;
    type Buffer = GlBuffer;
    type VertexArray = GlVertexArray;
    type UniformLocation = GlUniformLocation;

    fn version(&self) -> String {
        unsafe { self.get_parameter_string(glow::VERSION) }
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<GlShader, String> {
        unsafe { HasContext::create_shader(self, stage.gl_enum()) }
    }

    fn compile_shader(&self, shader: GlShader, source: &str) {
        unsafe {
            self.shader_source(shader, source);
            HasContext::compile_shader(self, shader);
        }
    }

    fn shader_compile_status(&self, shader: GlShader) -> bool {
        unsafe { self.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: GlShader) -> String {
        unsafe { self.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: GlShader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn create_program(&self) -> Result<GlProgram, String> {
        unsafe { HasContext::create_program(self) }
    }

    fn attach_shader(&self, program: GlProgram, shader: GlShader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    fn detach_shader(&self, program: GlProgram, shader: GlShader) {
        unsafe { HasContext::detach_shader(self, program, shader) }
    }

    fn link_program(&self, program: GlProgram) {
        unsafe { HasContext::link_program(self, program) }
    }

    fn program_link_status(&self, program: GlProgram) -> bool {
        unsafe { self.get_program_link_status(program) }
    }

    fn validate_program(&self, program: GlProgram) {
        unsafe { HasContext::validate_program(self, program) }
    }

    fn program_validate_status(&self, program: GlProgram) -> bool {
        unsafe { self.get_program_parameter_i32(program, glow::VALIDATE_STATUS) != 0 }
    }

    fn program_info_log(&self, program: GlProgram) -> String {
        unsafe { self.get_program_info_log(program) }
    }

    fn use_program(&self, program: Option<GlProgram>) {
        unsafe { HasContext::use_program(self, program) }
    }

    fn delete_program(&self, program: GlProgram) {
        unsafe { HasContext::delete_program(self, program) }
    }

    fn uniform_location(&self, program: GlProgram, name: &str) -> Option<GlUniformLocation> {
        unsafe { self.get_uniform_location(program, name) }
    }

    fn uniform_f32(&self, location: &GlUniformLocation, value: f32) {
        unsafe { self.uniform_1_f32(Some(location), value) }
    }

    fn uniform_vec4(&self, location: &GlUniformLocation, value: Vec4) {
        unsafe { self.uniform_4_f32(Some(location), value.x, value.y, value.z, value.w) }
    }

    fn uniform_mat4(&self, location: &GlUniformLocation, value: &Mat4) {
        unsafe { self.uniform_matrix_4_f32_slice(Some(location), false, value.as_ref()) }
    }

    fn create_buffer(&self) -> Result<GlBuffer, String> {
        unsafe { HasContext::create_buffer(self) }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<GlBuffer>) {
        unsafe { HasContext::bind_buffer(self, target.gl_enum(), buffer) }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
        unsafe { self.buffer_data_u8_slice(target.gl_enum(), data, glow::STATIC_DRAW) }
    }

    fn delete_buffer(&self, buffer: GlBuffer) {
        unsafe { HasContext::delete_buffer(self, buffer) }
    }

    fn create_vertex_array(&self) -> Result<GlVertexArray, String> {
        unsafe { HasContext::create_vertex_array(self) }
    }

    fn bind_vertex_array(&self, vertex_array: Option<GlVertexArray>) {
        unsafe { HasContext::bind_vertex_array(self, vertex_array) }
    }

    fn delete_vertex_array(&self, vertex_array: GlVertexArray) {
        unsafe { HasContext::delete_vertex_array(self, vertex_array) }
    }

    fn float_attribute(&self, index: u32, components: i32, stride: i32) {
        unsafe {
            self.enable_vertex_attrib_array(index);
            self.vertex_attrib_pointer_f32(index, components, glow::FLOAT, false, stride, 0);
        }
    }

    fn clear_color(&self, color: Vec4) {
        unsafe { HasContext::clear_color(self, color.x, color.y, color.z, color.w) }
    }

    fn clear(&self) {
        unsafe { HasContext::clear(self, glow::COLOR_BUFFER_BIT) }
    }

    fn draw_arrays(&self, first: i32, count: i32) {
        unsafe { HasContext::draw_arrays(self, glow::TRIANGLES, first, count) }
    }

    fn draw_elements(&self, count: i32) {
        unsafe { HasContext::draw_elements(self, glow::TRIANGLES, count, glow::UNSIGNED_INT, 0) }
    }
}

/// A backend that records calls instead of talking to a driver.
#[cfg(test)]
pub(crate) mod recording {
    use std::cell::{Cell, RefCell};
    use std::collections::HashSet;

    use glam::{Mat4, Vec4};

    use super::{BufferTarget, Gpu};
    use crate::shader::ShaderStage;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        CreateShader(ShaderStage, u32),
        CompileShader(u32),
        DeleteShader(u32),
        CreateProgram(u32),
        AttachShader(u32, u32),
        DetachShader(u32, u32),
        LinkProgram(u32),
        ValidateProgram(u32),
        UseProgram(Option<u32>),
        DeleteProgram(u32),
        UniformF32(u32, f32),
        UniformVec4(u32, Vec4),
        UniformMat4(u32, Mat4),
        CreateBuffer(u32),
        BindBuffer(BufferTarget, Option<u32>),
        BufferData(BufferTarget, usize),
        DeleteBuffer(u32),
        CreateVertexArray(u32),
        BindVertexArray(Option<u32>),
        DeleteVertexArray(u32),
        FloatAttribute { index: u32, components: i32, stride: i32 },
        ClearColor(Vec4),
        Clear,
        DrawArrays { first: i32, count: i32 },
        DrawElements { count: i32 },
    }

    /// Shaders whose source contains `error_marker` fail to compile; `fail_link` makes every link
    /// fail and `fail_validate` every validation. Only names listed in `uniforms` resolve to a
    /// location.
    pub struct RecordingGpu {
        pub calls: RefCell<Vec<Call>>,
        pub error_marker: Option<&'static str>,
        pub fail_link: bool,
        pub fail_validate: bool,
        pub uniforms: Vec<&'static str>,
        pub(crate) next_id: Cell<u32>,
        pub(crate) failed: RefCell<HashSet<u32>>,
    }

    impl Default for RecordingGpu {
        fn default() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                error_marker: None,
                fail_link: false,
                fail_validate: false,
                uniforms: vec!["u_Color", "u_MVP"],
                next_id: Cell::new(1),
                failed: RefCell::new(HashSet::new()),
            }
        }
    }

    impl RecordingGpu {
        pub fn failing_on(marker: &'static str) -> Self {
            Self {
                error_marker: Some(marker),
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
            self.calls.borrow().iter().filter(|c| pred(c)).count()
        }

        fn id(&self) -> u32 {
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            id
        }

        fn record(&self, call: Call) {
            self.calls.borrow_mut().push(call);
        }
    }

    impl Gpu for RecordingGpu {
        type Shader = u32;
        type Program = u32;
        type Buffer = u32;
        type VertexArray = u32;
        type UniformLocation = u32;

        fn version(&self) -> String {
            "3.3.0 recording".to_string()
        }

        fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
            let id = self.id();
            self.record(Call::CreateShader(stage, id));
            Ok(id)
        }

        fn compile_shader(&self, shader: u32, source: &str) {
            if self.error_marker.is_some_and(|m| source.contains(m)) {
                self.failed.borrow_mut().insert(shader);
            }
            self.record(Call::CompileShader(shader));
        }

        fn shader_compile_status(&self, shader: u32) -> bool {
            !self.failed.borrow().contains(&shader)
        }

        fn shader_info_log(&self, shader: u32) -> String {
            if self.failed.borrow().contains(&shader) {
                "0:3(1): error: syntax error, unexpected end of file".to_string()
            } else {
                String::new()
            }
        }

        fn delete_shader(&self, shader: u32) {
            self.record(Call::DeleteShader(shader));
        }

        fn create_program(&self) -> Result<u32, String> {
            let id = self.id();
            self.record(Call::CreateProgram(id));
            Ok(id)
        }

        fn attach_shader(&self, program: u32, shader: u32) {
            self.record(Call::AttachShader(program, shader));
        }

        fn detach_shader(&self, program: u32, shader: u32) {
            self.record(Call::DetachShader(program, shader));
        }

        fn link_program(&self, program: u32) {
            self.record(Call::LinkProgram(program));
        }

        fn program_link_status(&self, _program: u32) -> bool {
            !self.fail_link
        }

        fn validate_program(&self, program: u32) {
            self.record(Call::ValidateProgram(program));
        }

        fn program_validate_status(&self, _program: u32) -> bool {
            !self.fail_validate
        }

        fn program_info_log(&self, _program: u32) -> String {
            if self.fail_link {
                "error: vertex shader output not read by fragment shader".to_string()
            } else if self.fail_validate {
                "Validation Failed: No vertex array object bound.".to_string()
            } else {
                String::new()
            }
        }

        fn use_program(&self, program: Option<u32>) {
            self.record(Call::UseProgram(program));
        }

        fn delete_program(&self, program: u32) {
            self.record(Call::DeleteProgram(program));
        }

        fn uniform_location(&self, _program: u32, name: &str) -> Option<u32> {
            self.uniforms
                .iter()
                .position(|u| *u == name)
                .map(|i| i as u32)
        }

        fn uniform_f32(&self, location: &u32, value: f32) {
            self.record(Call::UniformF32(*location, value));
        }

        fn uniform_vec4(&self, location: &u32, value: Vec4) {
            self.record(Call::UniformVec4(*location, value));
        }

        fn uniform_mat4(&self, location: &u32, value: &Mat4) {
            self.record(Call::UniformMat4(*location, *value));
        }

        fn create_buffer(&self) -> Result<u32, String> {
            let id = self.id();
            self.record(Call::CreateBuffer(id));
            Ok(id)
        }

        fn bind_buffer(&self, target: BufferTarget, buffer: Option<u32>) {
            self.record(Call::BindBuffer(target, buffer));
        }

        fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
            self.record(Call::BufferData(target, data.len()));
        }

        fn delete_buffer(&self, buffer: u32) {
            self.record(Call::DeleteBuffer(buffer));
        }

        fn create_vertex_array(&self) -> Result<u32, String> {
            let id = self.id();
            self.record(Call::CreateVertexArray(id));
            Ok(id)
        }

        fn bind_vertex_array(&self, vertex_array: Option<u32>) {
            self.record(Call::BindVertexArray(vertex_array));
        }

        fn delete_vertex_array(&self, vertex_array: u32) {
            self.record(Call::DeleteVertexArray(vertex_array));
        }

        fn float_attribute(&self, index: u32, components: i32, stride: i32) {
            self.record(Call::FloatAttribute {
                index,
                components,
                stride,
            });
        }

        fn clear_color(&self, color: Vec4) {
            self.record(Call::ClearColor(color));
        }

        fn clear(&self) {
            self.record(Call::Clear);
        }

        fn draw_arrays(&self, first: i32, count: i32) {
            self.record(Call::DrawArrays { first, count });
        }

        fn draw_elements(&self, count: i32) {
            self.record(Call::DrawElements { count });
        }
    }
}
