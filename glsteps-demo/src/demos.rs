//! The four demo programs, in the order they were written.

use std::sync::Arc;

use glam::Mat4;
use glsteps::{
    ColorPulse, Config, Demo, FrameLoop, Gpu, Mesh, MeshData, Result, ShaderProgram,
    ShaderSource, VertexLayout,
};

use crate::app::App;

type UniformLocation = <glow::Context as Gpu>::UniformLocation;

const TRIANGLE: [f32; 6] = [
    -0.5, -0.5, //
    0.0, 0.5, //
    0.5, -0.5,
];

const QUAD_VERTICES: [f32; 8] = [
    -0.5, -0.5, //
    0.5, -0.5, //
    0.5, 0.5, //
    -0.5, 0.5,
];

const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

const INLINE_VERTEX: &str = "#version 330 core

layout(location = 0) in vec4 position;

void main()
{
    gl_Position = position;
}
";

const SOLID_FRAGMENT: &str = "#version 330 core

layout(location = 0) out vec4 color;

void main()
{
    color = vec4(0.0, 1.0, 0.0, 1.0);
}
";

const UNIFORM_FRAGMENT: &str = "#version 330 core

layout(location = 0) out vec4 color;

uniform vec4 u_Color;

void main()
{
    color = u_Color;
}
";

/// Builds and runs the demo selected in `config` until the window closes.
pub fn run(config: &Config, app: &mut App) -> Result<()> {
    let gl = Arc::clone(&app.gl);
    let pulse = ColorPulse::new(config.pulse_step);

    match config.demo {
        Demo::Triangle => {
            let program = inline_program(&gl, SOLID_FRAGMENT)?;
            let mesh = Mesh::arrays(&gl, &TRIANGLE, VertexLayout::Position2D)?;
            FrameLoop::new(pulse).run(&*gl, app, &program, &mesh);
        }
        Demo::IndexedQuad => {
            let program = inline_program(&gl, UNIFORM_FRAGMENT)?;
            let mesh = Mesh::indexed(&gl, &quad(), VertexLayout::Position2D)?;
            let color = program.uniform_location("u_Color")?;
            FrameLoop::new(pulse)
                .with_color_uniform(color)
                .run(&*gl, app, &program, &mesh);
        }
        Demo::ShaderFile => {
            let program = ShaderProgram::load(&gl, &config.shader_path)?;
            let mesh = Mesh::indexed(&gl, &quad(), VertexLayout::Position2D)?;
            let color = with_projection(&program, Mat4::IDENTITY)?;
            FrameLoop::new(pulse)
                .with_color_uniform(color)
                .run(&*gl, app, &program, &mesh);
        }
        Demo::Teapot => {
            let data = MeshData::load(&config.mesh_path)?;
            let program = ShaderProgram::load(&gl, &config.shader_path)?;
            let mesh = Mesh::indexed(&gl, &data, VertexLayout::Position3D)?;

            // 1.5 units above and below the centre, widened to the window's aspect
            let aspect = config.window.width as f32 / config.window.height as f32;
            let projection =
                Mat4::orthographic_rh_gl(-1.5 * aspect, 1.5 * aspect, -1.5, 1.5, -1.0, 1.0);
            let color = with_projection(&program, projection)?;
            FrameLoop::new(pulse)
                .with_color_uniform(color)
                .run(&*gl, app, &program, &mesh);
        }
    }

    Ok(())
}

fn inline_program(gl: &Arc<glow::Context>, fragment: &str) -> Result<ShaderProgram<glow::Context>> {
    let source = ShaderSource {
        vertex: INLINE_VERTEX.to_string(),
        fragment: fragment.to_string(),
    };
    ShaderProgram::from_source(gl, &source)
}

fn quad() -> MeshData {
    MeshData {
        vertices: QUAD_VERTICES.to_vec(),
        indices: QUAD_INDICES.to_vec(),
    }
}

/// Sets `u_MVP` once and returns the location of `u_Color` for the loop.
fn with_projection(
    program: &ShaderProgram<glow::Context>,
    mvp: Mat4,
) -> Result<UniformLocation> {
    let mvp_location = program.uniform_location("u_MVP")?;
    program.bind();
    program.set_uniform(&mvp_location, mvp);
    program.uniform_location("u_Color")
}
