//! The per-frame draw loop.

use glam::Vec4;

use crate::gpu::Gpu;
use crate::mesh::Mesh;
use crate::pulse::ColorPulse;
use crate::shader::ShaderProgram;

/// The window side of the loop.
pub trait Surface {
    /// Whether the user asked to close the window.
    fn should_close(&self) -> bool;
    /// Swaps front and back buffers.
    fn present(&mut self);
    /// Processes pending window events.
    fn poll_events(&mut self);
}

/// Draws one mesh with one program until the surface closes, animating a colour uniform.
pub struct FrameLoop<G: Gpu> {
    pulse: ColorPulse,
    color: Option<G::UniformLocation>,
    clear_color: Vec4,
    frames: u64,
}

impl<G: Gpu> FrameLoop<G> {
    /// Creates a loop that clears to black and has no colour uniform.
    pub fn new(pulse: ColorPulse) -> Self {
        Self {
            pulse,
            color: None,
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            frames: 0,
        }
    }

    /// Pushes the pulse colour into `location` every frame.
    pub fn with_color_uniform(mut self, location: G::UniformLocation) -> Self {
        self.color = Some(location);
        self
    }

    /// Sets the colour the frame is cleared to.
    pub fn with_clear_color(mut self, color: Vec4) -> Self {
        self.clear_color = color;
        self
    }

    /// Renders a single frame.
    pub fn frame<S: Surface>(
        &mut self,
        gpu: &G,
        surface: &mut S,
        program: &ShaderProgram<G>,
        mesh: &Mesh<G>,
    ) {
        gpu.clear();
        program.bind();
        mesh.draw();

        self.pulse.advance();
        if let Some(location) = &self.color {
            program.set_uniform(location, self.pulse.rgba());
        }

        surface.present();
        surface.poll_events();
        self.frames += 1;
    }

    /// Renders until the surface asks to close and returns the number of frames drawn.
    pub fn run<S: Surface>(
        &mut self,
        gpu: &G,
        surface: &mut S,
        program: &ShaderProgram<G>,
        mesh: &Mesh<G>,
    ) -> u64 {
        gpu.clear_color(self.clear_color);
        let start = std::time::Instant::now();

        while !surface.should_close() {
            self.frame(gpu, surface, program, mesh);
        }

        log::info!("Rendered {} frames in {:?}", self.frames, start.elapsed());
        self.frames
    }

    /// The animation state after the last rendered frame.
    pub fn pulse(&self) -> &ColorPulse {
        &self.pulse
    }
}
