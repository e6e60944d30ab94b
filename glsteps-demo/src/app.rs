//! SDL2 window and OpenGL context.
//!
//! [`App`] owns the window, the GL 3.3 core context and the event pump, and acts as the
//! [`Surface`] the frame loop presents to.

use std::sync::Arc;

use glsteps::config::WindowConfig;
use glsteps::{Error, Result, Surface};

fn window_error(e: impl ToString) -> Error {
    Error::Window(e.to_string())
}

pub struct App {
    pub sdl: sdl2::Sdl,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub window: sdl2::video::Window,
    pub gl_context: sdl2::video::GLContext,
    pub gl: Arc<glow::Context>,
    pub event_pump: sdl2::EventPump,
    close_requested: bool,
}

impl App {
    /// Opens a window described by `config` and makes its GL context current.
    pub fn new(config: &WindowConfig) -> Result<Self> {
        let sdl = sdl2::init().map_err(window_error)?;
        let video_subsystem = sdl.video().map_err(window_error)?;
        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
        gl_attr.set_context_version(3, 3);

        let window = video_subsystem
            .window(&config.title, config.width, config.height)
            .opengl()
            .build()
            .map_err(window_error)?;
        let gl_context = window.gl_create_context().map_err(window_error)?;
        window.gl_make_current(&gl_context).map_err(window_error)?;

        if let Err(e) = video_subsystem.gl_set_swap_interval(1) {
            log::warn!("Could not enable vsync: {e}");
        }

        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        let event_pump = sdl.event_pump().map_err(window_error)?;

        Ok(Self {
            sdl,
            video_subsystem,
            window,
            gl_context,
            gl: Arc::new(gl),
            event_pump,
            close_requested: false,
        })
    }
}

impl Surface for App {
    fn should_close(&self) -> bool {
        self.close_requested
    }

    fn present(&mut self) {
        self.window.gl_swap_window();
    }

    fn poll_events(&mut self) {
        for event in self.event_pump.poll_iter() {
            if let sdl2::event::Event::Quit { .. } = event {
                self.close_requested = true;
            }
        }
    }
}
