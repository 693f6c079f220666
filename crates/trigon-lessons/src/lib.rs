//! The two triangle lessons.
//!
//! Both open an 800x600 window, build their shader program up front and draw
//! one triangle per frame until Escape is pressed or the window closes.

use anyhow::{Context, Result};

use trigon_engine::core::{App, AppControl, FrameCtx};
use trigon_engine::device::GpuInit;
use trigon_engine::input::Key;
use trigon_engine::logging::{LoggingConfig, init_logging};
use trigon_engine::paint::Color;
use trigon_engine::render::{TransformUniform, TriangleMesh, TriangleRenderer};
use trigon_engine::shader::{LinkedProgram, ShaderSource, build_program};
use trigon_engine::window::{Runtime, RuntimeConfig};

pub const WINDOW_TITLE: &str = "LearnOpenGL";
pub const CLEAR_COLOR: Color = Color::rgba(0.2, 0.3, 0.3, 1.0);

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Lesson {
    /// Fixed-color triangle.
    Shaders,
    /// Per-vertex colors, rotated and pulsed through a uniform.
    Rotate,
}

impl Lesson {
    pub fn name(self) -> &'static str {
        match self {
            Lesson::Shaders => "01-shaders",
            Lesson::Rotate => "03-rotate",
        }
    }

    pub fn sources(self) -> (ShaderSource, ShaderSource) {
        let (vs, fs) = match self {
            Lesson::Shaders => (
                include_str!("../shaders/01-shaders.vert.wgsl"),
                include_str!("../shaders/01-shaders.frag.wgsl"),
            ),
            Lesson::Rotate => (
                include_str!("../shaders/03-rotate.vert.wgsl"),
                include_str!("../shaders/03-rotate.frag.wgsl"),
            ),
        };

        (
            ShaderSource::vertex(vs).with_label(format!("{}.vert", self.name())),
            ShaderSource::fragment(fs).with_label(format!("{}.frag", self.name())),
        )
    }

    pub fn mesh(self) -> TriangleMesh {
        match self {
            Lesson::Shaders => TriangleMesh::positions(),
            Lesson::Rotate => TriangleMesh::colored(),
        }
    }

    /// Compiles and links both stages.
    pub fn build_program(self) -> Result<LinkedProgram> {
        let (vs, fs) = self.sources();
        build_program(&vs, &fs).with_context(|| format!("lesson {} has invalid shaders", self.name()))
    }
}

pub fn window_config() -> RuntimeConfig {
    RuntimeConfig {
        title: WINDOW_TITLE.to_string(),
        resizable: false,
        ..RuntimeConfig::default()
    }
}

/// Runs `lesson` to completion.
///
/// Shader errors are reported before any window is opened.
pub fn run(lesson: Lesson) -> Result<()> {
    init_logging(LoggingConfig::default());

    let program = lesson.build_program()?;
    log::info!("starting lesson {}", lesson.name());

    // Clear and vertex colors are given as-is, without sRGB encoding.
    let gpu_init = GpuInit {
        prefer_srgb: false,
        ..GpuInit::default()
    };

    Runtime::run(window_config(), gpu_init, LessonApp::new(lesson, program))
}

struct LessonApp {
    lesson: Lesson,
    renderer: TriangleRenderer,
}

impl LessonApp {
    fn new(lesson: Lesson, program: LinkedProgram) -> Self {
        Self {
            lesson,
            renderer: TriangleRenderer::new(program, lesson.mesh()),
        }
    }
}

impl App for LessonApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl> {
        if ctx.input_frame.key_pressed(Key::Escape) {
            log::debug!("escape pressed");
            return Ok(AppControl::Exit);
        }

        if self.lesson == Lesson::Rotate {
            self.renderer.set_transform(TransformUniform::at(ctx.time.elapsed));
        }

        let renderer = &mut self.renderer;
        ctx.render(CLEAR_COLOR, |rctx, target| renderer.render(rctx, target))
    }
}
