mod window;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use glint_anim::MonotonicClock;
use glint_input::FrameSource;
use glint_render::{FrameRenderer, SceneConfig};
use glint_render_wgpu::WgpuDevice;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::window::WindowInput;

#[derive(Parser)]
#[command(name = "glint-desktop", about = "Fly through a lit scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene description (JSON). Defaults to the house scene.
    #[arg(long, conflicts_with = "procedural")]
    scene: Option<PathBuf>,

    /// Render the built-in ground-and-lights scene, no model files needed
    #[arg(long)]
    procedural: bool,

    /// Start in wireframe mode (Tab toggles it)
    #[arg(long)]
    wireframe: bool,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,
}

impl Cli {
    fn scene_config(&self) -> Result<SceneConfig> {
        let mut config = match &self.scene {
            Some(path) => SceneConfig::load(path).with_context(|| format!("loading {path:?}"))?,
            None if self.procedural => SceneConfig::procedural(),
            None => SceneConfig::default(),
        };
        config.wireframe |= self.wireframe;
        Ok(config)
    }
}

struct Gpu {
    window: Arc<Window>,
    device: WgpuDevice,
    renderer: FrameRenderer<MonotonicClock>,
}

struct GpuApp {
    config: SceneConfig,
    size: PhysicalSize<u32>,
    input: WindowInput,
    gpu: Option<Gpu>,
    failure: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(config: SceneConfig, size: PhysicalSize<u32>) -> Self {
        Self {
            config,
            size,
            input: WindowInput::new(),
            gpu: None,
            failure: None,
        }
    }

    fn init(&self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let attrs = Window::default_attributes()
            .with_title("glint")
            .with_inner_size(self.size);
        let window = Arc::new(event_loop.create_window(attrs)?);
        let size = window.inner_size();

        let mut device = WgpuDevice::new(window.clone(), size.width, size.height)?;
        let renderer = FrameRenderer::build(
            &mut device,
            &self.config,
            MonotonicClock::new(),
            size.width,
            size.height,
        )
        .context("building scene")?;
        Ok(Gpu {
            window,
            device,
            renderer,
        })
    }

    fn set_look_captured(&mut self, captured: bool) {
        self.input.set_look_captured(captured);
        if let Some(gpu) = &self.gpu {
            gpu.window.set_cursor_visible(!captured);
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(gpu) => {
                tracing::info!(format = ?gpu.device.surface_format(), "renderer ready");
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("startup failed: {e:#}");
                self.failure = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.input.request_close();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.device.resize(new_size.width, new_size.height);
                    gpu.renderer.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::Focused(false) => self.input.focus_lost(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat,
                        ..
                    },
                ..
            } => {
                let pressed = key_state == ElementState::Pressed;
                if key == KeyCode::Tab && pressed && !repeat {
                    if let Some(gpu) = &mut self.gpu {
                        let on = !gpu.renderer.wireframe();
                        gpu.renderer.set_wireframe(on);
                    }
                }
                self.input.key(key, pressed);
                if self.input.should_close() {
                    event_loop.exit();
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state: ElementState::Pressed,
                ..
            } => {
                let captured = !self.input.look_captured();
                self.set_look_captured(captured);
            }
            WindowEvent::RedrawRequested => {
                let Some(gpu) = &mut self.gpu else {
                    return;
                };
                self.input.begin_frame();
                gpu.renderer.render_frame(&mut gpu.device, &mut self.input);
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input.mouse_motion(delta.0, delta.1);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut gpu) = self.gpu.take() {
            tracing::info!(frames = gpu.renderer.frames(), "shutting down");
            gpu.renderer.destroy(&mut gpu.device);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("glint-desktop starting");
    let config = cli.scene_config()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config, PhysicalSize::new(cli.width, cli.height));
    event_loop.run_app(&mut app)?;

    match app.failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
