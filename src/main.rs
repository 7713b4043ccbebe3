use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, warn};
use pollster::block_on;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{CursorGrabMode, Window, WindowId};

use cube_room::{
    AppContext, AppControl, KeyCode, NamedKey, Renderer, ScrollDelta, ShadingModel, ViewerConfig,
};

const MAX_FRAME_DELTA: f32 = 0.1;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    let config = options.into_config();
    let context = AppContext::new(config).context("failed to build the scene")?;

    print!("{}", context.summary());
    if context.config().summary_only {
        return Ok(());
    }

    match run_interactive(context) {
        Ok(()) => Ok(()),
        Err(err) if err.downcast_ref::<WindowInitError>().is_some() => {
            eprintln!(
                "{err}. Falling back to --summary-only mode (set DISPLAY or install a GPU driver to enable rendering)."
            );
            Ok(())
        }
        Err(err) => Err(err),
    }
}

fn run_interactive(context: AppContext) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|err| WindowInitError::new("event loop", err))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(context);
    event_loop
        .run_app(&mut app)
        .context("event loop terminated unexpectedly")?;
    app.shutdown();

    match app.last_error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct ViewerApp {
    context: AppContext,
    renderer: Option<Renderer>,
    last_frame: Instant,
    last_error: Option<anyhow::Error>,
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn new(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

impl ViewerApp {
    fn new(context: AppContext) -> Self {
        Self {
            context,
            renderer: None,
            last_frame: Instant::now(),
            last_error: None,
        }
    }

    fn create_renderer(&self, event_loop: &ActiveEventLoop) -> Result<Renderer> {
        let attributes = Window::default_attributes()
            .with_title("Cube Room")
            .with_inner_size(LogicalSize::new(800.0, 600.0));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|err| WindowInitError::new("window", err))?,
        );
        capture_cursor(&window);

        let renderer = block_on(Renderer::new(Arc::clone(&window)))
            .map_err(|err| WindowInitError::new("GPU renderer", format!("{err:#}")))?;
        info!(
            "rendering {} scene in a {}x{} window",
            self.context.scene().shading.name(),
            window.inner_size().width,
            window.inner_size().height
        );
        Ok(renderer)
    }

    fn redraw(&mut self) -> Result<()> {
        let now = Instant::now();
        let delta = (now - self.last_frame).as_secs_f32().min(MAX_FRAME_DELTA);
        self.last_frame = now;
        self.context.update(delta);

        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };
        let recorder = match self.context.record_frame() {
            Ok(recorder) => recorder,
            Err(err) => {
                error!("skipping frame: {err}");
                return Ok(());
            }
        };
        let frame = *self.context.frame_uniforms(renderer.aspect())?;

        match renderer.render(&frame, recorder.shading(), recorder.draws()) {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("surface lost or outdated; reconfiguring");
                renderer.reconfigure();
                Ok(())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(anyhow!("GPU is out of memory")),
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("surface timeout; retrying next frame");
                Ok(())
            }
            Err(err) => {
                warn!("failed to acquire surface texture: {err}");
                Ok(())
            }
        }
    }

    fn handle_keyboard(&mut self, event: &KeyEvent, event_loop: &ActiveEventLoop) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let Some(key) = map_keycode(code) else {
            return;
        };
        match event.state {
            ElementState::Pressed => {
                if self.context.key_pressed(key) == AppControl::Exit {
                    info!("escape pressed; closing");
                    event_loop.exit();
                }
            }
            ElementState::Released => self.context.key_released(key),
        }
    }

    fn shutdown(&mut self) {
        if self.renderer.take().is_some() {
            info!("released GPU resources");
        }
        println!("Final state:");
        print!("{}", self.context.summary());
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        match self.create_renderer(event_loop) {
            Ok(renderer) => {
                self.renderer = Some(renderer);
                self.last_frame = Instant::now();
            }
            Err(err) => {
                self.last_error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        if window_id != renderer.window_id() {
            return;
        }
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => renderer.resize(size),
            WindowEvent::ScaleFactorChanged { .. } => renderer.reconfigure(),
            WindowEvent::Focused(false) => self.context.release_all_keys(),
            WindowEvent::Focused(true) => capture_cursor(renderer.window()),
            WindowEvent::KeyboardInput { event, .. } => self.handle_keyboard(&event, event_loop),
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, lines) => ScrollDelta::Lines(lines),
                    MouseScrollDelta::PixelDelta(position) => ScrollDelta::Pixels(position.y as f32),
                };
                self.context.mouse_scrolled(delta);
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw() {
                    self.last_error = Some(err);
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if self.renderer.is_none() {
            return;
        }
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.context.mouse_moved(dx as f32, dy as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = self.renderer.as_ref() {
            renderer.window().request_redraw();
        }
    }
}

/// Hides the cursor and keeps it inside the window for mouse look.
fn capture_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(err) = grabbed {
        warn!("unable to capture cursor: {err}");
    }
    window.set_cursor_visible(false);
}

fn map_keycode(code: winit::keyboard::KeyCode) -> Option<KeyCode> {
    use winit::keyboard::KeyCode as Key;
    Some(match code {
        Key::KeyW => KeyCode::Character('W'),
        Key::KeyA => KeyCode::Character('A'),
        Key::KeyS => KeyCode::Character('S'),
        Key::KeyD => KeyCode::Character('D'),
        Key::KeyQ => KeyCode::Character('Q'),
        Key::KeyR => KeyCode::Character('R'),
        Key::ArrowLeft => KeyCode::Named(NamedKey::Left),
        Key::ArrowRight => KeyCode::Named(NamedKey::Right),
        Key::ArrowUp => KeyCode::Named(NamedKey::Up),
        Key::ArrowDown => KeyCode::Named(NamedKey::Down),
        Key::Home => KeyCode::Named(NamedKey::Home),
        Key::Escape => KeyCode::Named(NamedKey::Escape),
        Key::Digit1 => KeyCode::Digit(1),
        Key::Digit2 => KeyCode::Digit(2),
        _ => return None,
    })
}

#[derive(Debug, Default)]
struct CliOptions {
    flat: bool,
    summary_only: bool,
    speed: Option<f32>,
    sensitivity: Option<f32>,
}

impl CliOptions {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--flat" => options.flat = true,
                "--summary-only" => options.summary_only = true,
                "--speed" => options.speed = Some(parse_positive(&arg, args.next())?),
                "--sensitivity" => {
                    options.sensitivity = Some(parse_positive(&arg, args.next())?)
                }
                other => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Usage: cube-room [--flat] [--summary-only] [--speed <f32>] [--sensitivity <f32>]"
                    ));
                }
            }
        }
        Ok(options)
    }

    fn into_config(self) -> ViewerConfig {
        let mut config = ViewerConfig {
            summary_only: self.summary_only,
            ..ViewerConfig::default()
        };
        if self.flat {
            config.shading = ShadingModel::Flat;
        }
        if let Some(speed) = self.speed {
            config.camera.movement_speed = speed;
        }
        if let Some(sensitivity) = self.sensitivity {
            config.camera.mouse_sensitivity = sensitivity;
        }
        config
    }
}

fn parse_positive(flag: &str, value: Option<String>) -> Result<f32> {
    let value = value.with_context(|| format!("{flag} expects a value"))?;
    let parsed: f32 = value
        .parse()
        .with_context(|| format!("invalid value for {flag}: {value}"))?;
    if !parsed.is_finite() || parsed <= 0.0 {
        return Err(anyhow!("{flag} must be a positive number, got {value}"));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliOptions> {
        CliOptions::parse(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn cli_overrides_viewer_config() {
        let config = parse(&["--flat", "--speed", "4", "--sensitivity", "0.2"])
            .unwrap()
            .into_config();
        assert_eq!(config.shading, ShadingModel::Flat);
        assert_eq!(config.camera.movement_speed, 4.0);
        assert_eq!(config.camera.mouse_sensitivity, 0.2);
        assert!(!config.summary_only);
    }

    #[test]
    fn cli_rejects_bad_values() {
        assert!(parse(&["--speed"]).is_err());
        assert!(parse(&["--speed", "fast"]).is_err());
        assert!(parse(&["--sensitivity", "-1"]).is_err());
        assert!(parse(&["--wireframe"]).is_err());
    }

    #[test]
    fn only_bound_keys_are_mapped() {
        use winit::keyboard::KeyCode as Key;
        assert_eq!(map_keycode(Key::KeyW), Some(KeyCode::Character('W')));
        assert_eq!(map_keycode(Key::Digit2), Some(KeyCode::Digit(2)));
        assert_eq!(
            map_keycode(Key::Escape),
            Some(KeyCode::Named(NamedKey::Escape))
        );
        for unbound in [Key::KeyE, Key::Space, Key::F1, Key::ShiftLeft, Key::Digit3] {
            assert_eq!(map_keycode(unbound), None);
        }
    }

    #[test]
    fn default_config_is_lit() {
        let config = parse(&[]).unwrap().into_config();
        assert_eq!(config, ViewerConfig::default());
    }
}
