use anyhow::Result;
use glam::Vec3;
use log::debug;

use crate::camera::{Camera, CameraSettings};
use crate::input::{action_for_key, Action, InputState, KeyCode, ScrollDelta};
use crate::lighting::{Lamp, Lighting};
use crate::scene::Scene;
use crate::uniforms::{self, FrameRecorder, FrameUniforms, ShadingModel, UniformError, UniformSink};

pub const DEFAULT_EYE: Vec3 = Vec3::new(4.0, 2.0, 13.0);

/// Startup settings for the viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub shading: ShadingModel,
    pub summary_only: bool,
    pub camera: CameraSettings,
    pub eye: Vec3,
    pub near: f32,
    pub far: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            shading: ShadingModel::Lit,
            summary_only: false,
            camera: CameraSettings::default(),
            eye: DEFAULT_EYE,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Whether the window loop should keep going after an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Everything the render loop mutates between frames.
#[derive(Debug)]
pub struct AppContext {
    config: ViewerConfig,
    camera: Camera,
    lighting: Lighting,
    input: InputState,
    scene: Scene,
    frame: FrameUniforms,
}

impl AppContext {
    pub fn new(config: ViewerConfig) -> Result<Self> {
        let scene = Scene::for_shading(config.shading)?;
        Self::with_scene(config, scene)
    }

    pub fn with_scene(config: ViewerConfig, scene: Scene) -> Result<Self> {
        let lighting = Lighting::default();
        let mut frame = FrameUniforms::new();
        lighting.apply_static(&mut frame)?;
        Ok(Self {
            camera: Camera::with_settings(config.eye, config.camera),
            lighting,
            input: InputState::new(),
            scene,
            frame,
            config,
        })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn key_pressed(&mut self, key: KeyCode) -> AppControl {
        if !self.input.set_key_down(key) {
            return AppControl::Continue;
        }
        match action_for_key(key) {
            Some(Action::Quit) => return AppControl::Exit,
            Some(Action::ResetCamera) => {
                self.camera.reset(self.config.eye);
                debug!("camera reset to {:?}", self.config.eye);
            }
            Some(Action::ToggleLamp(lamp)) => {
                let on = self.lighting.toggle(lamp);
                debug!("{} lamp {}", lamp.name(), if on { "on" } else { "off" });
            }
            Some(Action::Move(_)) | None => {}
        }
        AppControl::Continue
    }

    pub fn key_released(&mut self, key: KeyCode) {
        self.input.set_key_up(key);
    }

    /// Drops held keys, e.g. when the window loses focus.
    pub fn release_all_keys(&mut self) {
        self.input.clear();
    }

    /// Applies raw mouse motion. Screen y grows downward, so moving the
    /// mouse up pitches the camera up.
    pub fn mouse_moved(&mut self, dx: f32, dy: f32) {
        self.camera.process_mouse_movement(dx, -dy);
    }

    pub fn mouse_scrolled(&mut self, delta: ScrollDelta) {
        self.camera.process_mouse_scroll(delta.lines());
    }

    /// Moves the camera for every held movement key.
    pub fn update(&mut self, delta_time: f32) {
        for direction in self.input.held_movements() {
            self.camera.process_keyboard(direction, delta_time);
        }
    }

    pub fn is_lamp_on(&self, lamp: Lamp) -> bool {
        self.lighting.is_on(lamp)
    }

    /// Refreshes the per-frame uniforms from the camera and lamp switches.
    pub fn frame_uniforms(&mut self, aspect: f32) -> Result<&FrameUniforms, UniformError> {
        let projection = self
            .camera
            .projection_matrix(aspect, self.config.near, self.config.far);
        self.frame.set_mat4(uniforms::PROJECTION, projection)?;
        self.frame
            .set_mat4(uniforms::VIEW, self.camera.view_matrix())?;
        self.frame
            .set_vec3(uniforms::VIEW_POSITION, self.camera.position)?;
        self.lighting.apply_switches(&mut self.frame)?;
        Ok(&self.frame)
    }

    /// Runs the scene through the uniform protocol for one frame.
    pub fn record_frame(&self) -> Result<FrameRecorder, UniformError> {
        let mut recorder = FrameRecorder::new(self.scene.shading);
        self.scene.draw(&mut recorder, &self.lighting)?;
        Ok(recorder)
    }

    /// Human readable description of the scene and viewer state.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Loaded {} scene with {} elements\n",
            self.scene.shading.name(),
            self.scene.elements.len()
        );
        for (group, count) in self.scene.groups() {
            out.push_str(&format!(" - {group} ({count})\n"));
        }
        let camera = &self.camera;
        out.push_str(&format!(
            "Camera pos=({:.2}, {:.2}, {:.2}) yaw={:.1} pitch={:.1} zoom={:.1}\n",
            camera.position.x,
            camera.position.y,
            camera.position.z,
            camera.yaw(),
            camera.pitch(),
            camera.zoom()
        ));
        out.push_str(&format!(
            "Lamps ceiling={} night={}\n",
            on_off(self.lighting.ceiling_lamp_on),
            on_off(self.lighting.night_lamp_on)
        ));
        out
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}
