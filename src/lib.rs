//! Building blocks for a small first-person bedroom viewer.
//!
//! The room is assembled from unit cubes described in an embedded XML
//! scene. Each cube is drawn by pushing its model matrix and material
//! through a string-keyed uniform protocol; the renderer turns the
//! recorded calls into wgpu draws. Everything except [`render`] is plain
//! data and can be exercised without a window or GPU.

pub mod app;
pub mod camera;
pub mod input;
pub mod lighting;
pub mod material;
pub mod render;
pub mod scene;
pub mod transform;
pub mod uniforms;

pub use app::{AppContext, AppControl, ViewerConfig};
pub use camera::{Camera, CameraMovement, CameraSettings};
pub use input::{InputState, KeyCode, NamedKey, ScrollDelta};
pub use lighting::{Lamp, Lighting};
pub use material::{LitMaterial, Material};
pub use render::Renderer;
pub use scene::{Scene, SceneElement};
pub use transform::{ModelTransform, TransformOp};
pub use uniforms::{
    DrawCall, FrameRecorder, FrameUniforms, ShadingModel, UniformBlock, UniformError,
    UniformSink, UniformValue,
};
