use glam::{Mat4, Vec3};

pub const DEFAULT_YAW: f32 = -90.0;
pub const DEFAULT_PITCH: f32 = 0.0;
pub const DEFAULT_ZOOM: f32 = 45.0;
pub const PITCH_LIMIT: f32 = 89.0;
pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 45.0;

/// Direction of a keyboard driven camera move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Tunables applied to camera input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    /// World units per second.
    pub movement_speed: f32,
    /// Degrees of rotation per unit of mouse motion.
    pub mouse_sensitivity: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
        }
    }
}

/// First-person camera driven by Euler angles.
///
/// The basis vectors are private and always derived from `yaw` and `pitch`,
/// so they cannot drift out of sync with the angles.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    zoom: f32,
    settings: CameraSettings,
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self::with_settings(position, CameraSettings::default())
    }

    pub fn with_settings(position: Vec3, settings: CameraSettings) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            world_up: Vec3::Y,
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            zoom: DEFAULT_ZOOM,
            settings,
        };
        camera.update_vectors();
        camera
    }

    /// Restores the freshly constructed state at `position`.
    ///
    /// Speed and sensitivity survive the reset.
    pub fn reset(&mut self, position: Vec3) {
        *self = Self::with_settings(position, self.settings);
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn settings(&self) -> CameraSettings {
        self.settings
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Perspective projection using the current zoom as vertical FOV.
    pub fn projection_matrix(&self, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect.max(0.01), near, far)
    }

    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.settings.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw += x_offset * self.settings.mouse_sensitivity;
        self.pitch += y_offset * self.settings.mouse_sensitivity;
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        // right first, so up stays orthogonal to front near the poles
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn assert_basis_orthonormal(camera: &Camera) {
        let (f, r, u) = (camera.front(), camera.right(), camera.up());
        assert!(f.dot(r).abs() < EPS, "front.right = {}", f.dot(r));
        assert!(f.dot(u).abs() < EPS, "front.up = {}", f.dot(u));
        assert!(r.dot(u).abs() < EPS, "right.up = {}", r.dot(u));
        for v in [f, r, u] {
            assert!((v.length() - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn new_camera_faces_negative_z() {
        let camera = Camera::new(Vec3::new(4.0, 2.0, 13.0));
        assert_eq!(camera.yaw(), -90.0);
        assert_eq!(camera.pitch(), 0.0);
        assert_eq!(camera.zoom(), 45.0);
        assert!(camera.front().abs_diff_eq(Vec3::NEG_Z, EPS));
        assert!(camera.up().abs_diff_eq(Vec3::Y, EPS));
        assert!(camera.right().abs_diff_eq(Vec3::X, EPS));
    }

    #[test]
    fn initial_view_looks_one_unit_down_negative_z() {
        let position = Vec3::new(4.0, 2.0, 13.0);
        let camera = Camera::new(position);
        let expected = Mat4::look_at_rh(position, position + Vec3::new(0.0, 0.0, -1.0), Vec3::Y);
        assert!(camera.view_matrix().abs_diff_eq(expected, EPS));
        let eye_space = camera.view_matrix().transform_point3(position + Vec3::NEG_Z);
        assert!(eye_space.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), EPS));
    }

    #[test]
    fn pitch_is_clamped_below_ninety_degrees() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_mouse_movement(0.0, 10_000.0);
        assert_eq!(camera.pitch(), PITCH_LIMIT);
        assert_basis_orthonormal(&camera);
        camera.process_mouse_movement(0.0, -50_000.0);
        assert_eq!(camera.pitch(), -PITCH_LIMIT);
        assert_basis_orthonormal(&camera);
    }

    #[test]
    fn zoom_is_clamped_to_range() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_mouse_scroll(100.0);
        assert_eq!(camera.zoom(), MIN_ZOOM);
        camera.process_mouse_scroll(-3.0);
        assert_eq!(camera.zoom(), 4.0);
        camera.process_mouse_scroll(-100.0);
        assert_eq!(camera.zoom(), MAX_ZOOM);
    }

    #[test]
    fn basis_stays_orthonormal_for_many_angles() {
        let mut camera = Camera::new(Vec3::ZERO);
        for step in 0..200 {
            let dx = (step as f32 * 37.0) % 113.0 - 56.0;
            let dy = (step as f32 * 53.0) % 97.0 - 48.0;
            camera.process_mouse_movement(dx * 10.0, dy * 10.0);
            assert!(camera.pitch() > -90.0 && camera.pitch() < 90.0);
            assert_basis_orthonormal(&camera);
        }
    }

    #[test]
    fn forward_moves_exactly_along_front() {
        let mut camera = Camera::new(Vec3::new(1.0, 2.0, 3.0));
        camera.process_mouse_movement(123.0, 45.0);
        let start = camera.position;
        let front = camera.front();
        let dt = 0.016;
        camera.process_keyboard(CameraMovement::Forward, dt);
        let moved = camera.position - start;
        let expected = front * camera.settings().movement_speed * dt;
        assert!(moved.abs_diff_eq(expected, EPS));
        assert!(moved.cross(front).length() < EPS);
    }

    #[test]
    fn strafing_uses_right_vector() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_keyboard(CameraMovement::Right, 1.0);
        assert!(camera.position.abs_diff_eq(Vec3::new(2.5, 0.0, 0.0), EPS));
        camera.process_keyboard(CameraMovement::Left, 2.0);
        assert!(camera.position.abs_diff_eq(Vec3::new(-2.5, 0.0, 0.0), EPS));
        camera.process_keyboard(CameraMovement::Backward, 1.0);
        assert!(camera.position.abs_diff_eq(Vec3::new(-2.5, 0.0, 2.5), EPS));
    }

    #[test]
    fn reset_restores_constructed_state() {
        let settings = CameraSettings {
            movement_speed: 7.0,
            mouse_sensitivity: 0.3,
        };
        let origin = Vec3::new(4.0, 2.0, 13.0);
        let mut camera = Camera::with_settings(origin, settings);
        camera.process_mouse_movement(40.0, -20.0);
        camera.process_mouse_scroll(12.0);
        camera.process_keyboard(CameraMovement::Forward, 3.0);
        camera.reset(origin);
        assert_eq!(camera, Camera::with_settings(origin, settings));
    }

    #[test]
    fn mouse_movement_updates_yaw_and_front() {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 5.0));
        camera.process_mouse_movement(90.0, 0.0);
        assert!((camera.yaw() - -81.0).abs() < EPS);
        let yaw = (-81.0f32).to_radians();
        assert!((camera.front().x - yaw.cos()).abs() < EPS);
        assert!((camera.front().z - yaw.sin()).abs() < EPS);
    }

    #[test]
    fn narrower_zoom_magnifies_projection() {
        let mut camera = Camera::new(Vec3::ZERO);
        let wide = camera.projection_matrix(1.0, 0.1, 100.0);
        camera.process_mouse_scroll(20.0);
        let narrow = camera.projection_matrix(1.0, 0.1, 100.0);
        assert!(narrow.col(1).y > wide.col(1).y);
    }
}
