//! Perspective camera and the mouse-driven orbit controller.
//!
//! The controller follows the usual "Maya-style" mapping: left-drag tumbles
//! around the target, middle-drag pans, right-drag (or left+middle) dollies
//! in and out.  Every drag is measured against the camera captured at the
//! last mouse-down, never accumulated frame to frame.

use nalgebra::{Matrix4, Perspective3, Point2, Point3, Unit, UnitQuaternion, Vector3};

// ════════════════════════════════════════════════════════════════════════════
// CameraPersp
// ════════════════════════════════════════════════════════════════════════════

/// Perspective camera: eye, look-at target, up vector and projection.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraPersp {
    pub eye:     Point3<f32>,
    pub target:  Point3<f32>,
    pub up:      Vector3<f32>,
    /// Vertical field of view in degrees.
    pub fov_deg: f32,
    pub aspect:  f32,
    pub near:    f32,
    pub far:     f32,
}

impl Default for CameraPersp {
    fn default() -> Self {
        CameraPersp {
            eye:     Point3::new(0.0, 0.0, 5.0),
            target:  Point3::origin(),
            up:      Vector3::y(),
            fov_deg: 35.0,
            aspect:  1.0,
            near:    0.1,
            far:     1000.0,
        }
    }
}

impl CameraPersp {
    pub fn set_eye_point(&mut self, eye: Point3<f32>) {
        self.eye = eye;
    }

    /// Aim at `target`, re-orthogonalising `up` against the new view direction.
    pub fn look_at(&mut self, target: Point3<f32>) {
        self.target = target;
        let w = self.view_direction();
        let right = w.cross(&Vector3::y());
        if let Some(right) = right.try_normalize(1.0e-6) {
            self.up = right.cross(&w).normalize();
        }
    }

    pub fn set_perspective(&mut self, fov_deg: f32, aspect: f32, near: f32, far: f32) {
        self.fov_deg = fov_deg;
        self.aspect  = aspect;
        self.near    = near;
        self.far     = far;
    }

    /// Unit vector from eye toward target.
    pub fn view_direction(&self) -> Vector3<f32> {
        (self.target - self.eye)
            .try_normalize(1.0e-6)
            .unwrap_or_else(|| -Vector3::z())
    }

    /// Distance from the eye to the point being orbited.
    pub fn center_of_interest(&self) -> f32 {
        (self.target - self.eye).norm()
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.eye, &self.target, &self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Perspective3::new(self.aspect, self.fov_deg.to_radians(), self.near, self.far)
            .to_homogeneous()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PointerEvent — window mouse input, in window pixels
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// A button went down; starts a gesture.
    Press { pos: Point2<f32> },
    /// The pointer moved with at least one button held.
    Drag  { pos: Point2<f32>, left: bool, middle: bool, right: bool },
    /// Every button is up; ends the gesture.
    Release,
}

// ════════════════════════════════════════════════════════════════════════════
// OrbitController
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action { Tumble, Pan, Zoom }

impl Action {
    fn from_buttons(left: bool, middle: bool, right: bool) -> Option<Action> {
        if right || (left && middle) {
            Some(Action::Zoom)
        } else if middle {
            Some(Action::Pan)
        } else if left {
            Some(Action::Tumble)
        } else {
            None
        }
    }
}

/// Translates pointer gestures into orbit / pan / zoom of a [`CameraPersp`].
#[derive(Clone, Debug)]
pub struct OrbitController {
    current: CameraPersp,
    initial: CameraPersp,
    /// Where the current gesture started; `None` until the first press.
    anchor:  Option<Point2<f32>>,
    last_action: Option<Action>,
}

impl OrbitController {
    pub fn new(camera: CameraPersp) -> Self {
        OrbitController {
            initial:     camera.clone(),
            current:     camera,
            anchor:      None,
            last_action: None,
        }
    }

    pub fn camera(&self) -> &CameraPersp { &self.current }

    pub fn mouse_down(&mut self, pos: Point2<f32>) {
        self.anchor      = Some(pos);
        self.initial     = self.current.clone();
        self.last_action = None;
        log::debug!("orbit gesture anchored at ({:.0}, {:.0})", pos.x, pos.y);
    }

    /// End the gesture; drags are ignored until the next press.
    pub fn mouse_up(&mut self) {
        self.anchor      = None;
        self.last_action = None;
    }

    pub fn mouse_drag(&mut self, pos: Point2<f32>, left: bool, middle: bool, right: bool) {
        let Some(anchor) = self.anchor else { return };
        let Some(action) = Action::from_buttons(left, middle, right) else { return };

        // Switching buttons mid-drag restarts the gesture from here.
        let anchor = if self.last_action != Some(action) {
            self.initial = self.current.clone();
            self.anchor  = Some(pos);
            pos
        } else {
            anchor
        };
        self.last_action = Some(action);

        let dx = pos.x - anchor.x;
        let dy = pos.y - anchor.y;

        match action {
            Action::Zoom   => self.zoom(dx + dy),
            Action::Pan    => self.pan(dx, dy),
            Action::Tumble => self.tumble(dx, dy),
        }
    }

    fn zoom(&mut self, delta: f32) {
        let init = &self.initial;
        let coi  = (-delta / 500.0).exp() * init.center_of_interest();
        self.current.eye    = init.target - init.view_direction() * coi;
        self.current.target = init.target;
        self.current.up     = init.up;
    }

    fn pan(&mut self, dx: f32, dy: f32) {
        let init = &self.initial;
        let coi  = init.center_of_interest();
        let w = init.view_direction();
        let u = init.up.cross(&w).try_normalize(1.0e-6).unwrap_or_else(Vector3::x);
        let v = w.cross(&u).normalize();
        let offset = u * (dx / 1000.0 * coi) + v * (dy / 1000.0 * coi);
        self.current.eye    = init.eye + offset;
        self.current.target = init.target + offset;
        self.current.up     = init.up;
    }

    fn tumble(&mut self, dx: f32, dy: f32) {
        let init = &self.initial;
        let yaw   = -dx / 100.0;
        let pitch =  dy / 100.0;

        let w = init.view_direction();
        let u = init.up.cross(&w).try_normalize(1.0e-6).unwrap_or_else(Vector3::x);

        let rot = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw)
                * UnitQuaternion::from_axis_angle(&Unit::new_unchecked(u), pitch);

        let offset = rot * (init.eye - init.target);
        self.current.eye    = init.target + offset;
        self.current.target = init.target;
        self.current.up     = rot * init.up;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
