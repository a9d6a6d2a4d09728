//! Frame presenter and the main loop.
//!
//! `FramePresenter` owns the orbit camera, the overlay font and texture,
//! the tracker handle and the current/previous frames.  Each tick it pulls
//! one frame, rebuilds the text overlay from it, and draws the selected
//! fingertips as spheres followed by the overlay.

use std::sync::mpsc;

use nalgebra::{Point2, Point3};
use thiserror::Error;

use crate::camera::{CameraPersp, OrbitController, PointerEvent};
use crate::config::{AppConfig, ConfigError, WIN_H, WIN_W};
use crate::render::{Color, ColorA, Renderer, Texture, Vec3f};
use crate::text::{Alignment, Font, FontError, TextBox};
use crate::tracking::{self, FingerFilter, Frame, SimInput, Tracker, TrackingError, Vector};
use crate::visualizer::Visualizer;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("window: {0}")]
    Window(String),
    #[error(transparent)]
    Font(#[from] FontError),
    #[error(transparent)]
    Tracking(#[from] TrackingError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ════════════════════════════════════════════════════════════════════════════
// Pure helpers
// ════════════════════════════════════════════════════════════════════════════

/// Convert a tracker vector into the renderer's vector type, unchanged.
pub fn to_vec3f(v: Vector) -> Vec3f {
    Vec3f::new(v.x, v.y, v.z)
}

/// Format like a default-configured C++ stream: 6 significant digits,
/// trailing zeros dropped, scientific outside 1e-4 ..< 1e6.
pub fn format_general(v: f32) -> String {
    const PRECISION: usize = 6;

    if v.is_nan()      { return "nan".to_string(); }
    if v.is_infinite() { return if v > 0.0 { "inf" } else { "-inf" }.to_string(); }
    if v == 0.0        { return if v.is_sign_negative() { "-0" } else { "0" }.to_string(); }

    let v = v as f64;
    // Exponent after rounding to PRECISION significant digits.
    let sci = format!("{:.*e}", PRECISION - 1, v);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None         => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= PRECISION as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exp.abs())
    } else {
        let decimals = (PRECISION as i32 - 1 - exp).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, v)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// The overlay readout: total finger count, then one line per fingertip.
pub fn frame_parameter_text(frame: &Frame) -> String {
    let fingers = frame.fingers();
    let mut ss = format!("Finger Count : {}\n", fingers.count());
    for finger in fingers.iter() {
        let p = finger.tip_position();
        ss.push_str(&format!(
            "Finger Position: {}, {}, {}\n",
            format_general(p.x), format_general(p.y), format_general(p.z),
        ));
    }
    ss
}

// ════════════════════════════════════════════════════════════════════════════
// FramePresenter
// ════════════════════════════════════════════════════════════════════════════

pub struct FramePresenter {
    // ── camera ──────────────────────────────────────────────────────────
    cam_ui:          OrbitController,

    // ── overlay ─────────────────────────────────────────────────────────
    font:            Font,
    text:            String,
    text_texture:    Option<Texture>,

    // ── tracking ────────────────────────────────────────────────────────
    tracker:         Box<dyn Tracker>,
    current_frame:   Frame,
    last_frame:      Frame,

    // ── draw policy ─────────────────────────────────────────────────────
    sphere_radius:   f32,
    restore_diffuse: ColorA,
    finger_filter:   FingerFilter,
}

impl FramePresenter {
    /// Initialise renderer state, font and camera, then open the tracker.
    ///
    /// Any failure is returned as-is; nothing is retried.
    pub fn setup<F>(
        cfg:     &AppConfig,
        aspect:  f32,
        gl:      &mut dyn Renderer,
        connect: F,
    ) -> Result<Self, AppError>
    where
        F: FnOnce() -> Result<Box<dyn Tracker>, TrackingError>,
    {
        cfg.validate()?;
        gl.enable_lighting();

        let font = Font::new(&cfg.font_name, cfg.font_size)?;

        let mut cam = CameraPersp::default();
        let [ex, ey, ez] = cfg.eye;
        let [tx, ty, tz] = cfg.target;
        cam.set_eye_point(Point3::new(ex, ey, ez));
        cam.look_at(Point3::new(tx, ty, tz));
        cam.set_perspective(cfg.fov_deg, aspect, cfg.near, cfg.far);

        let cam_ui = OrbitController::new(cam);

        gl.enable_depth_read();

        let tracker = connect()?;
        log::info!(
            "presenter ready: font \"{}\" {}px, filter {:?}",
            font.name(), font.size(), cfg.finger_filter
        );

        Ok(FramePresenter {
            cam_ui,
            font,
            text:            String::new(),
            text_texture:    None,
            tracker,
            current_frame:   Frame::empty(),
            last_frame:      Frame::empty(),
            sphere_radius:   cfg.sphere_radius,
            restore_diffuse: cfg.restore_diffuse(),
            finger_filter:   cfg.finger_filter,
        })
    }

    // ── input ─────────────────────────────────────────────────────────────

    pub fn mouse_down(&mut self, pos: Point2<f32>) {
        self.cam_ui.mouse_down(pos);
    }

    pub fn mouse_drag(&mut self, pos: Point2<f32>, left: bool, middle: bool, right: bool) {
        self.cam_ui.mouse_drag(pos, left, middle, right);
    }

    pub fn mouse_up(&mut self) {
        self.cam_ui.mouse_up();
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Press { pos } => self.mouse_down(pos),
            PointerEvent::Drag { pos, left, middle, right } => {
                self.mouse_drag(pos, left, middle, right)
            }
            PointerEvent::Release => self.mouse_up(),
        }
    }

    // ── per-tick update ───────────────────────────────────────────────────

    pub fn update(&mut self) {
        let next = self.tracker.frame();
        self.last_frame = std::mem::replace(&mut self.current_frame, next);
        self.render_frame_parameter();
    }

    fn render_frame_parameter(&mut self) {
        self.text = frame_parameter_text(&self.current_frame);

        let tbox = TextBox::new()
            .alignment(Alignment::Left)
            .font(&self.font)
            .text(self.text.as_str())
            .color(Color::new(1.0, 1.0, 1.0))
            .background_color(ColorA::new(0.0, 0.0, 0.0, 0.5));

        self.text_texture = Some(tbox.render());
    }

    // ── per-tick draw ─────────────────────────────────────────────────────

    pub fn draw(&self, gl: &mut dyn Renderer) {
        gl.clear(Color::new(0.0, 0.0, 0.0));

        self.draw_leap_object(gl);
        self.draw_texture(gl);
    }

    fn draw_leap_object(&self, gl: &mut dyn Renderer) {
        gl.push_matrices();
        gl.set_matrices(self.cam_ui.camera());

        for finger in self.current_frame.fingers().filter(self.finger_filter) {
            gl.draw_sphere(&to_vec3f(finger.tip_position()), self.sphere_radius);
        }

        // Keep the lit sphere material from leaking into later draws.
        gl.set_diffuse_color(self.restore_diffuse);

        gl.pop_matrices();
    }

    fn draw_texture(&self, gl: &mut dyn Renderer) {
        if let Some(tex) = &self.text_texture {
            gl.draw_texture(tex);
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn camera(&self)        -> &CameraPersp     { self.cam_ui.camera() }
    pub fn current_frame(&self) -> &Frame           { &self.current_frame }
    pub fn last_frame(&self)    -> &Frame           { &self.last_frame }
    pub fn overlay_text(&self)  -> &str             { &self.text }
    pub fn text_texture(&self)  -> Option<&Texture> { self.text_texture.as_ref() }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Opens the window, sets up the presenter (simulated hands by default,
/// hardware with `--features leap`) and drives update/draw at ~60 fps until
/// the window closes.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();

    let mut vis = Visualizer::new(sim_tx)?;
    log::info!("window {}x{} opened", WIN_W, WIN_H);

    let mut app = FramePresenter::setup(
        &cfg,
        AppConfig::aspect_ratio(),
        vis.renderer(),
        move || tracking::connect(sim_rx),
    )?;

    while vis.is_open() {
        if !vis.poll_input() { break; }

        for event in vis.drain_pointer_events() {
            app.handle_pointer(event);
        }

        app.update();
        app.draw(vis.renderer());
        vis.present();
    }

    log::info!("window closed");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
