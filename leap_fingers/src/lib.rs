//! # leap_fingers
//!
//! LeapMotion finger viewer: every tick the latest tracking frame is pulled,
//! its fingertips are listed in a text overlay, and the index fingertips are
//! drawn as lit spheres under an orbit camera.
//!
//! ## Pipeline
//!
//! | Stage | Module | What happens |
//! |---|---|---|
//! | Acquire | [`tracking`] | `Tracker::frame()` — latest sample, never blocks |
//! | Summarise | [`app`] | "Finger Count : N" + one line per tip |
//! | Rasterize text | [`text`] | `TextBox` → semi-transparent overlay texture |
//! | Draw | [`render`] | spheres at index tips, then the overlay |
//!
//! The overlay counts *every* finger in the frame; only the filtered ones
//! (index fingers by default) become spheres.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: procedurally animated hands.
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via LeapC.
//!
//! ### Window controls
//!
//! | Input | Effect |
//! |---|---|
//! | Left drag | Tumble camera around the target |
//! | Middle drag | Pan |
//! | Right drag / Left+Middle | Zoom |
//! | `0` / `1` / `2` | Simulated hand count |
//! | `P` | Pause simulated motion |
//! | `Escape` / `Q` | Quit |

pub mod tracking;
pub mod camera;
pub mod render;
pub mod text;
pub mod config;
pub mod visualizer;
pub mod app;
