//! Immediate-mode drawing: the [`Renderer`] seam and its software backend.
//!
//! [`Rasterizer`] keeps GL-style state (matrix stack, lighting and depth
//! toggles, current diffuse material) and writes into a packed ARGB buffer
//! that the visualizer hands to `minifb`.  Spheres are drawn as shaded
//! screen-space impostors with per-pixel depth.

use nalgebra::{Matrix4, Point3, Vector3};

use crate::camera::CameraPersp;

/// The renderer's own 3-component vector type.
pub type Vec3f = Vector3<f32>;

// ════════════════════════════════════════════════════════════════════════════
// Colors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self { Color { r, g, b } }

    pub fn to_argb(self) -> u32 {
        ColorA::new(self.r, self.g, self.b, 1.0).to_argb()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorA {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorA {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self { ColorA { r, g, b, a } }

    /// Pack into 0xAARRGGBB, clamping each channel to 0–1.
    pub fn to_argb(self) -> u32 {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (q(self.a) << 24) | (q(self.r) << 16) | (q(self.g) << 8) | q(self.b)
    }
}

impl From<Color> for ColorA {
    fn from(c: Color) -> Self { ColorA::new(c.r, c.g, c.b, 1.0) }
}

/// Composite `src` over `dst` using the source alpha byte. Result is opaque.
pub fn blend_over(src: u32, dst: u32) -> u32 {
    let t = ((src >> 24) & 0xFF) as f32 / 255.0;
    let lerp = |cs: u32, cd: u32| (cd as f32 * (1.0 - t) + cs as f32 * t).round() as u32;
    let sr = (src >> 16) & 0xFF; let dr = (dst >> 16) & 0xFF;
    let sg = (src >>  8) & 0xFF; let dg = (dst >>  8) & 0xFF;
    let sb =  src        & 0xFF; let db =  dst        & 0xFF;
    0xFF000000 | (lerp(sr, dr) << 16) | (lerp(sg, dg) << 8) | lerp(sb, db)
}

// ════════════════════════════════════════════════════════════════════════════
// Texture
// ════════════════════════════════════════════════════════════════════════════

/// A 2D ARGB image (alpha honoured when drawn).
///
/// Only built through [`Texture::filled`], so `pixels` always holds
/// `width * height` entries.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    width:  usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Texture {
    pub fn filled(width: usize, height: usize, color: u32) -> Self {
        Texture { width, height, pixels: vec![color; width * height] }
    }

    pub fn width(&self)  -> usize { self.width }
    pub fn height(&self) -> usize { self.height }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Renderer — the drawing seam
// ════════════════════════════════════════════════════════════════════════════

/// GL-flavoured immediate-mode drawing calls used by the frame presenter.
pub trait Renderer {
    fn clear(&mut self, color: Color);
    fn enable_lighting(&mut self);
    fn enable_depth_read(&mut self);
    fn push_matrices(&mut self);
    fn pop_matrices(&mut self);
    /// Install the camera's view and projection matrices.
    fn set_matrices(&mut self, camera: &CameraPersp);
    fn draw_sphere(&mut self, center: &Vec3f, radius: f32);
    /// Set the current color and the front-face diffuse material.
    fn set_diffuse_color(&mut self, color: ColorA);
    /// Draw a texture in window space with its top-left at the origin.
    fn draw_texture(&mut self, texture: &Texture);
}

// ════════════════════════════════════════════════════════════════════════════
// Rasterizer — software Renderer
// ════════════════════════════════════════════════════════════════════════════

/// Ambient contribution applied to lit surfaces.
const AMBIENT: f32 = 0.2;

/// Default front-face diffuse material (fixed-function GL default).
pub const DEFAULT_DIFFUSE: ColorA = ColorA::new(0.8, 0.8, 0.8, 1.0);

pub struct Rasterizer {
    width:      usize,
    height:     usize,
    buf:        Vec<u32>,
    /// Eye-space distance of the nearest surface per pixel.
    depth:      Vec<f32>,
    view:       Matrix4<f32>,
    projection: Matrix4<f32>,
    stack:      Vec<(Matrix4<f32>, Matrix4<f32>)>,
    lighting:   bool,
    depth_read: bool,
    diffuse:    ColorA,
}

impl Rasterizer {
    pub fn new(width: usize, height: usize) -> Self {
        Rasterizer {
            width,
            height,
            buf:        vec![0xFF000000; width * height],
            depth:      vec![f32::INFINITY; width * height],
            view:       Matrix4::identity(),
            projection: Matrix4::identity(),
            stack:      Vec::new(),
            lighting:   false,
            depth_read: false,
            diffuse:    DEFAULT_DIFFUSE,
        }
    }

    pub fn width(&self)  -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn buffer(&self) -> &[u32] { &self.buf }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buf[y * self.width + x])
    }

    pub fn matrix_depth(&self) -> usize { self.stack.len() }

    fn shade(&self, normal: &Vec3f) -> u32 {
        let d = self.diffuse;
        if !self.lighting {
            return Color::new(d.r, d.g, d.b).to_argb();
        }
        // LIGHT0: directional, from the viewer along +Z in eye space.
        let lambert = normal.dot(&Vec3f::z()).max(0.0);
        let k = AMBIENT + lambert;
        Color::new(d.r * k, d.g * k, d.b * k).to_argb()
    }
}

impl Renderer for Rasterizer {
    fn clear(&mut self, color: Color) {
        self.buf.fill(color.to_argb());
        self.depth.fill(f32::INFINITY);
    }

    fn enable_lighting(&mut self)   { self.lighting = true; }
    fn enable_depth_read(&mut self) { self.depth_read = true; }

    fn push_matrices(&mut self) {
        self.stack.push((self.view, self.projection));
    }

    fn pop_matrices(&mut self) {
        if let Some((view, projection)) = self.stack.pop() {
            self.view       = view;
            self.projection = projection;
        }
    }

    fn set_matrices(&mut self, camera: &CameraPersp) {
        self.view       = camera.view_matrix();
        self.projection = camera.projection_matrix();
    }

    fn draw_sphere(&mut self, center: &Vec3f, radius: f32) {
        let eye  = self.view.transform_point(&Point3::from(*center));
        let dist = -eye.z;
        let clip = self.projection * eye.to_homogeneous();
        if dist <= 0.0 || clip.w <= f32::EPSILON { return; }

        let ndc_z = clip.z / clip.w;
        if !(-1.0..=1.0).contains(&ndc_z) { return; }

        let (w, h) = (self.width as f32, self.height as f32);
        let sx = (clip.x / clip.w + 1.0) * 0.5 * w;
        let sy = (1.0 - clip.y / clip.w) * 0.5 * h;
        let r_px = radius * self.projection[(1, 1)] / dist * 0.5 * h;
        if !r_px.is_finite() || r_px <= 0.0 { return; }

        let x0 = (sx - r_px).floor().max(0.0) as usize;
        let x1 = (sx + r_px).ceil().clamp(0.0, w) as usize;
        let y0 = (sy - r_px).floor().max(0.0) as usize;
        let y1 = (sy + r_px).ceil().clamp(0.0, h) as usize;

        for py in y0..y1 {
            for px in x0..x1 {
                let dx = (px as f32 + 0.5 - sx) / r_px;
                let dy = (py as f32 + 0.5 - sy) / r_px;
                let d2 = dx * dx + dy * dy;
                if d2 > 1.0 { continue; }

                let nz = (1.0 - d2).sqrt();
                let z  = dist - nz * radius;
                let idx = py * self.width + px;
                if self.depth_read && z >= self.depth[idx] { continue; }

                self.depth[idx] = z;
                self.buf[idx]   = self.shade(&Vec3f::new(dx, -dy, nz));
            }
        }
    }

    fn set_diffuse_color(&mut self, color: ColorA) {
        self.diffuse = color;
    }

    fn draw_texture(&mut self, texture: &Texture) {
        let w = texture.width().min(self.width);
        let h = texture.height().min(self.height);
        for y in 0..h {
            for x in 0..w {
                let Some(src) = texture.pixel(x, y) else { continue };
                let idx = y * self.width + x;
                self.buf[idx] = blend_over(src, self.buf[idx]);
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
