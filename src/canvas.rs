//! Raster canvas and display-list execution.
//!
//! Generators never touch pixels directly. They emit a list of
//! [`DrawOp`]s which the canvas executes in order, keeping a small amount
//! of drawing state (global alpha, glow, line width) between ops the way
//! a 2D context would.

use crate::palette::Color;
use png::{BitDepth, ColorType, Compression, Encoder, FilterType};
use std::io::Write;
use thiserror::Error;

/// Logical size of every canvas, in pixels per side.
pub const CANVAS_SIZE: u32 = 500;

/// Glow strength used for pixels right at the edge of a glowing shape.
const GLOW_PEAK: f64 = 0.75;

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("PNG encoding error: {0}")]
    Encoding(#[from] png::EncodingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Soft halo drawn around filled shapes while enabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    /// Halo width in pixels.
    pub blur: f64,
    pub color: Color,
}

/// A single drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Set the global alpha applied to every subsequent paint.
    SetAlpha(f64),
    /// Enable or disable the glow halo.
    SetGlow(Option<Glow>),
    /// Set the stroke width for strokes and lines.
    SetLineWidth(f64),
    FillRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: Color,
    },
    FillCircle {
        cx: f64,
        cy: f64,
        r: f64,
        color: Color,
    },
    StrokeCircle {
        cx: f64,
        cy: f64,
        r: f64,
        color: Color,
    },
    FillTriangle {
        points: [(f64, f64); 3],
        color: Color,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        color: Color,
    },
}

impl DrawOp {
    /// Whether this op paints pixels (as opposed to changing state).
    pub fn is_shape(&self) -> bool {
        !matches!(
            self,
            DrawOp::SetAlpha(_) | DrawOp::SetGlow(_) | DrawOp::SetLineWidth(_)
        )
    }
}

/// Geometry resolved from a [`DrawOp`], with a signed distance function
/// (negative inside) and a pixel bounding box.
enum Shape {
    Rect { x: f64, y: f64, w: f64, h: f64 },
    Disc { cx: f64, cy: f64, r: f64 },
    Ring { cx: f64, cy: f64, r: f64, half_width: f64 },
    Triangle([(f64, f64); 3]),
    Segment { a: (f64, f64), b: (f64, f64), half_width: f64 },
}

impl Shape {
    fn bounds(&self) -> (f64, f64, f64, f64) {
        match *self {
            Shape::Rect { x, y, w, h } => (x, y, x + w, y + h),
            Shape::Disc { cx, cy, r } => (cx - r, cy - r, cx + r, cy + r),
            Shape::Ring {
                cx,
                cy,
                r,
                half_width,
            } => {
                let outer = r + half_width;
                (cx - outer, cy - outer, cx + outer, cy + outer)
            }
            Shape::Triangle(points) => {
                let xs = points.map(|p| p.0);
                let ys = points.map(|p| p.1);
                (
                    xs.iter().copied().fold(f64::INFINITY, f64::min),
                    ys.iter().copied().fold(f64::INFINITY, f64::min),
                    xs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    ys.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                )
            }
            Shape::Segment { a, b, half_width } => (
                a.0.min(b.0) - half_width,
                a.1.min(b.1) - half_width,
                a.0.max(b.0) + half_width,
                a.1.max(b.1) + half_width,
            ),
        }
    }

    fn distance(&self, px: f64, py: f64) -> f64 {
        match *self {
            Shape::Rect { x, y, w, h } => {
                let hx = w / 2.0;
                let hy = h / 2.0;
                let dx = (px - (x + hx)).abs() - hx;
                let dy = (py - (y + hy)).abs() - hy;
                let outside = (dx.max(0.0).powi(2) + dy.max(0.0).powi(2)).sqrt();
                outside + dx.max(dy).min(0.0)
            }
            Shape::Disc { cx, cy, r } => ((px - cx).powi(2) + (py - cy).powi(2)).sqrt() - r,
            Shape::Ring {
                cx,
                cy,
                r,
                half_width,
            } => (((px - cx).powi(2) + (py - cy).powi(2)).sqrt() - r).abs() - half_width,
            Shape::Triangle(points) => triangle_distance(points, px, py),
            Shape::Segment { a, b, half_width } => segment_distance(a, b, px, py) - half_width,
        }
    }
}

fn segment_distance(a: (f64, f64), b: (f64, f64), px: f64, py: f64) -> f64 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let len2 = abx * abx + aby * aby;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (((px - a.0) * abx + (py - a.1) * aby) / len2).clamp(0.0, 1.0)
    };
    let (qx, qy) = (a.0 + abx * t, a.1 + aby * t);
    ((px - qx).powi(2) + (py - qy).powi(2)).sqrt()
}

fn triangle_distance(points: [(f64, f64); 3], px: f64, py: f64) -> f64 {
    let edge = |i: usize| {
        let a = points[i];
        let b = points[(i + 1) % 3];
        (b.0 - a.0) * (py - a.1) - (b.1 - a.1) * (px - a.0)
    };
    let signs = [edge(0), edge(1), edge(2)];
    let inside = signs.iter().all(|s| *s >= 0.0) || signs.iter().all(|s| *s <= 0.0);
    let nearest = (0..3)
        .map(|i| segment_distance(points[i], points[(i + 1) % 3], px, py))
        .fold(f64::INFINITY, f64::min);
    if inside {
        -nearest
    } else {
        nearest
    }
}

/// A fixed-size RGBA raster owned by one render at a time.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    /// Straight (non-premultiplied) RGBA, row-major.
    pixels: Vec<[u8; 4]>,
    alpha: f64,
    glow: Option<Glow>,
    line_width: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// A transparent [`CANVAS_SIZE`]-square canvas.
    pub fn new() -> Self {
        Self::with_size(CANVAS_SIZE, CANVAS_SIZE)
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 0]; (width * height) as usize],
            alpha: 1.0,
            glow: None,
            line_width: 1.0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Current global alpha.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Current glow setting.
    pub fn glow(&self) -> Option<Glow> {
        self.glow
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    /// Reset to fully transparent pixels and default drawing state.
    pub fn clear(&mut self) {
        self.pixels.fill([0, 0, 0, 0]);
        self.alpha = 1.0;
        self.glow = None;
        self.line_width = 1.0;
    }

    /// Whether any pixel has been painted since the last clear.
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|p| p[3] == 0)
    }

    pub fn execute_all<'a>(&mut self, ops: impl IntoIterator<Item = &'a DrawOp>) {
        for op in ops {
            self.execute(op);
        }
    }

    pub fn execute(&mut self, op: &DrawOp) {
        match *op {
            DrawOp::SetAlpha(alpha) => self.alpha = alpha.clamp(0.0, 1.0),
            DrawOp::SetGlow(glow) => self.glow = glow,
            DrawOp::SetLineWidth(width) => self.line_width = width.max(0.0),
            DrawOp::FillRect { x, y, w, h, color } => {
                self.fill(Shape::Rect { x, y, w, h }, color)
            }
            DrawOp::FillCircle { cx, cy, r, color } => self.fill(Shape::Disc { cx, cy, r }, color),
            DrawOp::StrokeCircle { cx, cy, r, color } => {
                let half_width = self.line_width / 2.0;
                self.paint(
                    &Shape::Ring {
                        cx,
                        cy,
                        r,
                        half_width,
                    },
                    color,
                )
            }
            DrawOp::FillTriangle { points, color } => self.fill(Shape::Triangle(points), color),
            DrawOp::Line { from, to, color } => {
                let half_width = self.line_width / 2.0;
                self.paint(
                    &Shape::Segment {
                        a: from,
                        b: to,
                        half_width,
                    },
                    color,
                )
            }
        }
    }

    fn fill(&mut self, shape: Shape, color: Color) {
        if let Some(glow) = self.glow {
            self.halo(&shape, glow);
        }
        self.paint(&shape, color);
    }

    /// Paint every pixel whose center lies inside `shape`.
    fn paint(&mut self, shape: &Shape, color: Color) {
        let alpha = self.alpha;
        self.scan(shape, 0.0, |distance| (distance <= 0.0).then_some((color, alpha)));
    }

    /// Paint a fading band of `glow.color` just outside `shape`.
    fn halo(&mut self, shape: &Shape, glow: Glow) {
        if glow.blur <= 0.0 {
            return;
        }
        let alpha = self.alpha;
        self.scan(shape, glow.blur, |distance| {
            (distance > 0.0 && distance <= glow.blur).then(|| {
                let falloff = 1.0 - distance / glow.blur;
                (glow.color, falloff * falloff * GLOW_PEAK * alpha)
            })
        });
    }

    fn scan(
        &mut self,
        shape: &Shape,
        margin: f64,
        mut coverage: impl FnMut(f64) -> Option<(Color, f64)>,
    ) {
        let (x0, y0, x1, y1) = shape.bounds();
        let max_x = self.width as f64;
        let max_y = self.height as f64;
        let x_start = (x0 - margin).floor().clamp(0.0, max_x) as u32;
        let x_end = (x1 + margin).ceil().clamp(0.0, max_x) as u32;
        let y_start = (y0 - margin).floor().clamp(0.0, max_y) as u32;
        let y_end = (y1 + margin).ceil().clamp(0.0, max_y) as u32;

        for y in y_start..y_end {
            for x in x_start..x_end {
                let distance = shape.distance(x as f64 + 0.5, y as f64 + 0.5);
                if let Some((color, alpha)) = coverage(distance) {
                    self.blend(x, y, color, alpha);
                }
            }
        }
    }

    /// Source-over compositing of `color` at opacity `alpha`.
    fn blend(&mut self, x: u32, y: u32, color: Color, alpha: f64) {
        if alpha <= 0.0 {
            return;
        }
        let idx = (y * self.width + x) as usize;
        let dst = self.pixels[idx];
        let dst_a = dst[3] as f64 / 255.0;
        let out_a = alpha + dst_a * (1.0 - alpha);
        if out_a <= 0.0 {
            return;
        }
        let channel = |src: u8, dst: u8| {
            let value = (src as f64 * alpha + dst as f64 * dst_a * (1.0 - alpha)) / out_a;
            value.round().clamp(0.0, 255.0) as u8
        };
        self.pixels[idx] = [
            channel(color.r, dst[0]),
            channel(color.g, dst[1]),
            channel(color.b, dst[2]),
            (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
        ];
    }

    /// Encode the canvas as an 8-bit RGBA PNG.
    ///
    /// Compression and filter are fixed so identical pixels always encode
    /// to identical bytes.
    pub fn write_png<W: Write>(&self, writer: W) -> Result<(), CanvasError> {
        let mut encoder = Encoder::new(writer, self.width, self.height);
        encoder.set_color(ColorType::Rgba);
        encoder.set_depth(BitDepth::Eight);
        encoder.set_compression(Compression::Default);
        encoder.set_filter(FilterType::NoFilter);

        let mut png_writer = encoder.write_header()?;
        let data: Vec<u8> = self.pixels.iter().flatten().copied().collect();
        png_writer.write_image_data(&data)?;
        png_writer.finish()?;
        Ok(())
    }

    pub fn to_png(&self) -> Result<Vec<u8>, CanvasError> {
        let mut bytes = Vec::new();
        self.write_png(&mut bytes)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    #[test]
    fn new_canvas_is_blank_and_square() {
        let canvas = Canvas::new();
        assert_eq!(canvas.width(), CANVAS_SIZE);
        assert_eq!(canvas.height(), CANVAS_SIZE);
        assert!(canvas.is_blank());
    }

    #[test]
    fn fill_rect_paints_inside_only() {
        let mut canvas = Canvas::with_size(20, 20);
        canvas.execute(&DrawOp::FillRect {
            x: 5.0,
            y: 5.0,
            w: 10.0,
            h: 10.0,
            color: RED,
        });
        assert_eq!(canvas.pixel(10, 10), [255, 0, 0, 255]);
        assert_eq!(canvas.pixel(2, 2), [0, 0, 0, 0]);
        assert_eq!(canvas.pixel(15, 15), [0, 0, 0, 0]);
    }

    #[test]
    fn global_alpha_blends_over_existing_pixels() {
        let mut canvas = Canvas::with_size(4, 4);
        canvas.execute(&DrawOp::FillRect {
            x: 0.0,
            y: 0.0,
            w: 4.0,
            h: 4.0,
            color: BLUE,
        });
        canvas.execute(&DrawOp::SetAlpha(0.5));
        canvas.execute(&DrawOp::FillRect {
            x: 0.0,
            y: 0.0,
            w: 4.0,
            h: 4.0,
            color: RED,
        });
        let [r, g, b, a] = canvas.pixel(1, 1);
        assert_eq!(a, 255);
        assert_eq!(g, 0);
        assert!((126..=129).contains(&r), "r = {r}");
        assert!((126..=129).contains(&b), "b = {b}");
    }

    #[test]
    fn stroke_circle_leaves_center_empty() {
        let mut canvas = Canvas::with_size(40, 40);
        canvas.execute(&DrawOp::SetLineWidth(3.0));
        canvas.execute(&DrawOp::StrokeCircle {
            cx: 20.0,
            cy: 20.0,
            r: 10.0,
            color: RED,
        });
        assert_eq!(canvas.pixel(20, 20)[3], 0);
        assert_eq!(canvas.pixel(30, 20), [255, 0, 0, 255]);
    }

    #[test]
    fn triangle_covers_its_centroid_but_not_top_corners() {
        let mut canvas = Canvas::with_size(20, 20);
        canvas.execute(&DrawOp::FillTriangle {
            points: [(10.0, 0.0), (20.0, 20.0), (0.0, 20.0)],
            color: RED,
        });
        assert_eq!(canvas.pixel(10, 13)[3], 255);
        assert_eq!(canvas.pixel(0, 0)[3], 0);
        assert_eq!(canvas.pixel(19, 0)[3], 0);
    }

    #[test]
    fn glow_paints_outside_the_shape() {
        let mut canvas = Canvas::with_size(40, 40);
        canvas.execute(&DrawOp::SetGlow(Some(Glow {
            blur: 8.0,
            color: BLUE,
        })));
        canvas.execute(&DrawOp::FillRect {
            x: 15.0,
            y: 15.0,
            w: 10.0,
            h: 10.0,
            color: RED,
        });
        assert_eq!(canvas.pixel(20, 20), [255, 0, 0, 255]);
        let halo = canvas.pixel(13, 20);
        assert!(halo[3] > 0 && halo[2] > 0, "halo = {halo:?}");
        assert_eq!(canvas.pixel(2, 2)[3], 0);
    }

    #[test]
    fn clear_resets_pixels_and_state() {
        let mut canvas = Canvas::with_size(8, 8);
        canvas.execute(&DrawOp::SetAlpha(0.2));
        canvas.execute(&DrawOp::SetGlow(Some(Glow {
            blur: 2.0,
            color: RED,
        })));
        canvas.execute(&DrawOp::FillCircle {
            cx: 4.0,
            cy: 4.0,
            r: 3.0,
            color: RED,
        });
        canvas.clear();
        assert!(canvas.is_blank());
        assert_eq!(canvas.alpha(), 1.0);
        assert_eq!(canvas.glow(), None);
    }

    #[test]
    fn shapes_outside_the_canvas_are_clipped() {
        let mut canvas = Canvas::with_size(10, 10);
        canvas.execute(&DrawOp::FillCircle {
            cx: -50.0,
            cy: 500.0,
            r: 20.0,
            color: RED,
        });
        assert!(canvas.is_blank());
    }

    #[test]
    fn png_export_has_signature_and_is_stable() {
        let mut canvas = Canvas::with_size(16, 16);
        canvas.execute(&DrawOp::FillCircle {
            cx: 8.0,
            cy: 8.0,
            r: 5.0,
            color: BLUE,
        });
        let first = canvas.to_png().unwrap();
        let second = canvas.to_png().unwrap();
        assert_eq!(&first[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(first, second);
    }
}
