//! Procedural NFT art.
//!
//! Four styles share one parameterization: the style picks the
//! algorithm, the palette picks the colors and the complexity scales
//! how much gets drawn. Placement is random but comes entirely from the
//! seeded RNG handed to [`Generator::compose`].

use crate::canvas::{Canvas, CanvasError, DrawOp, Glow, CANVAS_SIZE};
use crate::generators::Generator;
use crate::palette::Color;
use crate::request::{GenerationRequest, StyleKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::f64::consts::PI;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::debug;

const SIZE: f64 = CANVAS_SIZE as f64;

/// Radius of the outermost psychedelic ring.
const MAX_RING_RADIUS: f64 = SIZE / 2.0;
const RING_DOT_RADIUS: f64 = 10.0;
const RING_DOTS: usize = 8;
const RING_STROKE: f64 = 3.0;

const ABSTRACT_ALPHA: f64 = 0.6;

const CYBER_BACKGROUND: Color = Color::from_u32(0x0a0a0a);
const CYBER_GRID_STROKE: f64 = 2.0;
const CYBER_GLOW_BLUR: f64 = 20.0;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render superseded by a newer one")]
    Superseded,

    #[error(transparent)]
    Canvas(#[from] CanvasError),
}

/// A rendered piece ready to hand out.
#[derive(Debug, Clone, Serialize)]
pub struct Artwork {
    pub request: GenerationRequest,
    pub seed: u64,
    #[serde(skip)]
    pub png: Vec<u8>,
}

/// Identifies one render started on a [`RenderSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTicket(u64);

/// Tracks the latest render issued against a shared canvas.
///
/// Starting a render supersedes every earlier one; a superseded batched
/// render stops at its next batch boundary.
#[derive(Debug, Default)]
pub struct RenderSession {
    generation: AtomicU64,
}

impl RenderSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> RenderTicket {
        RenderTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }
}

pub struct ProceduralGenerator {
    pub request: GenerationRequest,
}

impl ProceduralGenerator {
    pub fn new(request: GenerationRequest) -> Self {
        Self { request }
    }

    fn colors(&self) -> &'static [Color] {
        self.request.palette.colors()
    }

    fn pick(&self, rng: &mut impl Rng) -> Color {
        let colors = self.colors();
        colors[rng.gen_range(0..colors.len())]
    }

    /// Number of rings in the psychedelic style.
    pub fn ring_count(&self) -> usize {
        self.request.complexity.get() as usize * 5
    }

    /// Cells per side in the geometric style. Higher complexity means
    /// fewer, larger cells; the grid never drops below a single cell.
    pub fn grid_size(&self) -> usize {
        10usize.saturating_sub(self.request.complexity.get() as usize).max(1)
    }

    /// Distance between cyberpunk grid lines.
    pub fn grid_spacing(&self) -> f64 {
        50.0 / self.request.complexity.get() as f64
    }

    fn compose_psychedelic(&self) -> Vec<DrawOp> {
        let palette = self.request.palette;
        let rings = self.ring_count();
        let center = SIZE / 2.0;
        let step = MAX_RING_RADIUS / rings as f64;

        let mut ops = vec![DrawOp::SetLineWidth(RING_STROKE)];
        for i in 0..rings {
            let radius = (i + 1) as f64 * step;
            ops.push(DrawOp::StrokeCircle {
                cx: center,
                cy: center,
                r: radius,
                color: palette.cycle(i),
            });

            let dot_color = palette.cycle(i + 1);
            for k in 0..RING_DOTS {
                let angle = k as f64 * PI / 4.0;
                ops.push(DrawOp::FillCircle {
                    cx: center + angle.cos() * radius,
                    cy: center + angle.sin() * radius,
                    r: RING_DOT_RADIUS,
                    color: dot_color,
                });
            }
        }
        ops
    }

    fn compose_abstract(&self, rng: &mut impl Rng) -> Vec<DrawOp> {
        let shapes = self.request.complexity.get() as usize * 3;

        let mut ops = vec![DrawOp::SetAlpha(ABSTRACT_ALPHA)];
        for _ in 0..shapes {
            let x = rng.gen_range(0.0..SIZE);
            let y = rng.gen_range(0.0..SIZE);
            let size = rng.gen_range(50.0..150.0);
            let color = self.pick(rng);

            if rng.gen_bool(0.5) {
                ops.push(DrawOp::FillRect {
                    x,
                    y,
                    w: size,
                    h: size,
                    color,
                });
            } else {
                ops.push(DrawOp::FillCircle {
                    cx: x,
                    cy: y,
                    r: size / 2.0,
                    color,
                });
            }
        }
        ops.push(DrawOp::SetAlpha(1.0));
        ops
    }

    fn compose_geometric(&self, rng: &mut impl Rng) -> Vec<DrawOp> {
        let grid = self.grid_size();
        let cell_w = SIZE / grid as f64;
        let cell_h = SIZE / grid as f64;

        let mut ops = Vec::with_capacity(grid * grid);
        for i in 0..grid {
            for j in 0..grid {
                let x = i as f64 * cell_w;
                let y = j as f64 * cell_h;
                let color = self.pick(rng);

                ops.push(match rng.gen_range(0..3) {
                    0 => DrawOp::FillRect {
                        x,
                        y,
                        w: cell_w,
                        h: cell_h,
                        color,
                    },
                    1 => DrawOp::FillTriangle {
                        points: [
                            (x + cell_w / 2.0, y),
                            (x + cell_w, y + cell_h),
                            (x, y + cell_h),
                        ],
                        color,
                    },
                    _ => DrawOp::FillCircle {
                        cx: x + cell_w / 2.0,
                        cy: y + cell_h / 2.0,
                        r: cell_w / 2.0,
                        color,
                    },
                });
            }
        }
        ops
    }

    fn compose_cyberpunk(&self, rng: &mut impl Rng) -> Vec<DrawOp> {
        let neon = self.colors()[0];
        let spacing = self.grid_spacing();

        let mut ops = vec![
            DrawOp::FillRect {
                x: 0.0,
                y: 0.0,
                w: SIZE,
                h: SIZE,
                color: CYBER_BACKGROUND,
            },
            DrawOp::SetLineWidth(CYBER_GRID_STROKE),
        ];

        let mut offset = 0.0;
        while offset < SIZE {
            ops.push(DrawOp::Line {
                from: (offset, 0.0),
                to: (offset, SIZE),
                color: neon,
            });
            ops.push(DrawOp::Line {
                from: (0.0, offset),
                to: (SIZE, offset),
                color: neon,
            });
            offset += spacing;
        }

        let squares = self.request.complexity.get() as usize * 2;
        for _ in 0..squares {
            let x = rng.gen_range(0.0..SIZE);
            let y = rng.gen_range(0.0..SIZE);
            let size = rng.gen_range(20.0..70.0);
            let color = self.pick(rng);

            ops.push(DrawOp::SetGlow(Some(Glow {
                blur: CYBER_GLOW_BLUR,
                color,
            })));
            ops.push(DrawOp::FillRect {
                x,
                y,
                w: size,
                h: size,
                color,
            });
        }
        ops.push(DrawOp::SetGlow(None));
        ops
    }

    /// Render into a fresh canvas and export it as PNG.
    pub fn artwork(&self, seed: u64) -> Result<Artwork, RenderError> {
        let mut canvas = Canvas::new();
        self.render(&mut canvas, seed);
        Ok(Artwork {
            request: self.request,
            seed,
            png: canvas.to_png()?,
        })
    }

    /// Render in batches of `batch_size` ops, giving up as soon as
    /// `ticket` is no longer the session's latest render.
    ///
    /// `on_batch` runs after each batch with the number of batches done.
    pub fn render_batched(
        &self,
        canvas: &mut Canvas,
        seed: u64,
        batch_size: usize,
        session: &RenderSession,
        ticket: RenderTicket,
        mut on_batch: impl FnMut(usize),
    ) -> Result<(), RenderError> {
        if !session.is_current(ticket) {
            return Err(RenderError::Superseded);
        }
        canvas.clear();
        let mut rng = StdRng::seed_from_u64(seed);
        let ops = self.compose(&mut rng);

        for (done, batch) in ops.chunks(batch_size.max(1)).enumerate() {
            if !session.is_current(ticket) {
                debug!(style = %self.request.style, batches = done, "render superseded");
                return Err(RenderError::Superseded);
            }
            canvas.execute_all(batch);
            on_batch(done + 1);
        }
        Ok(())
    }
}

impl Generator for ProceduralGenerator {
    fn name(&self) -> &'static str {
        self.request.style.name()
    }

    fn compose(&self, rng: &mut StdRng) -> Vec<DrawOp> {
        match self.request.style {
            StyleKind::Psychedelic => self.compose_psychedelic(),
            StyleKind::Abstract => self.compose_abstract(rng),
            StyleKind::Geometric => self.compose_geometric(rng),
            StyleKind::Cyberpunk => self.compose_cyberpunk(rng),
        }
    }

    fn extension(&self) -> &'static str {
        "png"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PaletteKind;
    use crate::request::Complexity;

    fn generator(style: StyleKind, palette: PaletteKind, complexity: i64) -> ProceduralGenerator {
        ProceduralGenerator::new(GenerationRequest::new(
            style,
            palette,
            Complexity::new(complexity).unwrap(),
        ))
    }

    fn compose(gen: &ProceduralGenerator, seed: u64) -> Vec<DrawOp> {
        gen.compose(&mut StdRng::seed_from_u64(seed))
    }

    fn shapes(ops: &[DrawOp]) -> Vec<&DrawOp> {
        ops.iter().filter(|op| op.is_shape()).collect()
    }

    #[test]
    fn every_style_and_complexity_renders_a_full_canvas() {
        for style in StyleKind::ALL {
            for complexity in 1..=10 {
                let gen = generator(style, PaletteKind::Neon, complexity);
                let mut canvas = Canvas::new();
                gen.render(&mut canvas, 7);
                assert_eq!(canvas.width(), CANVAS_SIZE);
                assert_eq!(canvas.height(), CANVAS_SIZE);
                assert!(!canvas.is_blank(), "{style} at {complexity} drew nothing");
            }
        }
    }

    #[test]
    fn psychedelic_ring_count_and_radius_bound() {
        for complexity in 1..=10 {
            let gen = generator(StyleKind::Psychedelic, PaletteKind::Rainbow, complexity);
            let ops = compose(&gen, 0);
            let rings: Vec<f64> = ops
                .iter()
                .filter_map(|op| match op {
                    DrawOp::StrokeCircle { r, .. } => Some(*r),
                    _ => None,
                })
                .collect();
            assert_eq!(rings.len(), complexity as usize * 5);
            let outer = rings.iter().copied().fold(0.0, f64::max);
            assert!(outer <= 250.0 + 1e-9, "outer ring {outer}");
            assert!(rings.windows(2).all(|w| w[1] > w[0]));
        }
    }

    #[test]
    fn psychedelic_colors_cycle_through_palette() {
        let gen = generator(StyleKind::Psychedelic, PaletteKind::Neon, 2);
        let ops = compose(&gen, 0);
        let mut ring = 0;
        let mut dots_seen = 0;
        for op in &ops {
            match op {
                DrawOp::StrokeCircle { color, .. } => {
                    assert_eq!(*color, PaletteKind::Neon.cycle(ring));
                    ring += 1;
                }
                DrawOp::FillCircle { color, r, .. } => {
                    assert_eq!(*r, RING_DOT_RADIUS);
                    assert_eq!(*color, PaletteKind::Neon.cycle(ring));
                    dots_seen += 1;
                }
                _ => {}
            }
        }
        assert_eq!(dots_seen, ring * RING_DOTS);
    }

    #[test]
    fn abstract_resets_alpha() {
        for complexity in [1, 5, 10] {
            let gen = generator(StyleKind::Abstract, PaletteKind::Pastel, complexity);
            let ops = compose(&gen, 99);
            assert_eq!(ops.first(), Some(&DrawOp::SetAlpha(ABSTRACT_ALPHA)));
            assert_eq!(ops.last(), Some(&DrawOp::SetAlpha(1.0)));
            assert_eq!(shapes(&ops).len(), complexity as usize * 3);

            let mut canvas = Canvas::new();
            gen.render(&mut canvas, 99);
            assert_eq!(canvas.alpha(), 1.0);
        }
    }

    #[test]
    fn abstract_shapes_stay_in_parameter_ranges() {
        let gen = generator(StyleKind::Abstract, PaletteKind::Dark, 10);
        for op in compose(&gen, 3) {
            match op {
                DrawOp::FillRect { x, y, w, h, color } => {
                    assert!((0.0..SIZE).contains(&x) && (0.0..SIZE).contains(&y));
                    assert_eq!(w, h);
                    assert!((50.0..150.0).contains(&w));
                    assert!(PaletteKind::Dark.contains(color));
                }
                DrawOp::FillCircle { r, color, .. } => {
                    assert!((25.0..75.0).contains(&r));
                    assert!(PaletteKind::Dark.contains(color));
                }
                DrawOp::SetAlpha(_) => {}
                other => panic!("unexpected op {other:?}"),
            }
        }
    }

    #[test]
    fn geometric_grid_has_one_shape_per_cell() {
        for complexity in 1..=9 {
            let gen = generator(StyleKind::Geometric, PaletteKind::Rainbow, complexity);
            let expected = 10 - complexity as usize;
            assert_eq!(gen.grid_size(), expected);
            let ops = compose(&gen, complexity as u64);
            assert_eq!(shapes(&ops).len(), expected * expected);
        }
    }

    #[test]
    fn geometric_max_complexity_is_a_single_cell() {
        let gen = generator(StyleKind::Geometric, PaletteKind::Rainbow, 10);
        assert_eq!(gen.grid_size(), 1);
        let ops = compose(&gen, 1);
        assert_eq!(ops.len(), 1);
        let mut canvas = Canvas::new();
        gen.render(&mut canvas, 1);
        assert!(!canvas.is_blank());
    }

    #[test]
    fn cyberpunk_grid_and_glow_reset() {
        let gen = generator(StyleKind::Cyberpunk, PaletteKind::Neon, 4);
        let ops = compose(&gen, 5);

        let lines = ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { .. }))
            .count();
        let per_axis = (SIZE / gen.grid_spacing()).ceil() as usize;
        assert_eq!(lines, per_axis * 2);

        for op in &ops {
            if let DrawOp::Line { color, .. } = op {
                assert_eq!(*color, PaletteKind::Neon.colors()[0]);
            }
        }

        let squares = ops
            .iter()
            .filter(|op| matches!(op, DrawOp::FillRect { w, .. } if *w < SIZE))
            .count();
        assert_eq!(squares, 8);
        assert_eq!(ops.last(), Some(&DrawOp::SetGlow(None)));

        let mut canvas = Canvas::new();
        gen.render(&mut canvas, 5);
        assert_eq!(canvas.glow(), None);
        assert_eq!(canvas.pixel(1, 499)[3], 255);
    }

    #[test]
    fn style_alone_selects_the_algorithm() {
        let a = generator(StyleKind::Psychedelic, PaletteKind::Neon, 3);
        let b = generator(StyleKind::Psychedelic, PaletteKind::Dark, 3);
        let ops_a = compose(&a, 11);
        let ops_b = compose(&b, 11);
        assert_eq!(ops_a.len(), ops_b.len());
        for (x, y) in ops_a.iter().zip(&ops_b) {
            assert_eq!(std::mem::discriminant(x), std::mem::discriminant(y));
        }
    }

    #[test]
    fn same_seed_same_png() {
        let gen = generator(StyleKind::Abstract, PaletteKind::Rainbow, 6);
        let first = gen.artwork(1234).unwrap();
        let second = gen.artwork(1234).unwrap();
        let other = gen.artwork(4321).unwrap();
        assert_eq!(first.png, second.png);
        assert_ne!(first.png, other.png);
    }

    #[test]
    fn render_clears_previous_piece() {
        let mut canvas = Canvas::new();
        generator(StyleKind::Cyberpunk, PaletteKind::Neon, 10).render(&mut canvas, 1);
        generator(StyleKind::Psychedelic, PaletteKind::Neon, 1).render(&mut canvas, 1);
        // corners lie outside every ring and were painted by the cyberpunk background
        assert_eq!(canvas.pixel(0, 0)[3], 0);
    }

    #[test]
    fn batched_render_matches_single_pass() {
        let gen = generator(StyleKind::Geometric, PaletteKind::Pastel, 3);
        let session = RenderSession::new();

        let mut batched = Canvas::new();
        let mut batches = 0;
        gen.render_batched(&mut batched, 8, 5, &session, session.begin(), |n| batches = n)
            .unwrap();

        let mut whole = Canvas::new();
        gen.render(&mut whole, 8);

        assert_eq!(batches, (49 + 4) / 5);
        assert_eq!(batched.pixels(), whole.pixels());
    }

    #[test]
    fn newer_render_supersedes_older() {
        let gen = generator(StyleKind::Psychedelic, PaletteKind::Rainbow, 4);
        let session = RenderSession::new();
        let mut canvas = Canvas::new();

        let first = session.begin();
        let mut completed = 0;
        let result = gen.render_batched(&mut canvas, 1, 10, &session, first, |n| {
            completed = n;
            if n == 2 {
                session.begin();
            }
        });
        assert!(matches!(result, Err(RenderError::Superseded)));
        assert_eq!(completed, 2);
        assert!(!session.is_current(first));
    }
}
