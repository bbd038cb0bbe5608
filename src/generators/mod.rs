//! Art generators - each turns a request into a list of draw ops.

pub mod procedural;

use crate::canvas::{Canvas, DrawOp};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub use procedural::{Artwork, ProceduralGenerator, RenderError, RenderSession, RenderTicket};

/// Trait for all art generators.
pub trait Generator {
    /// Name of this generator style.
    fn name(&self) -> &'static str;

    /// Build the display list for one piece, drawing all randomness
    /// from `rng`.
    fn compose(&self, rng: &mut StdRng) -> Vec<DrawOp>;

    /// File extension for this generator's exported output.
    fn extension(&self) -> &'static str;

    /// Clear `canvas` and draw one piece onto it.
    ///
    /// The same seed always produces the same pixels.
    fn render(&self, canvas: &mut Canvas, seed: u64) {
        canvas.clear();
        let mut rng = StdRng::seed_from_u64(seed);
        let ops = self.compose(&mut rng);
        canvas.execute_all(&ops);
    }
}
