//! Multithreaded CPU dispatcher.
//!
//! Runs the reference kernel math from [`crate::kernel`] directly,
//! parallelized over rows with rayon. This is the numeric oracle the
//! GPU path is validated against.

use platelens_core::{ImageBuffer, image::CHANNELS};
use rayon::prelude::*;
use tracing::debug;

use crate::kernel::AnalysisKernel;
use crate::AnalysisResult;

use super::{validate_input, AnalysisBackend};

/// CPU backend running the reference per-pixel functions via rayon.
///
/// Stateless; construction never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpuDispatcher;

impl CpuDispatcher {
    /// Create a CPU dispatcher.
    pub fn new() -> Self {
        Self
    }
}

impl AnalysisBackend for CpuDispatcher {
    fn dispatch(&self, kernel: AnalysisKernel, input: &ImageBuffer) -> AnalysisResult<ImageBuffer> {
        validate_input(input)?;
        let (width, height) = input.dimensions();
        debug!(kernel = %kernel, width, height, "cpu dispatch");

        let mut out = vec![0.0f32; input.data().len()];
        let row_floats = width as usize * CHANNELS;

        out.par_chunks_mut(row_floats)
            .enumerate()
            .for_each(|(y, row)| {
                for x in 0..width {
                    let px = kernel.eval(input, x, y as u32);
                    let base = x as usize * CHANNELS;
                    row[base..base + CHANNELS].copy_from_slice(&px);
                }
            });

        // Dimensions match the input, so this cannot fail.
        ImageBuffer::from_rgba(out, width, height)
            .map_err(|e| crate::AnalysisError::ComputationFailed(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "cpu"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnalysisError;
    use approx::assert_relative_eq;

    #[test]
    fn test_rejects_empty_image() {
        let dispatcher = CpuDispatcher::new();
        let err = dispatcher
            .dispatch(AnalysisKernel::Enhancement, &ImageBuffer::empty())
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InvalidImage { width: 0, height: 0 }
        ));
    }

    #[test]
    fn test_output_matches_reference_math() {
        let img = ImageBuffer::from_rgba(
            vec![
                0.9, 0.2, 0.1, 1.0, /* */ 0.2, 0.8, 0.3, 1.0, //
                0.5, 0.4, 0.2, 1.0, /* */ 0.1, 0.1, 0.9, 0.5,
            ],
            2,
            2,
        )
        .unwrap();

        let dispatcher = CpuDispatcher::new();
        for kernel in AnalysisKernel::ALL {
            let out = dispatcher.dispatch(kernel, &img).unwrap();
            assert_eq!(out.dimensions(), img.dimensions());
            for y in 0..2 {
                for x in 0..2 {
                    let got = out.pixel(x, y).unwrap();
                    let want = kernel.eval(&img, x, y);
                    for c in 0..4 {
                        assert_relative_eq!(got[c], want[c]);
                    }
                }
            }
        }
    }

    #[test]
    fn test_input_not_mutated() {
        let img = ImageBuffer::splat([0.6, 0.3, 0.1, 1.0], 8, 8).unwrap();
        let before = img.data().to_vec();
        CpuDispatcher::new()
            .dispatch(AnalysisKernel::Enhancement, &img)
            .unwrap();
        assert_eq!(img.data(), before.as_slice());
    }

    #[test]
    fn test_odd_dimensions() {
        let img = ImageBuffer::splat([0.4, 0.4, 0.4, 1.0], 33, 17).unwrap();
        let out = CpuDispatcher::new()
            .dispatch(AnalysisKernel::EdgeDetection, &img)
            .unwrap();
        assert_eq!(out.dimensions(), (33, 17));
        // Uniform image has zero gradient everywhere.
        assert_relative_eq!(out.channel_max(0), 0.0);
    }
}
