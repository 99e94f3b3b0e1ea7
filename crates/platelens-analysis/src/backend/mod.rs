//! Dispatch backends.
//!
//! A backend executes one [`AnalysisKernel`] over a whole image per
//! call. Both implementations validate input dimensions first, produce
//! an output buffer of identical dimensions, and never mutate the
//! input. Calls block until the result is fully resident on the host.

mod cpu;
#[cfg(feature = "gpu")]
mod gpu;

pub use cpu::CpuDispatcher;
#[cfg(feature = "gpu")]
pub use gpu::GpuDispatcher;

use platelens_core::ImageBuffer;

use crate::kernel::AnalysisKernel;
use crate::{AnalysisError, AnalysisResult};

/// Square tile edge: kernels execute over 16x16 pixel tiles.
pub const TILE_SIZE: u32 = 16;

/// Number of 16x16 tiles needed to cover a `width x height` image.
///
/// Partial edge tiles count as full tiles; kernels bounds-check each
/// pixel so overhanging tile threads write nothing.
pub fn workgroup_grid(width: u32, height: u32) -> (u32, u32) {
    (width.div_ceil(TILE_SIZE), height.div_ceil(TILE_SIZE))
}

/// Rejects empty images before any device or thread-pool work starts.
pub(crate) fn validate_input(input: &ImageBuffer) -> AnalysisResult<()> {
    if input.is_empty() {
        return Err(AnalysisError::InvalidImage {
            width: input.width,
            height: input.height,
        });
    }
    Ok(())
}

/// Executes analysis kernels over images.
///
/// Implementations are `Send + Sync` so one dispatcher can be shared
/// across threads; kernel state is compiled once and read-only after
/// construction.
pub trait AnalysisBackend: Send + Sync {
    /// Run `kernel` over `input`, returning a same-sized output buffer.
    fn dispatch(&self, kernel: AnalysisKernel, input: &ImageBuffer) -> AnalysisResult<ImageBuffer>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// Backend selection.
///
/// Selection is explicit: requesting [`Backend::Gpu`] on a machine with
/// no compatible adapter fails construction rather than silently
/// running on the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Multithreaded CPU reference implementation.
    Cpu,
    /// wgpu compute shaders.
    #[default]
    Gpu,
}

impl Backend {
    /// `true` if this backend can be constructed on the current machine.
    pub fn is_available(self) -> bool {
        match self {
            Self::Cpu => true,
            #[cfg(feature = "gpu")]
            Self::Gpu => GpuDispatcher::is_available(),
            #[cfg(not(feature = "gpu"))]
            Self::Gpu => false,
        }
    }

    /// Backend name for logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Gpu => "gpu",
        }
    }
}
