//! High-level analyzer: typed operations over a dispatch backend.
//!
//! [`FoodAnalyzer`] is the crate's front door. Each operation is
//! synchronous and atomic: it either returns a complete result or an
//! error, never a partial one. Asynchrony is layered on top through
//! [`FoodAnalyzer::spawn_freshness`] and friends, which run the
//! blocking call on a worker thread and hand back an [`AnalysisJob`].

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use platelens_core::ImageBuffer;
use tracing::debug;

use crate::backend::{AnalysisBackend, Backend, CpuDispatcher};
use crate::extract::{self, AdvancedFoodAnalysis, EdgeMap, FreshnessAnalysis};
use crate::kernel::AnalysisKernel;
use crate::{AnalysisError, AnalysisResult};

/// Food-photo analyzer over an explicitly selected backend.
///
/// Construction fails if the requested backend cannot be brought up;
/// there is no fallback from GPU to CPU. A constructed analyzer is
/// immutable and can be shared across threads.
pub struct FoodAnalyzer {
    backend: Box<dyn AnalysisBackend>,
}

impl FoodAnalyzer {
    /// Create an analyzer on the given backend.
    pub fn new(backend: Backend) -> AnalysisResult<Self> {
        let backend: Box<dyn AnalysisBackend> = match backend {
            Backend::Cpu => Box::new(CpuDispatcher::new()),
            #[cfg(feature = "gpu")]
            Backend::Gpu => Box::new(crate::backend::GpuDispatcher::new()?),
            #[cfg(not(feature = "gpu"))]
            Backend::Gpu => {
                return Err(AnalysisError::AcceleratorUnavailable(
                    "built without gpu support".into(),
                ));
            }
        };
        debug!(backend = backend.name(), "analyzer ready");
        Ok(Self { backend })
    }

    /// Wrap an already constructed backend.
    pub fn with_backend(backend: Box<dyn AnalysisBackend>) -> Self {
        Self { backend }
    }

    /// Name of the underlying backend.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Visually enhance a food photo.
    pub fn enhance(&self, photo: &ImageBuffer) -> AnalysisResult<ImageBuffer> {
        let start = Instant::now();
        let out = self.backend.dispatch(AnalysisKernel::Enhancement, photo)?;
        debug!(elapsed_ms = start.elapsed().as_millis() as u64, "enhance done");
        Ok(out)
    }

    /// Run the nutrition and freshness kernels and aggregate a full
    /// analysis.
    ///
    /// The two dispatches run back to back; the reported
    /// `processing_time` covers both.
    pub fn analyze_nutrition(&self, photo: &ImageBuffer) -> AnalysisResult<AdvancedFoodAnalysis> {
        let start = Instant::now();
        let nutrition = self
            .backend
            .dispatch(AnalysisKernel::NutritionHeuristic, photo)?;
        let freshness = self.backend.dispatch(AnalysisKernel::Freshness, photo)?;
        let elapsed = start.elapsed();
        debug!(elapsed_ms = elapsed.as_millis() as u64, "nutrition analysis done");
        Ok(extract::advanced_food_analysis(
            photo, &nutrition, &freshness, elapsed,
        ))
    }

    /// Assess freshness of a food photo.
    pub fn analyze_freshness(&self, photo: &ImageBuffer) -> AnalysisResult<FreshnessAnalysis> {
        let start = Instant::now();
        let freshness = self.backend.dispatch(AnalysisKernel::Freshness, photo)?;
        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "freshness analysis done"
        );
        Ok(extract::freshness_analysis(&freshness))
    }

    /// Compute an edge-strength map for segmentation.
    pub fn edge_map(&self, photo: &ImageBuffer) -> AnalysisResult<EdgeMap> {
        let edges = self.backend.dispatch(AnalysisKernel::EdgeDetection, photo)?;
        Ok(extract::edge_map(&edges))
    }

    /// Run [`FoodAnalyzer::enhance`] on a worker thread.
    pub fn spawn_enhance(self: &Arc<Self>, photo: ImageBuffer) -> AnalysisJob<ImageBuffer> {
        let analyzer = Arc::clone(self);
        AnalysisJob::spawn(move || analyzer.enhance(&photo))
    }

    /// Run [`FoodAnalyzer::analyze_nutrition`] on a worker thread.
    pub fn spawn_nutrition(
        self: &Arc<Self>,
        photo: ImageBuffer,
    ) -> AnalysisJob<AdvancedFoodAnalysis> {
        let analyzer = Arc::clone(self);
        AnalysisJob::spawn(move || analyzer.analyze_nutrition(&photo))
    }

    /// Run [`FoodAnalyzer::analyze_freshness`] on a worker thread.
    pub fn spawn_freshness(
        self: &Arc<Self>,
        photo: ImageBuffer,
    ) -> AnalysisJob<FreshnessAnalysis> {
        let analyzer = Arc::clone(self);
        AnalysisJob::spawn(move || analyzer.analyze_freshness(&photo))
    }

    /// Run [`FoodAnalyzer::edge_map`] on a worker thread.
    pub fn spawn_edge_map(self: &Arc<Self>, photo: ImageBuffer) -> AnalysisJob<EdgeMap> {
        let analyzer = Arc::clone(self);
        AnalysisJob::spawn(move || analyzer.edge_map(&photo))
    }
}

impl std::fmt::Debug for FoodAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoodAnalyzer")
            .field("backend", &self.backend.name())
            .finish()
    }
}

/// Handle to an analysis running on a worker thread.
///
/// There is no cancellation and no built-in timeout; dropping the job
/// detaches the worker.
pub struct AnalysisJob<T> {
    receiver: mpsc::Receiver<AnalysisResult<T>>,
}

impl<T: Send + 'static> AnalysisJob<T> {
    fn spawn<F>(work: F) -> Self
    where
        F: FnOnce() -> AnalysisResult<T> + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            // Receiver may have been dropped; nothing to report then.
            let _ = sender.send(work());
        });
        Self { receiver }
    }

    /// Block until the analysis finishes.
    pub fn wait(self) -> AnalysisResult<T> {
        match self.receiver.recv() {
            Ok(result) => result,
            Err(_) => Err(AnalysisError::ComputationFailed(
                "analysis worker terminated without a result".into(),
            )),
        }
    }

    /// Non-blocking poll; returns the job back while still running.
    pub fn try_wait(self) -> Result<AnalysisResult<T>, Self> {
        match self.receiver.try_recv() {
            Ok(result) => Ok(result),
            Err(mpsc::TryRecvError::Empty) => Err(self),
            Err(mpsc::TryRecvError::Disconnected) => Ok(Err(AnalysisError::ComputationFailed(
                "analysis worker terminated without a result".into(),
            ))),
        }
    }
}
