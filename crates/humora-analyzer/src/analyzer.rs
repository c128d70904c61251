//! Analyzer trait definition.
//!
//! [`Analyzer`] is the capability a session calls once per decoded frame.
//! Implementations must be safe to call from many sessions at once: the
//! server shares one instance behind an `Arc`.

use std::future::Future;
use std::pin::Pin;

use humora_core::{AnalysisResult, DecodedFrame};

use crate::error::{AnalyzerError, AnalyzerResult};

/// A boxed future, used to keep [`Analyzer`] object safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Turns a decoded frame into an emotion/age/gender estimate.
///
/// # Implementation Notes
///
/// - Implementations are `Send + Sync` and hold no per-session state
/// - The frame is borrowed for the duration of the call only
/// - Errors are reported per frame; the caller skips the frame and moves on
///
/// # Example Implementation
///
/// ```ignore
/// struct OnnxAnalyzer {
///     session: ort::Session,
/// }
///
/// impl Analyzer for OnnxAnalyzer {
///     fn name(&self) -> &str { "onnx" }
///
///     fn analyze<'a>(&'a self, frame: &'a DecodedFrame) -> BoxFuture<'a, AnalyzerResult<AnalysisResult>> {
///         Box::pin(async move {
///             let scores = self.run(frame).await?;
///             Ok(scores.into_result())
///         })
///     }
/// }
/// ```
pub trait Analyzer: Send + Sync {
    /// Returns the name of this analyzer (e.g. "random").
    fn name(&self) -> &str;

    /// Analyzes one frame.
    ///
    /// # Errors
    ///
    /// Returns `AnalyzerError` when the frame cannot be analyzed or the
    /// backing model fails.
    fn analyze<'a>(
        &'a self,
        frame: &'a DecodedFrame,
    ) -> BoxFuture<'a, AnalyzerResult<AnalysisResult>>;
}

/// An analyzer that always returns an error.
///
/// Stands in for an analyzer that failed to initialize, and drives the
/// failure paths in tests.
#[derive(Debug)]
pub struct ErrorAnalyzer {
    name: String,
    error: AnalyzerError,
}

impl ErrorAnalyzer {
    /// Creates a new error analyzer.
    pub fn new(name: impl Into<String>, error: AnalyzerError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }
}

impl Analyzer for ErrorAnalyzer {
    fn name(&self) -> &str {
        &self.name
    }

    fn analyze<'a>(
        &'a self,
        _frame: &'a DecodedFrame,
    ) -> BoxFuture<'a, AnalyzerResult<AnalysisResult>> {
        // AnalyzerError holds a boxed source and is not Clone
        let error =
            AnalyzerError::new(self.error.code(), self.error.message()).with_analyzer(&self.name);
        Box::pin(async move { Err(error) })
    }
}
