//! Core types: analysis results, label sets, decoded frames, tracing

pub mod analysis;
pub mod frame;
pub mod tracing;

pub use analysis::{AnalysisResult, LabelSet, LabelSetError};
pub use frame::{DecodedFrame, FrameError, RGB_CHANNELS};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
