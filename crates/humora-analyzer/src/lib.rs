//! Analyzer trait and implementations.
//!
//! An analyzer turns one [`DecodedFrame`](humora_core::DecodedFrame) into an
//! [`AnalysisResult`](humora_core::AnalysisResult). The server holds a single
//! `Arc<dyn Analyzer>` and calls it from every session concurrently.
//!
//! ```text
//! ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//! │  Session A   │  │  Session B   │  │  Session C   │
//! └──────┬───────┘  └──────┬───────┘  └──────┬───────┘
//!        │                 │                 │
//!        └─────────┬───────┴─────────────────┘
//!                  │  analyze(&frame)
//!                  ▼
//!        ┌───────────────────┐
//!        │  Arc<dyn Analyzer>│
//!        └─────────┬─────────┘
//!                  ▼
//!           AnalysisResult
//! ```
//!
//! # Example
//!
//! ```ignore
//! use humora_analyzer::{Analyzer, RandomAnalyzer};
//! use humora_core::LabelSet;
//!
//! let analyzer = RandomAnalyzer::new(LabelSet::default())?;
//! let result = analyzer.analyze(&frame).await?;
//! ```

pub mod analyzer;
pub mod error;
pub mod random;

pub use analyzer::{Analyzer, BoxFuture, ErrorAnalyzer};
pub use error::{AnalyzerError, AnalyzerErrorCode, AnalyzerResult};
pub use random::RandomAnalyzer;
