//! Random analyzer.
//!
//! Produces a uniformly random result from the configured [`LabelSet`]
//! without looking at the pixels. This is what the service ships with until
//! a real model is plugged in, and what the frontend is developed against.

use std::time::Duration;

use humora_core::{AnalysisResult, DecodedFrame, LabelSet};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::trace;

use crate::analyzer::{Analyzer, BoxFuture};
use crate::error::{AnalyzerError, AnalyzerResult};

const NAME: &str = "random";

/// Analyzer returning random labels.
///
/// Each call draws from the calling thread's RNG, so concurrent sessions
/// never contend on a shared generator.
#[derive(Debug, Clone)]
pub struct RandomAnalyzer {
    labels: LabelSet,
    latency: Option<Duration>,
}

impl RandomAnalyzer {
    /// Creates a random analyzer over the given labels.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the label set is invalid.
    pub fn new(labels: LabelSet) -> AnalyzerResult<Self> {
        labels.validate().map_err(|e| {
            AnalyzerError::configuration(e.to_string())
                .with_analyzer(NAME)
                .with_source(e)
        })?;

        Ok(Self {
            labels,
            latency: None,
        })
    }

    /// Simulates model processing time on every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency).filter(|d| !d.is_zero());
        self
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn latency(&self) -> Option<Duration> {
        self.latency
    }

    fn sample(&self) -> AnalyzerResult<AnalysisResult> {
        let mut rng = rand::rng();

        let emotion = self
            .labels
            .emotions
            .choose(&mut rng)
            .ok_or_else(|| AnalyzerError::internal("no emotion labels").with_analyzer(NAME))?;
        let gender = self
            .labels
            .genders
            .choose(&mut rng)
            .ok_or_else(|| AnalyzerError::internal("no gender labels").with_analyzer(NAME))?;
        let age = rng.random_range(self.labels.min_age..=self.labels.max_age);

        Ok(AnalysisResult::new(emotion.clone(), age, gender.clone()))
    }
}

impl Analyzer for RandomAnalyzer {
    fn name(&self) -> &str {
        NAME
    }

    fn analyze<'a>(
        &'a self,
        frame: &'a DecodedFrame,
    ) -> BoxFuture<'a, AnalyzerResult<AnalysisResult>> {
        trace!(width = frame.width(), height = frame.height(), "Sampling random result");

        // ThreadRng is !Send, draw before building the future
        let result = self.sample();
        let latency = self.latency;

        Box::pin(async move {
            if let Some(delay) = latency {
                tokio::time::sleep(delay).await;
            }
            result
        })
    }
}
