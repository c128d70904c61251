//! Helpers shared by the session and end-to-end tests.

use humora_analyzer::{Analyzer, AnalyzerResult, BoxFuture};
use humora_core::{AnalysisResult, DecodedFrame};
use humora_protocol::{encode_data_uri, encode_jpeg, encode_png, strip_scheme_prefix};

/// Analyzer whose answer depends on the frame: the age is the frame width.
///
/// Lets tests check that each response belongs to the frame that produced
/// it.
pub(crate) struct WidthAnalyzer;

impl Analyzer for WidthAnalyzer {
    fn name(&self) -> &str {
        "width"
    }

    fn analyze<'a>(
        &'a self,
        frame: &'a DecodedFrame,
    ) -> BoxFuture<'a, AnalyzerResult<AnalysisResult>> {
        let age = u8::try_from(frame.width()).unwrap_or(u8::MAX);
        Box::pin(async move { Ok(AnalysisResult::new("Neutral", age, "Female")) })
    }
}

pub(crate) fn frame(width: u32, height: u32) -> DecodedFrame {
    let pixels = (0..width * height)
        .flat_map(|i| [(i % 256) as u8, 90, 180])
        .collect();
    DecodedFrame::new(width, height, pixels).unwrap()
}

/// A PNG of the given size as a browser-style data URI.
pub(crate) fn png_data_uri(width: u32, height: u32) -> String {
    encode_data_uri("image/png", &encode_png(&frame(width, height)).unwrap())
}

/// The same PNG as bare base64.
pub(crate) fn png_base64(width: u32, height: u32) -> String {
    strip_scheme_prefix(&png_data_uri(width, height)).to_string()
}

/// A JPEG at the quality browsers use for canvas snapshots.
pub(crate) fn jpeg_data_uri(width: u32, height: u32) -> String {
    encode_data_uri("image/jpeg", &encode_jpeg(&frame(width, height), 70).unwrap())
}
