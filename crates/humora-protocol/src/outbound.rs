//! Outbound message encoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use humora_core::AnalysisResult;
use serde::{Deserialize, Serialize};

use crate::BASE64_MARKER;
use crate::error::ProtocolResult;

/// Reply sent for a skipped frame when error replies are enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    /// Human-readable reason the frame was skipped.
    pub error: String,
}

/// Serializes an analysis result for the peer.
pub fn encode_result(result: &AnalysisResult) -> ProtocolResult<String> {
    Ok(serde_json::to_string(result)?)
}

/// Serializes an error reply for the peer.
pub fn encode_error(message: impl Into<String>) -> ProtocolResult<String> {
    let reply = ErrorReply {
        error: message.into(),
    };
    Ok(serde_json::to_string(&reply)?)
}

/// Builds a `data:<mime>;base64,<payload>` string, as browsers produce with
/// `canvas.toDataURL`.
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};{BASE64_MARKER}{}", STANDARD.encode(bytes))
}
