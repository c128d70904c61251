//! Per-connection session loop.
//!
//! A [`Session`] owns one transport and processes its messages strictly in
//! order:
//!
//! ```text
//! recv ──► classify ──► ping ─────────────────────────► "PONG"
//!             │
//!             └──────► image ─► decode ─► analyze ─► encode ─► send
//!                                  │          │         │
//!                                  └──────────┴─────────┴──► skip frame
//! ```
//!
//! A skipped frame never ends the session. Only the transport does: a clean
//! close, an I/O failure, an idle timeout or server shutdown.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use humora_analyzer::{Analyzer, AnalyzerError};
use humora_core::{AnalysisResult, DecodedFrame};
use humora_protocol::{
    ControlMessage, DecodeLimits, ImagePayload, InboundMessage, PONG, ProtocolError,
    classify_text, decode_payload, encode_error, encode_result,
};
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{Instrument, Span, debug, info, info_span, warn};
use uuid::Uuid;

use crate::error::{ServerError, ServerResult, TransportError, TransportResult};
use crate::signals::ShutdownHandle;
use crate::transport::{Transport, WireMessage};

/// Unique session identifier, used to correlate log lines.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl Default for SessionId {
    fn default() -> Self {
        Self(format!("session_{}", Uuid::now_v7()))
    }
}

impl SessionId {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Knobs that change how a session treats its frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Payload size and frame dimension bounds. Frames outside them are
    /// skipped.
    pub decode_limits: DecodeLimits,
    /// End the session after this long without a message.
    pub idle_timeout: Option<Duration>,
    /// Skip a frame whose analysis runs longer than this.
    pub analyze_timeout: Option<Duration>,
    /// Reply `{"error": ...}` to skipped frames.
    pub error_replies: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            decode_limits: DecodeLimits::default(),
            idle_timeout: None,
            analyze_timeout: None,
            error_replies: false,
        }
    }
}

/// Everything a session needs besides its transport.
///
/// Cheap to clone; the analyzer and shutdown channel are shared by every
/// session of a server.
#[derive(Clone)]
pub struct SessionContext {
    analyzer: Arc<dyn Analyzer>,
    settings: SessionSettings,
    shutdown: ShutdownHandle,
}

impl SessionContext {
    /// Creates a context with default settings and its own shutdown handle.
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        Self {
            analyzer,
            settings: SessionSettings::default(),
            shutdown: ShutdownHandle::new(),
        }
    }

    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownHandle) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn analyzer(&self) -> &dyn Analyzer {
        self.analyzer.as_ref()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Decodes, analyzes and encodes one frame.
    async fn process_frame(&self, payload: ImagePayload) -> Result<String, SkipReason> {
        let limits = self.settings.decode_limits;
        let frame =
            tokio::task::spawn_blocking(move || decode_payload(&payload, &limits)).await??;
        debug!(
            width = frame.width(),
            height = frame.height(),
            "Frame decoded"
        );

        let result = self.analyze(&frame).await?;
        Ok(encode_result(&result)?)
    }

    async fn analyze(&self, frame: &DecodedFrame) -> Result<AnalysisResult, SkipReason> {
        let analysis = self.analyzer.analyze(frame);
        match self.settings.analyze_timeout {
            Some(limit) => tokio::time::timeout(limit, analysis)
                .await
                .map_err(|_| SkipReason::AnalyzeTimeout(limit))?
                .map_err(SkipReason::from),
            None => Ok(analysis.await?),
        }
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("analyzer", &self.analyzer.name())
            .field("settings", &self.settings)
            .finish()
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The peer closed the stream cleanly.
    GracefulDisconnect,
    /// The stream failed.
    AbnormalTermination(TransportError),
    /// No message arrived within the idle timeout.
    IdleTimeout,
    /// The server is shutting down.
    Shutdown,
}

impl SessionOutcome {
    /// Returns true for every outcome except a transport failure.
    pub fn is_clean(&self) -> bool {
        !matches!(self, Self::AbnormalTermination(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GracefulDisconnect => "graceful_disconnect",
            Self::AbnormalTermination(_) => "abnormal_termination",
            Self::IdleTimeout => "idle_timeout",
            Self::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AbnormalTermination(cause) => write!(f, "{}: {}", self.as_str(), cause),
            _ => f.write_str(self.as_str()),
        }
    }
}

/// Per-session counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Image payloads received.
    pub frames_received: u64,
    /// Analysis results sent back.
    pub responses_sent: u64,
    /// Frames dropped by decode or analyzer failure.
    pub frames_skipped: u64,
    /// Pings and other non-image text.
    pub control_messages: u64,
}

/// Summary published when a session ends.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub id: SessionId,
    pub outcome: SessionOutcome,
    pub stats: SessionStats,
}

/// Why a frame produced no result.
#[derive(Debug, Error)]
enum SkipReason {
    #[error(transparent)]
    Decode(#[from] ProtocolError),

    #[error(transparent)]
    Analyze(#[from] AnalyzerError),

    #[error("analysis timed out after {}ms", .0.as_millis())]
    AnalyzeTimeout(Duration),

    #[error("decoder task failed: {0}")]
    DecoderTask(#[from] JoinError),
}

impl SkipReason {
    fn kind(&self) -> &'static str {
        match self {
            Self::Decode(e) => e.kind(),
            Self::Analyze(e) => e.code().as_str(),
            Self::AnalyzeTimeout(_) => "analyze_timeout",
            Self::DecoderTask(_) => "decoder_task",
        }
    }
}

enum Step {
    Received(TransportResult<Option<WireMessage>>),
    Idle,
    Shutdown,
}

async fn recv_step<T: Transport>(transport: &mut T, idle_timeout: Option<Duration>) -> Step {
    match idle_timeout {
        Some(limit) => match tokio::time::timeout(limit, transport.recv()).await {
            Ok(received) => Step::Received(received),
            Err(_) => Step::Idle,
        },
        None => Step::Received(transport.recv().await),
    }
}

/// One live connection and its processing loop.
pub struct Session<T> {
    id: SessionId,
    transport: T,
    ctx: SessionContext,
    stats: SessionStats,
    span: Span,
}

impl<T: Transport> Session<T> {
    /// Wraps an accepted transport.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::TransportClosed`] if the transport has already
    /// ended.
    pub fn accept(transport: T, ctx: SessionContext) -> ServerResult<Self> {
        if transport.is_closed() {
            return Err(ServerError::TransportClosed);
        }

        let id = SessionId::new();
        let span = info_span!("session", session_id = %id);
        span.in_scope(|| info!(analyzer = ctx.analyzer.name(), "Session established"));

        Ok(Self {
            id,
            transport,
            ctx,
            stats: SessionStats::default(),
            span,
        })
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Builds the end-of-session summary.
    pub fn report(&self, outcome: SessionOutcome) -> SessionReport {
        SessionReport {
            id: self.id.clone(),
            outcome,
            stats: self.stats,
        }
    }

    /// Runs the loop until the transport ends or shutdown is triggered.
    pub async fn run(&mut self) -> SessionOutcome {
        let span = self.span.clone();
        self.run_loop().instrument(span).await
    }

    async fn run_loop(&mut self) -> SessionOutcome {
        let shutdown = self.ctx.shutdown.wait().wait();
        tokio::pin!(shutdown);

        let outcome = loop {
            let step = tokio::select! {
                biased;
                () = &mut shutdown => Step::Shutdown,
                step = recv_step(&mut self.transport, self.ctx.settings.idle_timeout) => step,
            };

            match step {
                Step::Received(Ok(Some(message))) => {
                    if let Err(e) = self.handle_message(message).await {
                        break SessionOutcome::AbnormalTermination(e);
                    }
                }
                Step::Received(Ok(None)) => break SessionOutcome::GracefulDisconnect,
                Step::Received(Err(e)) => break SessionOutcome::AbnormalTermination(e),
                Step::Idle => break SessionOutcome::IdleTimeout,
                Step::Shutdown => break SessionOutcome::Shutdown,
            }
        };

        if matches!(
            outcome,
            SessionOutcome::Shutdown | SessionOutcome::IdleTimeout
        ) && let Err(e) = self.transport.close().await
        {
            debug!(error = %e, "Close frame not delivered");
        }

        let SessionStats {
            frames_received,
            responses_sent,
            frames_skipped,
            control_messages,
        } = self.stats;
        if outcome.is_clean() {
            info!(
                outcome = %outcome,
                frames_received,
                responses_sent,
                frames_skipped,
                control_messages,
                "Session ended"
            );
        } else {
            warn!(
                outcome = %outcome,
                frames_received,
                responses_sent,
                frames_skipped,
                control_messages,
                "Session terminated"
            );
        }

        outcome
    }

    async fn handle_message(&mut self, message: WireMessage) -> TransportResult<()> {
        let inbound = match message {
            WireMessage::Text(text) => classify_text(text),
            WireMessage::Binary(bytes) => InboundMessage::from_binary(bytes),
        };

        match inbound {
            InboundMessage::Control(ControlMessage::Ping) => {
                self.stats.control_messages += 1;
                debug!("Ping");
                self.transport.send(WireMessage::text(PONG)).await
            }
            InboundMessage::Control(ControlMessage::Other(text)) => {
                self.stats.control_messages += 1;
                debug!(len = text.len(), "Ignoring control text");
                Ok(())
            }
            InboundMessage::Image(payload) => self.handle_frame(payload).await,
        }
    }

    async fn handle_frame(&mut self, payload: ImagePayload) -> TransportResult<()> {
        self.stats.frames_received += 1;
        let frame = self.stats.frames_received;

        match self.ctx.process_frame(payload).await {
            Ok(json) => {
                self.transport.send(WireMessage::Text(json)).await?;
                self.stats.responses_sent += 1;
                debug!(frame, "Result sent");
                Ok(())
            }
            Err(reason) => {
                self.stats.frames_skipped += 1;
                warn!(frame, kind = reason.kind(), error = %reason, "Skipping frame");

                if !self.ctx.settings.error_replies {
                    return Ok(());
                }
                match encode_error(reason.to_string()) {
                    Ok(json) => self.transport.send(WireMessage::Text(json)).await,
                    Err(e) => {
                        warn!(error = %e, "Failed to encode error reply");
                        Ok(())
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{WidthAnalyzer, jpeg_data_uri, png_base64, png_data_uri};
    use humora_analyzer::{ErrorAnalyzer, RandomAnalyzer};
    use humora_core::LabelSet;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    enum Scripted {
        Message(WireMessage),
        Close,
        Reset,
    }

    fn text(s: impl Into<String>) -> Scripted {
        Scripted::Message(WireMessage::text(s))
    }

    type Sent = Arc<Mutex<Vec<WireMessage>>>;

    /// Plays back a fixed script, then waits forever.
    struct ScriptedTransport {
        script: VecDeque<Scripted>,
        sent: Sent,
        closed_locally: Arc<AtomicBool>,
        closed: bool,
        fail_sends: bool,
    }

    impl ScriptedTransport {
        fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
            Self {
                script: script.into_iter().collect(),
                sent: Arc::default(),
                closed_locally: Arc::default(),
                closed: false,
                fail_sends: false,
            }
        }

        fn failing_sends(mut self) -> Self {
            self.fail_sends = true;
            self
        }
    }

    impl Transport for ScriptedTransport {
        fn recv(&mut self) -> humora_analyzer::BoxFuture<'_, TransportResult<Option<WireMessage>>> {
            Box::pin(async move {
                match self.script.pop_front() {
                    Some(Scripted::Message(message)) => Ok(Some(message)),
                    Some(Scripted::Close) => {
                        self.closed = true;
                        Ok(None)
                    }
                    Some(Scripted::Reset) => {
                        self.closed = true;
                        Err(TransportError::receive("connection reset"))
                    }
                    None => std::future::pending().await,
                }
            })
        }

        fn send(&mut self, message: WireMessage) -> humora_analyzer::BoxFuture<'_, TransportResult<()>> {
            Box::pin(async move {
                if self.fail_sends {
                    return Err(TransportError::send("broken pipe"));
                }
                self.sent.lock().unwrap().push(message);
                Ok(())
            })
        }

        fn close(&mut self) -> humora_analyzer::BoxFuture<'_, TransportResult<()>> {
            Box::pin(async move {
                self.closed = true;
                self.closed_locally.store(true, Ordering::SeqCst);
                Ok(())
            })
        }

        fn is_closed(&self) -> bool {
            self.closed
        }
    }

    fn sent_texts(sent: &Sent) -> Vec<String> {
        sent.lock()
            .unwrap()
            .iter()
            .filter_map(|m| m.as_text().map(str::to_owned))
            .collect()
    }

    fn ages(sent: &Sent) -> Vec<u8> {
        sent_texts(sent)
            .iter()
            .map(|json| serde_json::from_str::<AnalysisResult>(json).unwrap().age)
            .collect()
    }

    fn width_ctx() -> SessionContext {
        SessionContext::new(Arc::new(WidthAnalyzer))
    }

    async fn run_script(
        ctx: SessionContext,
        script: Vec<Scripted>,
    ) -> (SessionOutcome, SessionStats, Sent) {
        let transport = ScriptedTransport::new(script);
        let sent = transport.sent.clone();
        let mut session = Session::accept(transport, ctx).unwrap();
        let outcome = session.run().await;
        (outcome, session.stats(), sent)
    }

    #[tokio::test]
    async fn responses_follow_frame_order() {
        let script = vec![
            text(png_data_uri(3, 1)),
            text(png_data_uri(1, 1)),
            text(png_data_uri(2, 1)),
            Scripted::Close,
        ];

        let (outcome, stats, sent) = run_script(width_ctx(), script).await;

        assert_eq!(outcome, SessionOutcome::GracefulDisconnect);
        assert_eq!(ages(&sent), vec![3, 1, 2]);
        assert_eq!(stats.frames_received, 3);
        assert_eq!(stats.responses_sent, 3);
    }

    #[tokio::test]
    async fn malformed_frames_are_skipped() {
        let script = vec![
            text(png_data_uri(4, 1)),
            text("not-base64!!"),
            text("data:image/jpeg;base64,@@@@"),
            text("data:image/png;base64,aGVsbG8="),
            Scripted::Message(WireMessage::Binary(bytes::Bytes::from_static(b"garbage"))),
            text(png_data_uri(5, 1)),
            Scripted::Close,
        ];

        let (outcome, stats, sent) = run_script(width_ctx(), script).await;

        assert_eq!(outcome, SessionOutcome::GracefulDisconnect);
        assert_eq!(ages(&sent), vec![4, 5]);
        assert_eq!(
            stats,
            SessionStats {
                frames_received: 5,
                responses_sent: 2,
                frames_skipped: 3,
                control_messages: 1,
            }
        );
    }

    #[tokio::test]
    async fn prefixed_and_bare_payloads_both_answered() {
        let script = vec![
            text(png_data_uri(6, 2)),
            text(png_base64(6, 2)),
            Scripted::Close,
        ];

        let (_, _, sent) = run_script(width_ctx(), script).await;
        assert_eq!(ages(&sent), vec![6, 6]);
    }

    #[tokio::test]
    async fn jpeg_frames_are_analyzed() {
        let script = vec![
            text(jpeg_data_uri(40, 30)),
            text(png_data_uri(9, 9)),
            Scripted::Close,
        ];

        let (_, stats, sent) = run_script(width_ctx(), script).await;
        assert_eq!(ages(&sent), vec![40, 9]);
        assert_eq!(stats.frames_skipped, 0);
    }

    #[tokio::test]
    async fn frames_beyond_dimension_limit_are_skipped() {
        let settings = SessionSettings {
            decode_limits: DecodeLimits::default().with_max_dimensions(32, 32),
            ..SessionSettings::default()
        };
        let script = vec![
            text(jpeg_data_uri(48, 8)),
            text(png_data_uri(32, 32)),
            Scripted::Close,
        ];

        let (outcome, stats, sent) = run_script(width_ctx().with_settings(settings), script).await;

        assert_eq!(outcome, SessionOutcome::GracefulDisconnect);
        assert_eq!(ages(&sent), vec![32]);
        assert_eq!(stats.frames_skipped, 1);
    }

    #[tokio::test]
    async fn binary_frames_are_analyzed() {
        let bytes = humora_protocol::decode_base64(&png_base64(7, 1)).unwrap();
        let script = vec![
            Scripted::Message(WireMessage::Binary(bytes.into())),
            Scripted::Close,
        ];

        let (_, _, sent) = run_script(width_ctx(), script).await;
        assert_eq!(ages(&sent), vec![7]);
    }

    #[tokio::test]
    async fn ping_gets_pong_and_is_not_a_frame() {
        let script = vec![text("ping"), text("hello"), Scripted::Close];

        let (_, stats, sent) = run_script(width_ctx(), script).await;

        assert_eq!(sent_texts(&sent), vec!["PONG"]);
        assert_eq!(stats.frames_received, 0);
        assert_eq!(stats.control_messages, 2);
    }

    #[tokio::test]
    async fn reset_is_abnormal() {
        let script = vec![text(png_data_uri(1, 1)), Scripted::Reset];

        let (outcome, _, sent) = run_script(width_ctx(), script).await;

        assert_eq!(
            outcome,
            SessionOutcome::AbnormalTermination(TransportError::receive("connection reset"))
        );
        assert!(!outcome.is_clean());
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn send_failure_is_abnormal() {
        let transport = ScriptedTransport::new(vec![text("ping")]).failing_sends();
        let mut session = Session::accept(transport, width_ctx()).unwrap();

        let outcome = session.run().await;
        assert!(matches!(
            outcome,
            SessionOutcome::AbnormalTermination(TransportError::Send(_))
        ));
    }

    #[tokio::test]
    async fn analyzer_failure_keeps_session_alive() {
        let analyzer = ErrorAnalyzer::new("broken", AnalyzerError::unavailable("no model"));
        let ctx = SessionContext::new(Arc::new(analyzer));
        let script = vec![
            text(png_data_uri(1, 1)),
            text("ping"),
            text(png_data_uri(1, 1)),
            Scripted::Close,
        ];

        let (outcome, stats, sent) = run_script(ctx, script).await;

        assert_eq!(outcome, SessionOutcome::GracefulDisconnect);
        assert_eq!(sent_texts(&sent), vec!["PONG"]);
        assert_eq!(stats.frames_skipped, 2);
    }

    #[tokio::test]
    async fn error_replies_answer_skipped_frames() {
        let settings = SessionSettings {
            error_replies: true,
            ..SessionSettings::default()
        };
        let script = vec![
            text("data:image/png;base64,@@@@"),
            text(png_data_uri(2, 2)),
            Scripted::Close,
        ];

        let (_, stats, sent) = run_script(width_ctx().with_settings(settings), script).await;

        let replies = sent_texts(&sent);
        assert_eq!(replies.len(), 2);
        let error: serde_json::Value = serde_json::from_str(&replies[0]).unwrap();
        assert!(error["error"].as_str().unwrap().contains("base64"));
        let result: AnalysisResult = serde_json::from_str(&replies[1]).unwrap();
        assert_eq!(result.age, 2);
        assert_eq!(stats.frames_skipped, 1);
    }

    #[tokio::test]
    async fn oversized_payload_is_skipped() {
        let settings = SessionSettings {
            decode_limits: DecodeLimits::default().with_max_payload_size(16),
            ..SessionSettings::default()
        };
        let script = vec![text(png_data_uri(1, 1)), Scripted::Close];

        let (outcome, stats, sent) = run_script(width_ctx().with_settings(settings), script).await;

        assert_eq!(outcome, SessionOutcome::GracefulDisconnect);
        assert!(sent.lock().unwrap().is_empty());
        assert_eq!(stats.frames_skipped, 1);
    }

    #[tokio::test]
    async fn slow_analysis_times_out() {
        let analyzer = RandomAnalyzer::new(LabelSet::english())
            .unwrap()
            .with_latency(Duration::from_secs(10));
        let settings = SessionSettings {
            analyze_timeout: Some(Duration::from_millis(20)),
            ..SessionSettings::default()
        };
        let ctx = SessionContext::new(Arc::new(analyzer)).with_settings(settings);
        let script = vec![text(png_data_uri(1, 1)), Scripted::Close];

        let (outcome, stats, _) = run_script(ctx, script).await;

        assert_eq!(outcome, SessionOutcome::GracefulDisconnect);
        assert_eq!(stats.frames_skipped, 1);
    }

    #[tokio::test]
    async fn idle_timeout_closes_session() {
        let settings = SessionSettings {
            idle_timeout: Some(Duration::from_millis(20)),
            ..SessionSettings::default()
        };
        let transport = ScriptedTransport::new(vec![text("ping")]);
        let closed = transport.closed_locally.clone();
        let mut session = Session::accept(transport, width_ctx().with_settings(settings)).unwrap();

        assert_eq!(session.run().await, SessionOutcome::IdleTimeout);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn shutdown_closes_session() {
        let shutdown = ShutdownHandle::new();
        let transport = ScriptedTransport::new(vec![text("ping")]);
        let closed = transport.closed_locally.clone();
        let mut session =
            Session::accept(transport, width_ctx().with_shutdown(shutdown.clone())).unwrap();

        let (outcome, ()) = tokio::join!(session.run(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            shutdown.trigger();
        });

        assert_eq!(outcome, SessionOutcome::Shutdown);
        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(session.stats().control_messages, 1);
    }

    #[test]
    fn closed_transport_is_rejected() {
        let mut transport = ScriptedTransport::new(Vec::new());
        transport.closed = true;

        let result = Session::accept(transport, width_ctx());
        assert!(matches!(result, Err(ServerError::TransportClosed)));
    }

    #[test]
    fn session_ids_are_unique() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("session_"));
    }

    #[test]
    fn outcome_display() {
        assert_eq!(SessionOutcome::GracefulDisconnect.to_string(), "graceful_disconnect");
        assert_eq!(
            SessionOutcome::AbnormalTermination(TransportError::Closed).to_string(),
            "abnormal_termination: transport closed"
        );
    }

    #[test]
    fn report_snapshot() {
        let session = Session::accept(ScriptedTransport::new(Vec::new()), width_ctx()).unwrap();
        let report = session.report(SessionOutcome::IdleTimeout);

        assert_eq!(&report.id, session.id());
        insta::assert_debug_snapshot!((report.outcome, report.stats), @r"
        (
            IdleTimeout,
            SessionStats {
                frames_received: 0,
                responses_sent: 0,
                frames_skipped: 0,
                control_messages: 0,
            },
        )
        ");
    }
}
