use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info};

use super::{validate_config, RecordedClip, Result, SessionConfig, SessionError};

const CAPTURE_POLL_MS: u64 = 20;

/// Cloneable handle for sending commands to the recorder worker thread.
#[derive(Clone)]
pub struct RecorderController {
    tx: Sender<RecorderCommand>,
}

/// Owns the recorder worker thread. Dropping it shuts the worker down and
/// joins it.
pub struct RecorderRuntime {
    controller: RecorderController,
    updates: Receiver<SessionSnapshot>,
    join: Option<JoinHandle<()>>,
}

/// State published by the worker after every transition. The finalized clip
/// only appears here once finalization has completed, which is what makes the
/// "play your recording" action safe to enable.
#[derive(Clone, Debug, Default)]
pub struct SessionSnapshot {
    pub recording: bool,
    pub clip: Option<RecordedClip>,
    pub error: Option<String>,
}

impl RecorderRuntime {
    pub fn new(config: SessionConfig) -> Result<Self> {
        validate_config(&config)?;
        let target_rate = config.capture.sample_rate;
        info!(
            device = ?config.capture.device_name,
            sample_rate = target_rate,
            "launching recorder runtime thread"
        );
        // The cpal stream is not Send, so the live source must be built on the
        // worker thread itself.
        Self::spawn(target_rate, move || {
            engine::LiveCaptureSource::new(&config.capture)
        })
    }

    /// Launch the worker over an arbitrary capture source. Tests use this to
    /// drive the full command loop with a mock microphone.
    pub fn with_capture<C, F>(target_rate: u32, make_capture: F) -> Result<Self>
    where
        C: engine::CaptureSource,
        F: FnOnce() -> C + Send + 'static,
    {
        Self::spawn(target_rate, make_capture)
    }

    fn spawn<C, F>(target_rate: u32, make_capture: F) -> Result<Self>
    where
        C: engine::CaptureSource,
        F: FnOnce() -> C + Send + 'static,
    {
        let (command_tx, command_rx) = channel();
        let (update_tx, update_rx) = channel();
        let join = thread::Builder::new()
            .name("recorder-runtime".to_string())
            .spawn(move || {
                let engine = engine::RecorderEngine::new(target_rate, make_capture());
                Worker { engine }.run(command_rx, update_tx);
            })
            .map_err(|err| {
                error!(error = %err, "failed to spawn recorder thread");
                SessionError::new(err.to_string())
            })?;
        Ok(Self {
            controller: RecorderController { tx: command_tx },
            updates: update_rx,
            join: Some(join),
        })
    }

    pub fn controller(&self) -> RecorderController {
        self.controller.clone()
    }

    pub fn try_recv(&self) -> Option<SessionSnapshot> {
        self.updates.try_recv().ok()
    }
}

impl Drop for RecorderRuntime {
    fn drop(&mut self) {
        let _ = self.controller.shutdown();
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl RecorderController {
    pub fn start(&self) -> Result<()> {
        self.send(RecorderCommand::Start, "start recording")
    }

    pub fn stop(&self) -> Result<()> {
        self.send(RecorderCommand::Stop, "stop recording")
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(RecorderCommand::Shutdown, "shut down recorder")
    }

    fn send(&self, command: RecorderCommand, label: &str) -> Result<()> {
        self.tx
            .send(command)
            .map_err(|_| SessionError::new(format!("failed to {}", label)))
    }
}

impl SessionSnapshot {
    pub fn has_recording(&self) -> bool {
        self.clip.is_some()
    }

    fn with_recording(mut self, recording: bool) -> Self {
        self.recording = recording;
        self.error = None;
        self
    }

    fn with_clip(mut self, clip: RecordedClip) -> Self {
        self.clip = Some(clip);
        self
    }

    fn with_error_message(mut self, message: String) -> Self {
        self.error = Some(message);
        self
    }
}

pub mod engine {
    use super::*;

    /// Seam over the microphone so the engine can be driven deterministically
    /// in tests.
    pub trait CaptureSource: 'static {
        /// Begin capture; returns the stream's native sample rate.
        fn start(&mut self) -> Result<u32>;
        fn recv_chunk(&mut self, timeout: Duration) -> Option<Vec<f32>>;
        fn stop(&mut self);
    }

    /// Idle/Recording lifecycle around an append-only take buffer. The buffer
    /// exists only between a successful start and the matching stop; stop
    /// concatenates it into an immutable clip that replaces any previous one.
    pub struct RecorderEngine<C: CaptureSource> {
        capture: C,
        target_sample_rate: u32,
        buffer: Vec<f32>,
        capture_sample_rate: Option<u32>,
        chunk_count: usize,
        clip: Option<RecordedClip>,
    }

    impl<C: CaptureSource> RecorderEngine<C> {
        pub fn new(target_sample_rate: u32, capture: C) -> Self {
            Self {
                capture,
                target_sample_rate,
                buffer: Vec::new(),
                capture_sample_rate: None,
                chunk_count: 0,
                clip: None,
            }
        }

        pub fn is_recording(&self) -> bool {
            self.capture_sample_rate.is_some()
        }

        pub fn clip(&self) -> Option<&RecordedClip> {
            self.clip.as_ref()
        }

        /// Valid only from Idle; on failure the engine stays Idle and no
        /// buffer is created.
        pub fn start(&mut self) -> Result<()> {
            let sample_rate = self.capture.start()?;
            self.buffer.clear();
            self.chunk_count = 0;
            self.capture_sample_rate = Some(sample_rate);
            info!(sample_rate, "capture stream started");
            Ok(())
        }

        /// Append the next arriving chunk, if any. Returns whether a chunk was
        /// consumed.
        pub fn poll(&mut self, timeout: Duration) -> bool {
            if !self.is_recording() {
                return false;
            }
            match self.capture.recv_chunk(timeout) {
                Some(chunk) => {
                    self.chunk_count += 1;
                    self.buffer.extend_from_slice(&chunk);
                    if self.chunk_count % 50 == 0 {
                        debug!(
                            chunk = self.chunk_count,
                            buffered_samples = self.buffer.len(),
                            "capture in progress"
                        );
                    }
                    true
                }
                None => false,
            }
        }

        /// Finalize the take. A no-op from Idle: the previous clip, if any,
        /// stays untouched.
        pub fn stop(&mut self) -> Result<Option<RecordedClip>> {
            let Some(capture_rate) = self.capture_sample_rate.take() else {
                debug!("stop while idle ignored");
                return Ok(None);
            };
            // Drain chunks that arrived before the stop but are still queued.
            while let Some(chunk) = self.capture.recv_chunk(Duration::ZERO) {
                self.chunk_count += 1;
                self.buffer.extend_from_slice(&chunk);
            }
            self.capture.stop();
            let raw = std::mem::take(&mut self.buffer);
            let samples = if capture_rate == self.target_sample_rate {
                raw
            } else {
                crate::audio::resample::linear_resample(
                    &raw,
                    capture_rate,
                    self.target_sample_rate,
                )
                .map_err(|err| SessionError::capture(err.to_string()))?
            };
            info!(
                chunks = self.chunk_count,
                samples = samples.len(),
                "recording finalized"
            );
            let clip = RecordedClip::from_samples(samples, self.target_sample_rate);
            self.clip = Some(clip.clone());
            Ok(Some(clip))
        }
    }

    /// Capture source backed by the real microphone.
    pub struct LiveCaptureSource {
        config: crate::audio::capture::CaptureConfig,
        live: Option<crate::audio::capture::LiveCapture>,
    }

    impl LiveCaptureSource {
        pub fn new(settings: &crate::session::CaptureSettings) -> Self {
            Self {
                config: crate::audio::capture::CaptureConfig {
                    device_name: settings.device_name.clone(),
                    latency_ms: settings.latency_ms.clone(),
                },
                live: None,
            }
        }
    }

    impl CaptureSource for LiveCaptureSource {
        fn start(&mut self) -> Result<u32> {
            let live = crate::audio::capture::LiveCapture::start(&self.config).map_err(|err| {
                error!(device = ?self.config.device_name, error = %err, "microphone unavailable");
                SessionError::permission_denied(format!("microphone unavailable: {err}"))
            })?;
            let sample_rate = live.sample_rate();
            self.live = Some(live);
            Ok(sample_rate)
        }

        fn recv_chunk(&mut self, timeout: Duration) -> Option<Vec<f32>> {
            self.live
                .as_ref()
                .and_then(|capture| capture.recv_chunk(timeout))
        }

        fn stop(&mut self) {
            if let Some(capture) = self.live.take() {
                capture.stop();
            }
        }
    }

    /// Deterministic capture source for tests: serves prepared chunks in order.
    pub struct MockCapture {
        sample_rate: u32,
        chunks: std::collections::VecDeque<Vec<f32>>,
        started: bool,
    }

    impl MockCapture {
        pub fn new(sample_rate: u32, chunks: Vec<Vec<f32>>) -> Self {
            Self {
                sample_rate,
                chunks: chunks.into(),
                started: false,
            }
        }
    }

    impl CaptureSource for MockCapture {
        fn start(&mut self) -> Result<u32> {
            self.started = true;
            Ok(self.sample_rate)
        }

        fn recv_chunk(&mut self, _timeout: Duration) -> Option<Vec<f32>> {
            if !self.started {
                return None;
            }
            self.chunks.pop_front()
        }

        fn stop(&mut self) {
            self.started = false;
        }
    }
}

struct Worker<C: engine::CaptureSource> {
    engine: engine::RecorderEngine<C>,
}

impl<C: engine::CaptureSource> Worker<C> {
    fn run(mut self, commands: Receiver<RecorderCommand>, updates: Sender<SessionSnapshot>) {
        let mut snapshot = SessionSnapshot::default();
        info!("recorder thread running");
        let _ = updates.send(snapshot.clone());
        while let Ok(command) = commands.recv() {
            match command {
                RecorderCommand::Start => {
                    match self.record(&commands, &updates, &mut snapshot) {
                        LoopExit::Finished => {}
                        LoopExit::Shutdown => break,
                    }
                }
                // Tolerated: stop while idle leaves the previous clip alone.
                RecorderCommand::Stop => debug!("stop command while idle ignored"),
                RecorderCommand::Shutdown => break,
            }
        }
        info!("recorder thread exiting");
    }

    fn record(
        &mut self,
        commands: &Receiver<RecorderCommand>,
        updates: &Sender<SessionSnapshot>,
        snapshot: &mut SessionSnapshot,
    ) -> LoopExit {
        if let Err(err) = self.engine.start() {
            emit_error(updates, snapshot, err.to_string());
            return LoopExit::Finished;
        }
        *snapshot = snapshot.clone().with_recording(true);
        let _ = updates.send(snapshot.clone());
        loop {
            if let Some(command) = poll_command(commands) {
                match command {
                    RecorderCommand::Stop => return self.finish(updates, snapshot, LoopExit::Finished),
                    RecorderCommand::Shutdown => {
                        return self.finish(updates, snapshot, LoopExit::Shutdown)
                    }
                    RecorderCommand::Start => {
                        debug!("start command while already recording ignored")
                    }
                }
            }
            self.engine.poll(Duration::from_millis(CAPTURE_POLL_MS));
        }
    }

    fn finish(
        &mut self,
        updates: &Sender<SessionSnapshot>,
        snapshot: &mut SessionSnapshot,
        exit: LoopExit,
    ) -> LoopExit {
        match self.engine.stop() {
            Ok(Some(clip)) => {
                *snapshot = snapshot.clone().with_recording(false).with_clip(clip);
                let _ = updates.send(snapshot.clone());
            }
            Ok(None) => {
                *snapshot = snapshot.clone().with_recording(false);
                let _ = updates.send(snapshot.clone());
            }
            Err(err) => {
                error!(error = %err, "failed to finalize recording");
                emit_error(updates, snapshot, err.to_string());
            }
        }
        exit
    }
}

enum LoopExit {
    Finished,
    Shutdown,
}

fn poll_command(commands: &Receiver<RecorderCommand>) -> Option<RecorderCommand> {
    match commands.try_recv() {
        Ok(command) => Some(command),
        Err(TryRecvError::Empty) => None,
        Err(TryRecvError::Disconnected) => Some(RecorderCommand::Shutdown),
    }
}

fn emit_error(updates: &Sender<SessionSnapshot>, snapshot: &mut SessionSnapshot, message: String) {
    let next = snapshot
        .clone()
        .with_recording(false)
        .with_error_message(message);
    let _ = updates.send(next.clone());
    *snapshot = next;
}

#[derive(Clone, Copy)]
enum RecorderCommand {
    Start,
    Stop,
    Shutdown,
}
