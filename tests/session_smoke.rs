use std::time::Duration;

use accentcoach::session::runtime::engine::{CaptureSource, MockCapture, RecorderEngine};
use accentcoach::session::{ErrorKind, Result, SessionError};

const SAMPLE_RATE: u32 = 16_000;

#[test]
fn finalized_take_concatenates_chunks_in_arrival_order() {
    let chunks = vec![ramp(0, 10), ramp(10, 20)];
    let capture = MockCapture::new(SAMPLE_RATE, chunks);
    let mut engine = RecorderEngine::new(SAMPLE_RATE, capture);

    engine.start().unwrap();
    assert!(engine.is_recording());
    while engine.poll(Duration::ZERO) {}
    let clip = engine.stop().unwrap().expect("stop from recording finalizes");

    assert!(!engine.is_recording());
    assert_eq!(clip.samples.len(), 30);
    let expected: Vec<f32> = (0..30).map(|i| i as f32 / 100.0).collect();
    assert_eq!(clip.samples.as_ref(), expected.as_slice());
}

#[test]
fn stop_drains_chunks_still_queued_at_stop_time() {
    let capture = MockCapture::new(SAMPLE_RATE, vec![ramp(0, 10), ramp(10, 20)]);
    let mut engine = RecorderEngine::new(SAMPLE_RATE, capture);
    engine.start().unwrap();
    // No polling at all: everything delivered before stop still lands in the take.
    let clip = engine.stop().unwrap().unwrap();
    assert_eq!(clip.samples.len(), 30);
}

#[test]
fn stop_while_idle_leaves_previous_recording_unchanged() {
    let capture = MockCapture::new(SAMPLE_RATE, vec![ramp(0, 10)]);
    let mut engine = RecorderEngine::new(SAMPLE_RATE, capture);

    assert!(engine.stop().unwrap().is_none());
    assert!(engine.clip().is_none());

    engine.start().unwrap();
    engine.stop().unwrap();
    let before = engine.clip().unwrap().samples.len();

    assert!(engine.stop().unwrap().is_none());
    assert_eq!(engine.clip().unwrap().samples.len(), before);
}

#[test]
fn new_take_replaces_previous_recording() {
    let capture = MockCapture::new(SAMPLE_RATE, vec![ramp(0, 10), ramp(0, 5)]);
    let mut engine = RecorderEngine::new(SAMPLE_RATE, capture);

    engine.start().unwrap();
    assert!(engine.poll(Duration::ZERO));
    engine.stop().unwrap();
    assert_eq!(engine.clip().unwrap().samples.len(), 10);

    engine.start().unwrap();
    engine.stop().unwrap();
    assert_eq!(engine.clip().unwrap().samples.len(), 5);
}

#[test]
fn resamples_capture_rate_to_target_rate() {
    let capture = MockCapture::new(48_000, vec![vec![0.5; 480]]);
    let mut engine = RecorderEngine::new(SAMPLE_RATE, capture);
    engine.start().unwrap();
    while engine.poll(Duration::ZERO) {}
    let clip = engine.stop().unwrap().unwrap();
    assert_eq!(clip.sample_rate, SAMPLE_RATE);
    assert_eq!(clip.samples.len(), 160);
    assert!(clip.samples.iter().all(|&s| (s - 0.5).abs() < 1e-6));
}

#[test]
fn denied_microphone_leaves_engine_idle_with_no_take() {
    struct DeniedCapture;

    impl CaptureSource for DeniedCapture {
        fn start(&mut self) -> Result<u32> {
            Err(SessionError::permission_denied("microphone unavailable"))
        }

        fn recv_chunk(&mut self, _timeout: Duration) -> Option<Vec<f32>> {
            None
        }

        fn stop(&mut self) {}
    }

    let mut engine = RecorderEngine::new(SAMPLE_RATE, DeniedCapture);
    let err = engine.start().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    assert!(!engine.is_recording());
    assert!(engine.clip().is_none());
    // A later stop is still a tolerated no-op.
    assert!(engine.stop().unwrap().is_none());
}

fn ramp(offset: usize, len: usize) -> Vec<f32> {
    (offset..offset + len).map(|i| i as f32 / 100.0).collect()
}
