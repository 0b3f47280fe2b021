use std::thread;
use std::time::{Duration, Instant};

use accentcoach::session::runtime::engine::{CaptureSource, MockCapture};
use accentcoach::session::{
    run_session, RecorderRuntime, SessionConfig, SessionError, SessionSnapshot,
};

const SAMPLE_RATE: u32 = 16_000;

#[test]
fn runtime_spawns_and_shuts_down_cleanly() {
    let runtime = run_session(SessionConfig::default()).unwrap();
    let controller = runtime.controller();
    controller.shutdown().unwrap();
    drop(runtime); // drop joins the worker
}

#[test]
fn runtime_publishes_idle_snapshot_on_launch() {
    let runtime = run_session(SessionConfig::default()).unwrap();
    let snapshot = wait_for(&runtime, |_| true).expect("initial snapshot");
    assert!(!snapshot.recording);
    assert!(!snapshot.has_recording());
    assert!(snapshot.error.is_none());
}

#[test]
fn start_then_stop_delivers_finalized_clip_through_snapshots() {
    let chunks = vec![vec![0.1; 10], vec![0.2; 20]];
    let runtime =
        RecorderRuntime::with_capture(SAMPLE_RATE, move || MockCapture::new(SAMPLE_RATE, chunks))
            .unwrap();
    let controller = runtime.controller();

    controller.start().unwrap();
    let recording = wait_for(&runtime, |s| s.recording).expect("recording snapshot");
    assert!(recording.error.is_none());

    // Give the drive loop a moment to pull the mock chunks.
    thread::sleep(Duration::from_millis(50));
    controller.stop().unwrap();

    let finalized = wait_for(&runtime, |s| s.has_recording()).expect("finalized snapshot");
    assert!(!finalized.recording);
    let clip = finalized.clip.unwrap();
    assert_eq!(clip.samples.len(), 30);
    assert_eq!(clip.sample_rate, SAMPLE_RATE);
}

#[test]
fn stop_while_idle_is_tolerated() {
    let runtime =
        RecorderRuntime::with_capture(SAMPLE_RATE, || MockCapture::new(SAMPLE_RATE, Vec::new()))
            .unwrap();
    let controller = runtime.controller();
    controller.stop().unwrap();
    controller.stop().unwrap();
    // Worker must still be alive and answering.
    controller.start().unwrap();
    let snapshot = wait_for(&runtime, |s| s.recording).expect("recording snapshot");
    assert!(snapshot.recording);
}

#[test]
fn denied_microphone_surfaces_error_and_stays_idle() {
    struct DeniedCapture;

    impl CaptureSource for DeniedCapture {
        fn start(&mut self) -> accentcoach::session::Result<u32> {
            Err(SessionError::permission_denied(
                "microphone unavailable: permission denied",
            ))
        }

        fn recv_chunk(&mut self, _timeout: Duration) -> Option<Vec<f32>> {
            None
        }

        fn stop(&mut self) {}
    }

    let runtime = RecorderRuntime::with_capture(SAMPLE_RATE, || DeniedCapture).unwrap();
    let controller = runtime.controller();
    controller.start().unwrap();

    let errored = wait_for(&runtime, |s| s.error.is_some()).expect("error snapshot");
    assert!(!errored.recording);
    assert!(!errored.has_recording());
    assert!(errored.error.unwrap().contains("microphone unavailable"));
}

fn wait_for(
    runtime: &RecorderRuntime,
    matches: impl Fn(&SessionSnapshot) -> bool,
) -> Option<SessionSnapshot> {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if let Some(snapshot) = runtime.try_recv() {
            if matches(&snapshot) {
                return Some(snapshot);
            }
            continue;
        }
        thread::sleep(Duration::from_millis(5));
    }
    None
}
