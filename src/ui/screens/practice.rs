use std::path::PathBuf;
use std::time::Duration;

use eframe::egui;
use tracing::{error, warn};

use crate::audio::encoder;
use crate::audio::playback::AudioOutput;
use crate::catalog::PhraseCatalog;
use crate::selection::SelectionState;
use crate::session::{RecorderRuntime, SessionSnapshot};
use crate::ui::components::control_strip::{ControlStrip, ControlStripOutput};
use crate::ui::components::phrase_picker::PhrasePicker;

const EXPORT_FILE: &str = "recording.wav";

pub struct PracticeApp {
    catalog: PhraseCatalog,
    selection: SelectionState,
    assets_root: PathBuf,
    recorder: RecorderRuntime,
    snapshot: SessionSnapshot,
    output: Box<dyn AudioOutput>,
    status: Option<String>,
}

impl PracticeApp {
    pub fn new(
        catalog: PhraseCatalog,
        assets_root: PathBuf,
        recorder: RecorderRuntime,
        output: Box<dyn AudioOutput>,
    ) -> Self {
        Self {
            catalog,
            selection: SelectionState::new(),
            assets_root,
            recorder,
            snapshot: SessionSnapshot::default(),
            output,
            status: None,
        }
    }

    fn sync_snapshots(&mut self) {
        while let Some(next) = self.recorder.try_recv() {
            self.snapshot = next;
        }
    }

    fn show_selectors(&mut self, ui: &mut egui::Ui) {
        ui.heading("AccentCoach");
        let picked = PhrasePicker {
            catalog: &self.catalog,
            level: self.selection.level(),
            phrase_index: self.selection.phrase_index(),
        }
        .show(ui);
        if let Some(level) = picked.level {
            self.selection.set_level(level);
        }
        if let Some(index) = picked.phrase {
            self.selection.set_phrase(index, &self.catalog);
        }
    }

    fn show_main(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new(&self.selection.phrase(&self.catalog).text).size(24.0));
        ui.separator();
        let actions = ControlStrip {
            is_recording: self.snapshot.recording,
            has_recording: self.snapshot.has_recording(),
        }
        .show(ui);
        self.dispatch(actions);
        ui.separator();
        if let Some(error) = self.snapshot.error.as_deref() {
            ui.colored_label(egui::Color32::from_rgb(200, 60, 60), error);
        } else if let Some(status) = self.status.as_deref() {
            ui.label(status);
        }
    }

    fn dispatch(&mut self, actions: ControlStripOutput) {
        if actions.play_reference {
            self.play_reference();
        }
        if actions.start_recording {
            self.send_command(|recorder| recorder.controller().start());
        }
        if actions.stop_recording {
            self.send_command(|recorder| recorder.controller().stop());
        }
        if actions.play_recording {
            self.play_recording();
        }
        if actions.save_recording {
            self.save_recording();
        }
    }

    fn send_command(
        &mut self,
        send: impl FnOnce(&RecorderRuntime) -> crate::session::Result<()>,
    ) {
        if let Err(err) = send(&self.recorder) {
            error!(error = %err, "recorder command failed");
            self.status = Some(err.to_string());
        }
    }

    fn play_reference(&mut self) {
        let phrase = self.selection.phrase(&self.catalog);
        let path = self.assets_root.join(&phrase.audio);
        // A missing reference asset is non-fatal: log it, tell the user,
        // leave all state unchanged.
        if let Err(err) = self.output.play_file(&path) {
            warn!(path = ?path, error = %err, "reference playback failed");
            self.status = Some(format!("could not play reference: {err}"));
        } else {
            self.status = None;
        }
    }

    fn play_recording(&mut self) {
        let Some(clip) = self.snapshot.clip.clone() else {
            return;
        };
        if let Err(err) = self.output.play_clip(&clip) {
            warn!(error = %err, "recording playback failed");
            self.status = Some(format!("could not play recording: {err}"));
        }
    }

    fn save_recording(&mut self) {
        let Some(clip) = self.snapshot.clip.clone() else {
            return;
        };
        match encoder::write_wav(&clip, EXPORT_FILE) {
            Ok(()) => self.status = Some(format!("saved {}", EXPORT_FILE)),
            Err(err) => {
                warn!(error = %err, "failed to save recording");
                self.status = Some(format!("could not save recording: {err}"));
            }
        }
    }
}

impl eframe::App for PracticeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_snapshots();
        egui::TopBottomPanel::top("selectors").show(ctx, |ui| self.show_selectors(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.show_main(ui));
        // Snapshots arrive from the recorder thread between frames.
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
