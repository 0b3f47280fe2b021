use eframe::egui;

#[derive(Default, Debug)]
pub struct ControlStripOutput {
    pub play_reference: bool,
    pub start_recording: bool,
    pub stop_recording: bool,
    pub play_recording: bool,
    pub save_recording: bool,
}

/// The action buttons. Start is disabled while recording, Stop while idle,
/// and the recording actions until a finalized take exists.
pub struct ControlStrip {
    pub is_recording: bool,
    pub has_recording: bool,
}

impl ControlStrip {
    pub fn show(&self, ui: &mut egui::Ui) -> ControlStripOutput {
        let mut output = ControlStripOutput::default();
        ui.horizontal(|ui| {
            if ui
                .button("Play Native Audio")
                .on_hover_text("Play the reference recording for the selected phrase.")
                .clicked()
            {
                output.play_reference = true;
            }
            ui.separator();
            if gated_button(ui, !self.is_recording, "Start Recording") {
                output.start_recording = true;
            }
            if gated_button(ui, self.is_recording, "Stop Recording") {
                output.stop_recording = true;
            }
            ui.separator();
            if gated_button(ui, self.has_recording, "Play Your Recording") {
                output.play_recording = true;
            }
            if gated_button(ui, self.has_recording, "Save Recording") {
                output.save_recording = true;
            }
        });
        output
    }
}

fn gated_button(ui: &mut egui::Ui, enabled: bool, label: &str) -> bool {
    ui.add_enabled(enabled, egui::Button::new(label)).clicked()
}
