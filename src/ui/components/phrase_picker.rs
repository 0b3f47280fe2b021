use eframe::egui;

use crate::catalog::{Level, PhraseCatalog};

#[derive(Default, Debug)]
pub struct PickerOutput {
    pub level: Option<Level>,
    pub phrase: Option<usize>,
}

/// Level and phrase selectors. Only phrases from the active level are offered,
/// so a selection can never point outside that level's sequence.
pub struct PhrasePicker<'a> {
    pub catalog: &'a PhraseCatalog,
    pub level: Level,
    pub phrase_index: usize,
}

impl<'a> PhrasePicker<'a> {
    pub fn show(&self, ui: &mut egui::Ui) -> PickerOutput {
        let mut output = PickerOutput::default();
        ui.horizontal(|ui| {
            egui::ComboBox::from_label("Difficulty")
                .selected_text(self.level.label())
                .show_ui(ui, |ui| {
                    for level in Level::ALL {
                        if ui
                            .selectable_label(level == self.level, level.label())
                            .clicked()
                        {
                            output.level = Some(level);
                        }
                    }
                });
            ui.separator();
            let phrases = self.catalog.phrases_for(self.level);
            let current = phrases[self.phrase_index].text.as_str();
            egui::ComboBox::from_label("Phrase")
                .selected_text(current)
                .show_ui(ui, |ui| {
                    for (index, phrase) in phrases.iter().enumerate() {
                        if ui
                            .selectable_label(index == self.phrase_index, phrase.text.as_str())
                            .clicked()
                        {
                            output.phrase = Some(index);
                        }
                    }
                });
        });
        output
    }
}
