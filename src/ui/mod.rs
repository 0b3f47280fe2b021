pub mod components;
pub mod screens;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use eframe::NativeOptions;

use crate::audio::playback::RodioOutput;
use crate::catalog::PhraseCatalog;
use crate::session::RecorderRuntime;

pub fn launch_ui(
    runtime: RecorderRuntime,
    catalog: PhraseCatalog,
    assets_root: PathBuf,
) -> Result<()> {
    let output = RodioOutput::new()?;
    let app = screens::practice::PracticeApp::new(catalog, assets_root, runtime, Box::new(output));
    eframe::run_native(
        "AccentCoach",
        NativeOptions::default(),
        Box::new(move |_cc| Box::new(app)),
    )
    .map_err(|err| anyhow!(err.to_string()))
}
