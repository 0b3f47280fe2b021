use std::ops::RangeInclusive;
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Parser;

use crate::catalog::RuntimeCatalog;

/// AccentCoach - pronunciation practice
///
/// Pick a difficulty level and phrase, play the native recording, record your
/// own voice, and play it back for comparison.
#[derive(Parser, Debug)]
#[command(name = "accentcoach")]
#[command(version = "0.1.0")]
#[command(about = "Pronunciation practice: native phrases, your recordings", long_about = None)]
pub struct Args {
    /// Optional override for the assets directory holding reference audio.
    #[arg(long = "assets-path", value_name = "DIR")]
    pub assets_path: Option<PathBuf>,

    /// Path to a JSON phrase catalog (defaults to the built-in French catalog).
    #[arg(long, value_name = "PATH", conflicts_with = "catalog_json")]
    pub catalog: Option<PathBuf>,

    /// Inline JSON phrase catalog.
    #[arg(long = "catalog-json", value_name = "JSON", conflicts_with = "catalog")]
    pub catalog_json: Option<String>,

    /// Optional input device name.
    #[arg(long)]
    pub device: Option<String>,

    /// Target sample rate for finalized recordings.
    #[arg(long, default_value_t = 16_000)]
    pub sample_rate: u32,

    /// Minimum latency in milliseconds for capture buffering.
    #[arg(long = "latency-min")]
    pub latency_min: Option<u32>,

    /// Maximum latency in milliseconds for capture buffering.
    #[arg(long = "latency-max")]
    pub latency_max: Option<u32>,
}

impl Args {
    pub fn latency_range(&self) -> Result<RangeInclusive<u32>> {
        match (self.latency_min, self.latency_max) {
            (Some(min), Some(max)) => {
                ensure!(min > 0, "latency-min must be positive");
                ensure!(max >= min, "latency-max must be >= latency-min");
                Ok(min..=max)
            }
            (None, None) => Ok(100..=200),
            _ => anyhow::bail!("provide both latency-min and latency-max or neither"),
        }
    }

    /// Load the catalog override, if one was given.
    pub fn runtime_catalog(&self) -> Result<Option<RuntimeCatalog>> {
        if let Some(path) = self.catalog.as_deref() {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read catalog file {:?}", path))?;
            return parse_runtime_catalog(&data).map(Some);
        }
        if let Some(raw) = self.catalog_json.as_deref() {
            return parse_runtime_catalog(raw).map(Some);
        }
        Ok(None)
    }
}

fn parse_runtime_catalog(raw: &str) -> Result<RuntimeCatalog> {
    let catalog: RuntimeCatalog =
        serde_json::from_str(raw).context("failed to parse catalog JSON")?;
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::Parser;

    #[test]
    fn parses_and_validates_latency_range() {
        let args =
            Args::try_parse_from(["accentcoach", "--latency-min", "120", "--latency-max", "180"])
                .unwrap();
        let range = args.latency_range().unwrap();
        assert_eq!((*range.start(), *range.end()), (120, 180));
    }

    #[test]
    fn rejects_partial_latency_override() {
        let args = Args::try_parse_from(["accentcoach", "--latency-min", "150"]).unwrap();
        assert!(args.latency_range().is_err());
    }

    #[test]
    fn defaults_without_overrides() {
        let args = Args::try_parse_from(["accentcoach"]).unwrap();
        let range = args.latency_range().unwrap();
        assert_eq!((*range.start(), *range.end()), (100, 200));
        assert_eq!(args.sample_rate, 16_000);
        assert!(args.runtime_catalog().unwrap().is_none());
    }

    #[test]
    fn parses_inline_catalog_json() {
        let json = r#"{
            "beginner": [{"text": "Bonjour", "audio": "audio/bonjour.mp3"}],
            "intermediate": [{"text": "Ça va", "audio": "audio/ca-va.mp3"}],
            "advanced": [{"text": "Enchanté", "audio": "audio/enchante.mp3"}]
        }"#;
        let args = Args::try_parse_from(["accentcoach", "--catalog-json", json]).unwrap();
        let catalog = args.runtime_catalog().unwrap().unwrap();
        catalog.validate().unwrap();
        assert_eq!(catalog.beginner.len(), 1);
    }

    #[test]
    fn catalog_file_and_inline_json_conflict() {
        let result = Args::try_parse_from([
            "accentcoach",
            "--catalog",
            "catalog.json",
            "--catalog-json",
            "{}",
        ]);
        assert!(result.is_err());
    }
}
