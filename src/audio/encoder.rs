use std::path::Path;

use anyhow::{Context, Result};

use crate::session::RecordedClip;

/// Write a finalized recording to a 16-bit mono WAV file.
pub fn write_wav<P: AsRef<Path>>(clip: &RecordedClip, path: P) -> Result<()> {
    let path = path.as_ref();
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: clip.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("failed to create WAV file {}", path.display()))?;
    for &sample in clip.samples.iter() {
        let quantized = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(quantized)
            .context("failed to write audio sample")?;
    }
    writer.finalize().context("failed to finalize WAV file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::write_wav;
    use crate::session::RecordedClip;
    use tempfile::tempdir;

    #[test]
    fn written_file_round_trips_through_hound() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("take.wav");
        let clip = RecordedClip::from_samples(vec![0.0, 0.5, -0.5, 1.0], 16_000);
        write_wav(&clip, &path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(reader.len(), 4);
    }
}
