//! Audio output. Playback is fire-and-forget: the sink is detached and
//! completion is neither awaited nor reported, so overlapping playback is
//! possible. The trait seam is where a completion handle would go if
//! serialization is ever wanted.

use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rodio::buffer::SamplesBuffer;
use rodio::source::{Source, UniformSourceIterator};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use crate::session::RecordedClip;

/// The platform's audio-output facility, mockable for tests.
pub trait AudioOutput {
    /// Play the reference recording at `path`.
    fn play_file(&mut self, path: &Path) -> Result<()>;
    /// Play a finalized in-memory recording.
    fn play_clip(&mut self, clip: &RecordedClip) -> Result<()>;
}

pub struct RodioOutput {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl RodioOutput {
    pub fn new() -> Result<Self> {
        let (stream, handle) =
            OutputStream::try_default().context("failed to open audio output device")?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    fn play_source<S>(&self, source: S) -> Result<()>
    where
        S: Source<Item = f32> + Send + 'static,
    {
        let sink = Sink::try_new(&self.handle).context("failed to create playback sink")?;
        sink.append(ensure_stereo(source));
        sink.detach();
        Ok(())
    }
}

impl AudioOutput for RodioOutput {
    fn play_file(&mut self, path: &Path) -> Result<()> {
        let file =
            std::fs::File::open(path).with_context(|| format!("failed to open {:?}", path))?;
        let decoder = Decoder::new(BufReader::new(file)).context("unsupported audio format")?;
        self.play_source(decoder.convert_samples::<f32>())
    }

    fn play_clip(&mut self, clip: &RecordedClip) -> Result<()> {
        let stereo = duplicate_to_stereo(&clip.samples);
        self.play_source(SamplesBuffer::new(2, clip.sample_rate, stereo))
    }
}

fn ensure_stereo<S>(source: S) -> Box<dyn Source<Item = f32> + Send>
where
    S: Source<Item = f32> + Send + 'static,
{
    if source.channels() == 2 {
        Box::new(source)
    } else {
        let sample_rate = source.sample_rate();
        Box::new(UniformSourceIterator::new(source, 2, sample_rate))
    }
}

pub fn duplicate_to_stereo(samples: &[f32]) -> Vec<f32> {
    let mut output = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        output.push(sample);
        output.push(sample);
    }
    output
}

/// One play request observed by [`MockOutput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayRequest {
    File(PathBuf),
    Clip { samples: usize, sample_rate: u32 },
}

/// Records play requests instead of driving a device.
#[derive(Debug, Default)]
pub struct MockOutput {
    pub requests: Vec<PlayRequest>,
}

impl AudioOutput for MockOutput {
    fn play_file(&mut self, path: &Path) -> Result<()> {
        self.requests.push(PlayRequest::File(path.to_path_buf()));
        Ok(())
    }

    fn play_clip(&mut self, clip: &RecordedClip) -> Result<()> {
        self.requests.push(PlayRequest::Clip {
            samples: clip.samples.len(),
            sample_rate: clip.sample_rate,
        });
        Ok(())
    }
}
