use super::audio_chunk::{AudioChunk, ChunkSpan};

/// A decoded mono waveform: PCM samples normalized to [-1.0, 1.0].
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Sample offset for a time in seconds, rounded to the nearest sample
    /// and clamped to the buffer length.
    pub fn sample_index_at_time(&self, time: f64) -> usize {
        let index = (time.max(0.0) * self.sample_rate as f64).round() as usize;
        index.min(self.samples.len())
    }

    /// Borrow the samples selected by `span`.
    pub fn chunk(&self, span: &ChunkSpan) -> AudioChunk<'_> {
        let end = span.end_sample.min(self.samples.len());
        let start = span.start_sample.min(end);
        AudioChunk::new(span.index, &self.samples[start..end])
    }
}
