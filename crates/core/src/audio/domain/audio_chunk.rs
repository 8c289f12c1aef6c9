use std::ops::Range;

/// Sample range of one fixed-length chunk within a decoded buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkSpan {
    pub index: usize,
    pub start_sample: usize,
    pub end_sample: usize,
}

impl ChunkSpan {
    pub fn range(&self) -> Range<usize> {
        self.start_sample..self.end_sample
    }

    pub fn len(&self) -> usize {
        self.end_sample.saturating_sub(self.start_sample)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn start_time(&self, sample_rate: u32) -> f64 {
        self.start_sample as f64 / sample_rate.max(1) as f64
    }

    pub fn end_time(&self, sample_rate: u32) -> f64 {
        self.end_sample as f64 / sample_rate.max(1) as f64
    }
}

/// Read-only view of a chunk's samples, tagged with its position in the file.
#[derive(Clone, Copy, Debug)]
pub struct AudioChunk<'a> {
    index: usize,
    samples: &'a [f32],
}

impl<'a> AudioChunk<'a> {
    pub fn new(index: usize, samples: &'a [f32]) -> Self {
        Self { index, samples }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn samples(&self) -> &'a [f32] {
        self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Number of chunks for a buffer of `duration_secs`: `floor(D / L) + 1`.
///
/// A duration that is an exact multiple of the chunk length therefore ends
/// with an empty chunk. A non-positive chunk length yields one chunk.
pub fn chunk_count(duration_secs: f64, chunk_length_secs: f64) -> usize {
    if chunk_length_secs.is_nan() || chunk_length_secs <= 0.0 || !duration_secs.is_finite() {
        return 1;
    }
    (duration_secs.max(0.0) / chunk_length_secs).floor() as usize + 1
}

/// Split `total_samples` at `sample_rate` into consecutive chunks of
/// `chunk_length_secs`. Offsets are `round(seconds * sample_rate)`; the last
/// chunk's end is clamped to `total_samples`.
pub fn plan_chunks(total_samples: usize, sample_rate: u32, chunk_length_secs: f64) -> Vec<ChunkSpan> {
    let rate = sample_rate.max(1) as f64;
    let duration = total_samples as f64 / rate;
    let count = chunk_count(duration, chunk_length_secs);
    if count == 1 {
        return vec![ChunkSpan {
            index: 0,
            start_sample: 0,
            end_sample: total_samples,
        }];
    }

    let to_offset = |secs: f64| ((secs * rate).round() as usize).min(total_samples);

    (0..count)
        .map(|index| {
            let start_secs = index as f64 * chunk_length_secs;
            let end_secs = ((index + 1) as f64 * chunk_length_secs).min(duration);
            let start_sample = to_offset(start_secs);
            let end_sample = if index + 1 == count {
                total_samples
            } else {
                to_offset(end_secs)
            };
            ChunkSpan {
                index,
                start_sample,
                end_sample: end_sample.max(start_sample),
            }
        })
        .collect()
}
