/// Text recognized for one chunk. Empty when the chunk failed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkResult {
    pub index: usize,
    pub text: String,
}

impl ChunkResult {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    pub fn failed(index: usize) -> Self {
        Self::new(index, String::new())
    }
}

/// Chunk texts of one file, held in chunk-index order.
///
/// Slots are pre-sized and start empty, so a chunk that never reports
/// contributes an empty segment rather than shifting its neighbours.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transcript {
    segments: Vec<String>,
}

impl Transcript {
    pub fn with_chunks(num_chunks: usize) -> Self {
        Self {
            segments: vec![String::new(); num_chunks],
        }
    }

    /// Store a chunk's text in its slot. Results outside the planned range
    /// are dropped.
    pub fn insert(&mut self, result: ChunkResult) {
        match self.segments.get_mut(result.index) {
            Some(slot) => *slot = result.text,
            None => log::warn!(
                "Dropping result for chunk {} (only {} planned)",
                result.index,
                self.segments.len()
            ),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments joined by single spaces, in index order.
    pub fn text(&self) -> String {
        self.segments.join(" ")
    }
}

impl FromIterator<ChunkResult> for Transcript {
    /// Builds a transcript sized to the highest index seen.
    fn from_iter<I: IntoIterator<Item = ChunkResult>>(iter: I) -> Self {
        let results: Vec<ChunkResult> = iter.into_iter().collect();
        let len = results.iter().map(|r| r.index + 1).max().unwrap_or(0);
        let mut transcript = Transcript::with_chunks(len);
        for result in results {
            transcript.insert(result);
        }
        transcript
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_joins_in_index_order_regardless_of_insertion_order() {
        let mut t = Transcript::with_chunks(3);
        t.insert(ChunkResult::new(2, "three"));
        t.insert(ChunkResult::new(0, "one"));
        t.insert(ChunkResult::new(1, "two"));
        assert_eq!(t.text(), "one two three");
    }

    #[test]
    fn test_failed_chunk_leaves_empty_segment() {
        let mut t = Transcript::with_chunks(3);
        t.insert(ChunkResult::new(0, "one"));
        t.insert(ChunkResult::failed(1));
        t.insert(ChunkResult::new(2, "three"));
        assert_eq!(t.text(), "one  three");
    }

    #[test]
    fn test_unfilled_slots_are_empty() {
        let mut t = Transcript::with_chunks(2);
        t.insert(ChunkResult::new(1, "second"));
        assert_eq!(t.segments(), &["".to_string(), "second".to_string()]);
        assert_eq!(t.text(), " second");
    }

    #[test]
    fn test_single_chunk_has_no_separator() {
        let mut t = Transcript::with_chunks(1);
        t.insert(ChunkResult::new(0, "only"));
        assert_eq!(t.text(), "only");
    }

    #[test]
    fn test_out_of_range_result_is_dropped() {
        let mut t = Transcript::with_chunks(1);
        t.insert(ChunkResult::new(5, "stray"));
        assert_eq!(t.len(), 1);
        assert_eq!(t.text(), "");
    }

    #[test]
    fn test_empty_transcript() {
        let t = Transcript::with_chunks(0);
        assert!(t.is_empty());
        assert_eq!(t.text(), "");
    }

    #[test]
    fn test_collect_from_results() {
        let t: Transcript = vec![ChunkResult::new(1, "b"), ChunkResult::new(0, "a")]
            .into_iter()
            .collect();
        assert_eq!(t.text(), "a b");
    }
}
