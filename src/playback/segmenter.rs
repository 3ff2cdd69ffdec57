//! Incremental sentence segmentation for streamed replies
//!
//! Fragments are appended to a single buffer. A sentence boundary is a `.`,
//! `?` or `!` followed by whitespace; the punctuation stays with the sentence
//! before it and the whitespace is dropped. Text after the last boundary stays
//! buffered until more text arrives or the reply is flushed.

/// Splits streamed text into complete sentences
#[derive(Debug, Clone, Default)]
pub struct SentenceSegmenter {
    buffer: String,
}

impl SentenceSegmenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment and return the sentences it completed, in order
    pub fn push(&mut self, fragment: &str) -> Vec<String> {
        if fragment.is_empty() {
            return Vec::new();
        }

        self.buffer.push_str(fragment);

        let (sentences, consumed) = split_sentences(&self.buffer);
        if consumed > 0 {
            self.buffer.drain(..consumed);
        }

        sentences
    }

    /// Take the unterminated remainder as a final sentence, unless it is blank
    pub fn flush(&mut self) -> Option<String> {
        let remainder = std::mem::take(&mut self.buffer);
        if remainder.trim().is_empty() {
            None
        } else {
            Some(remainder)
        }
    }

    /// Text not yet known to be a complete sentence
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '?' | '!')
}

/// Returns the complete sentences in `text` and the byte offset where the
/// unterminated remainder starts.
fn split_sentences(text: &str) -> (Vec<String>, usize) {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_terminal(c) {
            continue;
        }

        let end = i + c.len_utf8();
        let mut next_start = end;
        while let Some(&(j, w)) = chars.peek() {
            if !w.is_whitespace() {
                break;
            }
            next_start = j + w.len_utf8();
            chars.next();
        }

        if next_start > end {
            sentences.push(text[start..end].to_string());
            start = next_start;
        }
    }

    (sentences, start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streamed_chunks_produce_sentences_in_order() {
        let mut segmenter = SentenceSegmenter::new();

        assert!(segmenter.push("Hello ").is_empty());
        assert_eq!(segmenter.push("world. How "), vec!["Hello world."]);
        assert_eq!(segmenter.buffer(), "How ");

        assert!(segmenter.push("are you?").is_empty());
        assert_eq!(segmenter.buffer(), "How are you?");

        assert_eq!(segmenter.flush(), Some("How are you?".to_string()));
        assert_eq!(segmenter.buffer(), "");
    }

    #[test]
    fn test_multiple_boundaries_in_one_fragment() {
        let mut segmenter = SentenceSegmenter::new();

        let sentences = segmenter.push("Pump one is off. Pump two is on! Is that right? Yes");
        assert_eq!(
            sentences,
            vec!["Pump one is off.", "Pump two is on!", "Is that right?"]
        );
        assert_eq!(segmenter.buffer(), "Yes");
    }

    #[test]
    fn test_punctuation_without_whitespace_is_not_a_boundary() {
        let mut segmenter = SentenceSegmenter::new();

        assert!(segmenter.push("Version 2.5 is out").is_empty());
        assert!(segmenter.push("Done.").is_empty());
        assert_eq!(segmenter.buffer(), "Version 2.5 is outDone.");
    }

    #[test]
    fn test_boundary_split_across_fragments() {
        let mut segmenter = SentenceSegmenter::new();

        assert!(segmenter.push("First.").is_empty());
        assert_eq!(segmenter.push(" Second."), vec!["First."]);
        assert_eq!(segmenter.buffer(), "Second.");
    }

    #[test]
    fn test_whitespace_run_after_boundary_is_dropped() {
        let mut segmenter = SentenceSegmenter::new();

        assert_eq!(segmenter.push("One.\n\n  Two"), vec!["One."]);
        assert_eq!(segmenter.buffer(), "Two");
    }

    #[test]
    fn test_empty_fragment_is_noop() {
        let mut segmenter = SentenceSegmenter::new();
        segmenter.push("partial");

        assert!(segmenter.push("").is_empty());
        assert_eq!(segmenter.buffer(), "partial");
    }

    #[test]
    fn test_flush_discards_blank_remainder() {
        let mut segmenter = SentenceSegmenter::new();
        segmenter.push("Done. ");

        assert_eq!(segmenter.buffer(), "");
        assert_eq!(segmenter.flush(), None);

        segmenter.push("   ");
        assert_eq!(segmenter.flush(), None);
        assert_eq!(segmenter.buffer(), "");
    }

    #[test]
    fn test_no_characters_lost_or_duplicated() {
        let chunks = ["The tank ", "is full. Drain", " it now! Then ", "report.", " Ok"];
        let mut segmenter = SentenceSegmenter::new();
        let mut sentences = Vec::new();

        for chunk in chunks {
            sentences.extend(segmenter.push(chunk));
        }
        sentences.extend(segmenter.flush());

        assert_eq!(
            sentences,
            vec!["The tank is full.", "Drain it now!", "Then report.", "Ok"]
        );
    }

    #[test]
    fn test_multibyte_text() {
        let mut segmenter = SentenceSegmenter::new();

        assert_eq!(segmenter.push("¿Qué tal? Très bien… ok"), vec!["¿Qué tal?"]);
        assert_eq!(segmenter.buffer(), "Très bien… ok");
    }
}
