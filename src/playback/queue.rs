use std::collections::VecDeque;

/// One sentence handed to the speech player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub id: u64,
    pub text: String,
}

/// FIFO of sentences awaiting speech, with at most one utterance in flight.
///
/// Only the player side dequeues (`next`); the segmenter side only enqueues.
#[derive(Debug, Default)]
pub struct PlaybackQueue {
    pending: VecDeque<String>,
    in_flight: Option<Utterance>,
    next_id: u64,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, sentence: String) {
        self.pending.push_back(sentence);
    }

    /// Dequeue the head as the in-flight utterance.
    ///
    /// Returns `None` while another utterance is still in flight.
    pub fn next(&mut self) -> Option<Utterance> {
        if self.in_flight.is_some() {
            return None;
        }

        let text = self.pending.pop_front()?;
        self.next_id += 1;
        let utterance = Utterance {
            id: self.next_id,
            text,
        };
        self.in_flight = Some(utterance.clone());

        Some(utterance)
    }

    /// Mark the in-flight utterance done; ids that are not in flight are ignored
    pub fn complete(&mut self, id: u64) -> Option<Utterance> {
        match &self.in_flight {
            Some(utterance) if utterance.id == id => self.in_flight.take(),
            _ => None,
        }
    }

    pub fn in_flight(&self) -> Option<&Utterance> {
        self.in_flight.as_ref()
    }

    /// Sentences waiting behind the in-flight utterance
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Nothing queued and nothing playing
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_none()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.in_flight = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_one_utterance_in_flight() {
        let mut queue = PlaybackQueue::new();
        queue.enqueue("One.".to_string());
        queue.enqueue("Two.".to_string());

        let first = queue.next().unwrap();
        assert_eq!(first.text, "One.");
        assert!(queue.next().is_none(), "second must wait for the first");

        assert_eq!(queue.complete(first.id), Some(first));
        let second = queue.next().unwrap();
        assert_eq!(second.text, "Two.");
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut queue = PlaybackQueue::new();
        queue.enqueue("One.".to_string());
        let first = queue.next().unwrap();

        assert!(queue.complete(first.id + 1).is_none());
        assert_eq!(queue.in_flight(), Some(&first));
    }

    #[test]
    fn test_idle_and_clear() {
        let mut queue = PlaybackQueue::new();
        assert!(queue.is_idle());

        queue.enqueue("One.".to_string());
        queue.enqueue("Two.".to_string());
        queue.next();
        assert!(!queue.is_idle());
        assert_eq!(queue.pending().collect::<Vec<_>>(), vec!["Two."]);

        queue.clear();
        assert!(queue.is_idle());
        assert!(queue.next().is_none());
    }

    #[test]
    fn test_ids_are_unique_across_clear() {
        let mut queue = PlaybackQueue::new();
        queue.enqueue("One.".to_string());
        let first = queue.next().unwrap();
        queue.clear();

        queue.enqueue("Two.".to_string());
        let second = queue.next().unwrap();
        assert_ne!(first.id, second.id);
    }
}
