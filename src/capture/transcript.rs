/// Running transcript built from interim and final recognition results.
///
/// Final segments accumulate in order; the latest interim segment is shown
/// after them until a final result supersedes it.
#[derive(Debug, Clone, Default)]
pub struct TranscriptAccumulator {
    finals: String,
    interim: String,
}

impl TranscriptAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one recognition result and return the running transcript
    pub fn apply(&mut self, text: &str, is_final: bool) -> String {
        if is_final {
            let text = text.trim();
            if !text.is_empty() {
                if !self.finals.is_empty() {
                    self.finals.push(' ');
                }
                self.finals.push_str(text);
            }
            self.interim.clear();
        } else {
            self.interim = text.trim().to_string();
        }

        self.current()
    }

    pub fn current(&self) -> String {
        match (self.finals.is_empty(), self.interim.is_empty()) {
            (_, true) => self.finals.clone(),
            (true, false) => self.interim.clone(),
            (false, false) => format!("{} {}", self.finals, self.interim),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.finals.is_empty() && self.interim.is_empty()
    }

    pub fn clear(&mut self) {
        self.finals.clear();
        self.interim.clear();
    }
}
