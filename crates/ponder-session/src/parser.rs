/// Incremental splitter for reasoning-model output.
///
/// Models like deepseek-r1 wrap their reasoning in `<think>` … `</think>` and
/// stream the final answer after it. Fragment boundaries are arbitrary, so a
/// marker may arrive split over several fragments; the parser holds back a
/// trailing partial marker until the next fragment decides it.

pub const OPEN_MARKER: &str = "<think>";
pub const CLOSE_MARKER: &str = "</think>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Segment {
    #[default]
    Thinking,
    Responding,
}

/// Which live buffers changed during one `push`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub thought: bool,
    pub response: bool,
}

impl Progress {
    pub fn any(&self) -> bool {
        self.thought || self.response
    }
}

/// Final thought/response pair of a completed stream
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SegmentedReply {
    pub thought: String,
    pub response: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Open,
    Close,
}

#[derive(Debug, Default)]
pub struct ThinkParser {
    segment: Segment,
    thought: String,
    response: String,
    /// Tail of the input that may be the start of a marker
    lookback: String,
    /// An opening marker was seen
    opened: bool,
}

impl ThinkParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segment(&self) -> Segment {
        self.segment
    }

    /// Live thought buffer (without held-back text)
    pub fn thought(&self) -> &str {
        &self.thought
    }

    /// Live response buffer
    pub fn response(&self) -> &str {
        &self.response
    }

    /// Feed the next fragment
    pub fn push(&mut self, fragment: &str) -> Progress {
        let mut progress = Progress::default();
        if fragment.is_empty() {
            return progress;
        }

        if self.segment == Segment::Responding {
            self.response.push_str(fragment);
            progress.response = true;
            return progress;
        }

        let mut text = std::mem::take(&mut self.lookback);
        text.push_str(fragment);
        let mut rest = text.as_str();

        loop {
            match find_marker(rest) {
                Some((at, Marker::Open)) => {
                    if self.opened {
                        if at > 0 {
                            self.thought.push_str(&rest[..at]);
                            progress.thought = true;
                        }
                    } else {
                        // Text before the first opening marker is preamble
                        self.opened = true;
                        if !self.thought.is_empty() {
                            self.thought.clear();
                            progress.thought = true;
                        }
                    }
                    rest = &rest[at + OPEN_MARKER.len()..];
                }
                Some((at, Marker::Close)) => {
                    if at > 0 {
                        self.thought.push_str(&rest[..at]);
                        progress.thought = true;
                    }
                    self.segment = Segment::Responding;

                    let tail = &rest[at + CLOSE_MARKER.len()..];
                    if !tail.is_empty() {
                        self.response.push_str(tail);
                        progress.response = true;
                    }
                    return progress;
                }
                None => {
                    let held = partial_marker_len(rest);
                    let (complete, partial) = rest.split_at(rest.len() - held);
                    if !complete.is_empty() {
                        self.thought.push_str(complete);
                        progress.thought = true;
                    }
                    self.lookback = partial.to_string();
                    return progress;
                }
            }
        }
    }

    /// End of input: flush held-back text and produce the final segments
    pub fn finish(mut self) -> SegmentedReply {
        let pending = std::mem::take(&mut self.lookback);
        match self.segment {
            Segment::Thinking => self.thought.push_str(&pending),
            Segment::Responding => self.response.push_str(&pending),
        }

        SegmentedReply {
            thought: strip_think_markers(&self.thought).trim().to_string(),
            response: self.response.trim().to_string(),
        }
    }
}

/// Remove literal `<think>` / `</think>` occurrences
pub fn strip_think_markers(text: &str) -> String {
    if !text.contains(OPEN_MARKER) && !text.contains(CLOSE_MARKER) {
        return text.to_string();
    }
    text.replace(OPEN_MARKER, "").replace(CLOSE_MARKER, "")
}

/// Earliest complete marker in `text`
fn find_marker(text: &str) -> Option<(usize, Marker)> {
    match (text.find(OPEN_MARKER), text.find(CLOSE_MARKER)) {
        (Some(open), Some(close)) if open < close => Some((open, Marker::Open)),
        (_, Some(close)) => Some((close, Marker::Close)),
        (Some(open), None) => Some((open, Marker::Open)),
        (None, None) => None,
    }
}

/// Length of the longest suffix of `text` that is a proper prefix of a marker
fn partial_marker_len(text: &str) -> usize {
    let max = text.len().min(CLOSE_MARKER.len() - 1);
    (1..=max)
        .rev()
        .find(|&n| {
            let start = text.len() - n;
            text.is_char_boundary(start) && {
                let tail = &text[start..];
                OPEN_MARKER.starts_with(tail) || CLOSE_MARKER.starts_with(tail)
            }
        })
        .unwrap_or(0)
}
