use std::sync::LazyLock;

use regex::Regex;

static STEP_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:Bước|Step)\s*(\d+)").unwrap());

static NUMBERED_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)[.)]\s+").unwrap());

static ARROW_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"→|->").unwrap());

static CHEVRON_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*>\s*").unwrap());

/// Step-boundary match, in matcher priority order. An explicit marker
/// always wins over a bare numbered list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMatch {
    /// "Bước N" / "Step N" at the start of a line.
    Marker(u32),
    /// "N." / "N)" at the start of a line; acceptance is decided by the
    /// tracker, not the matcher.
    NumberedItem(u32),
}

/// Runs the ordered matchers against a trimmed line.
pub fn match_step_header(line: &str) -> Option<StepMatch> {
    if let Some(caps) = STEP_MARKER.captures(line) {
        if let Ok(n) = caps[1].parse() {
            return Some(StepMatch::Marker(n));
        }
    }
    if let Some(caps) = NUMBERED_ITEM.captures(line) {
        if let Ok(n) = caps[1].parse() {
            return Some(StepMatch::NumberedItem(n));
        }
    }
    None
}

/// Step number embedded at the start of a split segment, if any.
pub fn embedded_marker_number(segment: &str) -> Option<u32> {
    match match_step_header(segment) {
        Some(StepMatch::Marker(n)) => Some(n),
        _ => None,
    }
}

/// Splits an Android-style guide on arrow separators ("→" or "->"),
/// whitespace-normalizing each segment and dropping empty ones.
pub fn split_on_arrows(text: &str) -> Vec<String> {
    ARROW_SEPARATOR
        .split(text)
        .map(normalize_whitespace)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Splits an iOS-style settings path on ">" separators.
pub fn split_on_chevrons(text: &str) -> Vec<String> {
    CHEVRON_SEPARATOR
        .split(text)
        .map(normalize_whitespace)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Collapses internal whitespace runs to single spaces and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Tracks the current step number while walking document blocks in order.
///
/// Numbered list items are accepted as step headers only when they restart
/// at 1 or continue the sequence; this keeps sub-lists ("1.1", a nested
/// "1." under step 3) from opening false step boundaries, at the cost of
/// misreading legitimately non-sequential lists. Rejections are logged so
/// such documents are visible in traces.
#[derive(Debug)]
pub struct StepTracker {
    current: u32,
}

impl StepTracker {
    pub fn new() -> Self {
        Self { current: 1 }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    /// Applies a trimmed line's leading step header, if any. Returns true
    /// when the line opened a new step.
    pub fn observe(&mut self, line: &str) -> bool {
        match match_step_header(line) {
            Some(StepMatch::Marker(n)) => {
                self.current = n;
                true
            }
            Some(StepMatch::NumberedItem(n)) => {
                if n == 1 || n == self.current + 1 {
                    self.current = n;
                    true
                } else {
                    tracing::debug!(
                        candidate = n,
                        current = self.current,
                        "Rejected numbered item as step header"
                    );
                    false
                }
            }
            None => false,
        }
    }
}

impl Default for StepTracker {
    fn default() -> Self {
        Self::new()
    }
}
