/// Text in the two shapes the review UI consumes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedText {
    pub content: String,
    pub lines: Vec<String>,
}

/// Normalizes line endings, trims the whole text and derives its lines.
///
/// Never fails. Feeding `content` back in yields the same value.
pub fn normalize(raw: &str) -> NormalizedText {
    let content = normalize_line_endings(raw).trim().to_string();
    let lines = split_lines(&content);
    NormalizedText { content, lines }
}

pub fn normalize_line_endings(raw: &str) -> String {
    raw.replace("\r\n", "\n").replace('\r', "\n")
}

/// Trimmed, non-empty lines in their original order.
pub fn split_lines(content: &str) -> Vec<String> {
    content
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
