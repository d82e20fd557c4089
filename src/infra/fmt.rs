//! Text layout helpers for console listings.

/// Indents every line of `text` by `level` steps of two spaces.
/// 将 `text` 的每一行缩进 `level` 级（每级两个空格）。
pub fn indent(text: &str, level: usize) -> String {
    let pad = "  ".repeat(level);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats a duration in seconds the way summaries print it, e.g. `12.34s`.
pub fn seconds(secs: f64) -> String {
    format!("{:.2}s", secs)
}
