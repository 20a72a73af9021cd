// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Cleans raw text before tokenisation. Real corpora carry
// non-breaking spaces, zero-width spaces, Windows line endings,
// tabs and stray control characters; left alone, each variant
// ends up as its own vocabulary entry.
//
// Cleaning steps (applied in order):
//   1. Replace Unicode whitespace variants with plain space
//   2. Replace \r with \n for consistent line endings
//   3. Remove invisible control characters
//   4. Collapse runs of spaces, trim each line
//   5. Collapse more than 2 consecutive blank lines
//
// Reference: Rust Book §8 (Strings in Rust)

pub struct Preprocessor;

impl Preprocessor {
    /// Create a new Preprocessor instance
    pub fn new() -> Self {
        Self
    }

    /// Clean a raw text string for downstream tokenisation.
    pub fn clean(&self, text: &str) -> String {
        // ── Step 1: Normalise individual characters ───────────────────────────
        let normalised: String = text
            .chars()
            .map(|c| match c {
                '\t' => ' ',
                // Non-breaking space, zero-width space, byte order mark
                '\u{00A0}' | '\u{200B}' | '\u{FEFF}' => ' ',
                // Windows carriage return → Unix newline
                '\r' => '\n',
                c if c.is_control() && c != '\n' => ' ',
                c => c,
            })
            .collect();

        // ── Step 2: Collapse spaces line by line ──────────────────────────────
        // Per line so intentional paragraph breaks survive.
        let collapsed: String = normalised
            .lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join("\n");

        // ── Step 3: Collapse excessive blank lines ────────────────────────────
        // At most 2 consecutive newlines (one blank line).
        let mut result        = String::with_capacity(collapsed.len());
        let mut newline_count = 0usize;

        for c in collapsed.chars() {
            if c == '\n' {
                newline_count += 1;
                if newline_count <= 2 {
                    result.push(c);
                }
            } else {
                newline_count = 0;
                result.push(c);
            }
        }

        result.trim().to_string()
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_multiple_spaces() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("hello   world"), "hello world");
    }

    #[test]
    fn test_trims_edges() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("  hello world  "), "hello world");
    }

    #[test]
    fn test_removes_control_chars() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("hello\x01world"), "hello world");
    }

    #[test]
    fn test_normalises_windows_line_endings() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("line1\r\nline2"), "line1\nline2");
    }

    #[test]
    fn test_collapses_blank_lines() {
        let p      = Preprocessor::new();
        let output = p.clean("line1\n\n\n\n\nline2");
        assert!(!output.contains("\n\n\n"));
    }

    #[test]
    fn test_empty_string() {
        let p = Preprocessor::new();
        assert_eq!(p.clean(""), "");
    }
}
