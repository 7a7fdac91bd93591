//! Text helpers for rendering model output.

/// Turn every newline into a Markdown hard line break (`"  \n"`).
///
/// Not idempotent: running it twice leaves four trailing spaces before each newline.
pub fn convert_newlines(text: &str) -> String {
    text.replace('\n', "  \n")
}
