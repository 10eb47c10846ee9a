//! Escaping for text that travels through the generation backend
//!
//! The local model was trained on single-line samples, so real newlines and
//! tabs in a prompt are sent as the two-character sequences `\n` and `\t`.
//! Backend output comes back in the same form and is unescaped before it is
//! shown or stored.
//!
//! Decoding is lossy: user text that literally contains `\n`, `\t` or `%20`
//! cannot be told apart from escaped output.

/// Escape newlines and tabs in a prompt.
pub fn encode(text: &str) -> String {
    text.replace('\n', "\\n").replace('\t', "\\t")
}

/// Undo [`encode`] on raw backend output. `%20` also becomes two spaces.
pub fn decode(text: &str) -> String {
    text.replace("\\n", "\n")
        .replace("\\t", "\t")
        .replace("%20", "  ")
}
