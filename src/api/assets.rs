//! Embedded chat page
//!
//! Falls back to the filesystem so the page can be edited without a rebuild.

use rust_embed::Embed;

#[derive(Embed)]
#[folder = "ui"]
struct Assets;

/// Get the index.html content (embedded or from filesystem)
pub fn get_index_html() -> Option<String> {
    if let Some(content) = Assets::get("index.html") {
        return String::from_utf8(content.data.into_owned()).ok();
    }

    std::fs::read_to_string("ui/index.html").ok()
}
