use base64::{Engine, engine::general_purpose::STANDARD};

use crate::content::{ContentEncoding, StoredContent};

/// Turn stored content into text.
///
/// Base64 payloads may be wrapped across lines; all ASCII whitespace is ignored.
pub(crate) fn decode(content: &StoredContent) -> Result<String, String> {
    match content.encoding {
        ContentEncoding::Utf8 => Ok(content.raw.clone()),
        ContentEncoding::Base64 => {
            let compact: String = content
                .raw
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect();
            let bytes = STANDARD.decode(compact).map_err(|e| e.to_string())?;
            String::from_utf8(bytes).map_err(|e| e.to_string())
        }
    }
}

/// Encode text as wrapped base64, the way git hosts usually return it.
pub(crate) fn encode_wrapped(bytes: &[u8], width: usize) -> String {
    let flat = STANDARD.encode(bytes);
    let mut out = String::with_capacity(flat.len() + flat.len() / width + 1);
    for (i, ch) in flat.chars().enumerate() {
        if i > 0 && i % width == 0 {
            out.push('\n');
        }
        out.push(ch);
    }
    out.push('\n');
    out
}
