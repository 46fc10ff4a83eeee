//! Plain text decoding

/// Decode bytes as UTF-8, falling back to Latin-1 rather than failing
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
    }
}
