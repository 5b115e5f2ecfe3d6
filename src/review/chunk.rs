//! Splitting long text into message-sized chunks.
//!
//! Sizes are counted in characters, not bytes.

/// Lazy iterator over chunks of at most `max_chars` characters.
///
/// Each chunk ends right before the last newline within the first
/// `max_chars + 1` characters of the remaining text, so the newline opens
/// the next chunk. With no usable newline the chunk is cut at exactly
/// `max_chars`. Concatenating all chunks reproduces the input.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    rest: &'a str,
    max_chars: usize,
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// `max_chars` of zero is treated as one.
pub fn chunks(text: &str, max_chars: usize) -> Chunks<'_> {
    Chunks {
        rest: text,
        max_chars: max_chars.max(1),
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }

        // Byte offset of the character at position `max_chars`; `None` means
        // everything left fits.
        let Some((limit, _)) = self.rest.char_indices().nth(self.max_chars) else {
            let chunk = self.rest;
            self.rest = "";
            return Some(chunk);
        };

        let split_at = if self.rest[limit..].starts_with('\n') {
            limit
        } else {
            match self.rest[..limit].rfind('\n') {
                Some(0) | None => limit,
                Some(pos) => pos,
            }
        };

        let (chunk, rest) = self.rest.split_at(split_at);
        self.rest = rest;
        Some(chunk)
    }
}

/// Chunks ready for transmission: trimmed, with blank chunks dropped.
///
/// An empty result means there is nothing to send.
pub fn delivery_chunks(text: &str, max_chars: usize) -> Vec<String> {
    chunks(text, max_chars)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}
