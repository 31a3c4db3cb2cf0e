//! Incremental UTF-8 decoding for streamed response bodies

/// Streaming UTF-8 decoder that tolerates chunk boundaries inside
/// multi-byte sequences.
///
/// An incomplete trailing sequence is carried into the next call, so the
/// caller only ever sees whole characters. Genuinely invalid bytes are
/// replaced with U+FFFD rather than surfaced as errors.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    /// Create a decoder with no carried bytes
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk of bytes, returning all complete characters
    pub fn decode(&mut self, input: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(input);

        let mut out = String::with_capacity(bytes.len());
        let mut rest = bytes.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    return out;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&rest[..valid]));
                    match e.error_len() {
                        // Invalid sequence in the middle: replace and move on.
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &rest[valid + len..];
                        }
                        // Incomplete sequence at the tail: carry it over.
                        None => {
                            self.pending = rest[valid..].to_vec();
                            return out;
                        }
                    }
                }
            }
        }
    }

    /// Flush any carried bytes at end of stream (lossily)
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let bytes = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}
