//! Incremental UTF-8 decoding for streamed response bodies.
//!
//! Chunk boundaries from the transport do not respect character
//! boundaries: a multi-byte character may start in one chunk and end in the
//! next. `Utf8StreamDecoder` keeps the incomplete tail of each chunk and
//! prepends it to the next one.
//!
//! Invalid sequences are replaced with U+FFFD, one replacement per maximal
//! invalid subpart, so streaming any split of a byte string produces exactly
//! `String::from_utf8_lossy` of the whole.

/// Stateful UTF-8 decoder for a single response stream.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    /// Valid prefix of a character whose remaining bytes have not arrived.
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `chunk`, returning all text that is complete so far.
    ///
    /// A zero-length chunk returns an empty string and leaves the state
    /// untouched.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        if chunk.is_empty() {
            return String::new();
        }

        let buf = if self.pending.is_empty() {
            chunk.to_vec()
        } else {
            let mut joined = std::mem::take(&mut self.pending);
            joined.extend_from_slice(chunk);
            joined
        };

        let mut out = String::with_capacity(buf.len());
        let mut rest: &[u8] = &buf;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&rest[..valid]));
                    match err.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &rest[valid + bad..];
                        }
                        None => {
                            // Truncated at the end of the buffer: wait for more bytes.
                            self.pending = rest[valid..].to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Whether bytes of an unfinished character are buffered.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Flush at end of stream.
    ///
    /// A character left unfinished by the stream decodes to a single U+FFFD.
    pub fn finish(self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            char::REPLACEMENT_CHARACTER.to_string()
        }
    }
}
