//! Wire framing of streamed chat responses
//!
//! A chat exchange arrives as one chunked `text/plain` body carrying up to
//! three frames separated by in-band sentinel markers. This module owns the
//! byte-to-text decoding, the marker scanning, and the reference payload
//! codec.

pub mod decoder;
pub mod parser;
pub mod references;

pub use decoder::Utf8StreamDecoder;
pub use parser::{
    ChatOutcome, StreamEvent, StreamFrameParser, REFERENCES_MARKER, TOKEN_USAGE_MARKER,
};
pub use references::{decode_references, encode_references, Reference};
