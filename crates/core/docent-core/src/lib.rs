//! docent core
//!
//! Shared foundation for the docent workspace: the sentinel-marker frame
//! parser for streamed chat responses, conversation and room state, wire
//! types for every API endpoint, and the ambient plumbing (errors, env
//! configuration, logging).
//!
//! # Example: parsing a streamed response
//!
//! ```
//! use docent_core::framing::StreamFrameParser;
//!
//! let mut parser = StreamFrameParser::new();
//! let mut events = Vec::new();
//! for chunk in ["the ans", "wer<<USED_TOKEN_START>>12", "<<REFERENCES_START>>[]"] {
//!     events.extend(parser.process_chunk(chunk));
//! }
//! events.extend(parser.finish());
//! assert_eq!(parser.outcome().answer, "the answer");
//! assert_eq!(parser.outcome().token_usage, Some(12));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod error;
pub mod framing;
pub mod logging;
pub mod rooms;
pub mod session;
pub mod streaming;
pub mod types;

// Re-export main types
pub use config::{
    get_env_bool, get_env_int, get_env_or, get_required_env, load_env, load_env_from_path,
    validate_env,
};
pub use error::{DocentError, Result};
pub use framing::{
    decode_references, encode_references, ChatOutcome, Reference, StreamEvent, StreamFrameParser,
    Utf8StreamDecoder, REFERENCES_MARKER, TOKEN_USAGE_MARKER,
};
pub use logging::init_logging;
pub use rooms::{RoomSnapshot, RoomStore};
pub use session::{ChatSession, ChatTurn};
pub use streaming::{
    collect_outcome, create_event_stream, EventHandler, EventStream, EventStreamSender,
};
pub use types::*;
