//! Wire types shared by the client, the adaptors, and the CLI

pub mod admin;
pub mod chat;
pub mod documents;
pub mod system;

pub use admin::*;
pub use chat::*;
pub use documents::*;
pub use system::*;
