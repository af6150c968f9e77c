#![forbid(unsafe_code)]
#![warn(clippy::missing_docs_in_private_items)]

//! Describes led effects (flash, snake, kitt), converts them to and from the json the led server
//! expects, sends them to the server and keeps a store of saved effects.

/// Packed `0xRRGGBB` colors and their `[r, g, b]` wire form.
pub mod color;

/// Schema-driven encoding and decoding, plus the name -> variant registry.
pub mod codec;

/// The effect variants.
pub mod effects;

/// The http transport to the led server.
pub mod controller;

/// Saved effects.
pub mod store;

/// Toml configuration shared by the binaries.
pub mod config;

pub use codec::CodecError;
pub use controller::Controller;
pub use effects::{Effect, Flash, Kitt, Snake};
