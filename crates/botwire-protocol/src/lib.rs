//! Canonical protocol types for botwire chat-bot communication.
//!
//! This crate defines the complete wire surface of the protocol and the
//! machinery that resolves untyped payloads to exactly one typed shape:
//!
//! - [`segment`]: message content units, tagged `{"type", "data"}` wrappers
//! - [`event`]: inbound events, two-level tagged (family + discriminator)
//! - [`api`]: the action catalogue, each action bound to its typed response
//! - [`quick`]: fire-and-forget reactions bound to single event variants
//! - [`wire`]: call/response envelopes and the bad-status retcode set
//! - [`registry`]: the explicit schema registry built at initialization
//! - [`decode`]: discriminated decoding and event/operation cross-checks
//!
//! ## Design principles
//!
//! 1. **No global state.** The registry is an object assembled by ordered
//!    registration calls and handed to whoever needs it; tests build their
//!    own partial registries.
//! 2. **Dispatch is explicit.** Frame-level event decoding walks the two
//!    tag levels itself so unknown families, missing discriminators,
//!    unknown variants and shape mismatches are reported distinctly.
//! 3. **Identity over structure.** Quick operations match events by
//!    declared variant tag; overlapping field sets never make two shapes
//!    interchangeable.

pub mod api;
pub mod decode;
pub mod error;
pub mod event;
pub mod quick;
pub mod registry;
pub mod segment;
pub mod wire;

pub use error::{DecodeError, RegistryError};
pub use event::Event;
pub use quick::{QuickOpKind, QuickOperation};
pub use registry::ProtocolRegistry;
pub use segment::{Message, Segment};
