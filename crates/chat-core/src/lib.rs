//! # chat-core
//!
//! Command dispatch for the tracker's chat surface.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   CommandCall   ┌──────────────────┐   execute   ┌─────────────┐
//! │  Chat / HTTP │ ──────────────▶ │  CommandRegistry │ ──────────▶ │  Command    │
//! │  front-end   │ ◀────────────── │  (by name)       │ ◀────────── │  (domain)   │
//! └──────────────┘   CommandReply  └──────────────────┘             └─────────────┘
//! ```
//!
//! Domain crates implement [`Command`]; the front-end only ever sees
//! [`CommandCall`] and [`CommandReply`].

pub mod command;
pub mod error;

pub use command::{
    Command, CommandCall, CommandRegistry, CommandReply, CommandSchema, HELP_COMMAND, ParameterSchema,
};
pub use error::{ChatError, Result};
