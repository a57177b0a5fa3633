//! Derived session state and message dispatch for Fieldsync.
//!
//! This crate is the reconciliation core: it holds the client-local
//! collections rebuilt purely from the inbound message stream and the
//! single routing function that maps each decoded message to exactly one
//! state mutation and/or notification.
//!
//! # How it fits in the stack
//!
//! ```text
//! Controller (above)  ← owns the connection, serializes access to SessionState
//!     ↕
//! Session layer (this crate)  ← state collections + dispatch rules
//!     ↕
//! Protocol layer (below)  ← provides Message and the record types
//! ```
//!
//! [`SessionState`] is deliberately NOT thread-safe by itself — it is a
//! plain single-writer struct, owned by the controller and accessed
//! through one coarse mutex at that higher level. Keeping it lock-free
//! here makes [`dispatch`] trivially testable and keeps the mutation →
//! notification ordering obvious.

mod dispatch;
mod error;
mod notify;
mod state;

pub use dispatch::dispatch;
pub use error::SessionError;
pub use notify::Notification;
pub use state::{SessionIdentity, SessionState};
