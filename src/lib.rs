//! Memory access search over ARM instruction trace logs.
//!
//! Each trace line is decoded into a [`LogEntry`] that knows which addresses
//! the instruction loaded from or stored to. A [`TraceIndex`] answers which
//! lines touched a given address. Conditional instructions are always
//! assumed to have executed since the trace carries no flags.

pub mod config;
pub mod decode;
pub mod error;
pub mod inline;
pub mod layout;
pub mod operand;
pub mod registers;
pub mod trace;

pub use config::DecodeConfig;
pub use decode::{AccessKind, LogEntry, decode};
pub use error::{DecodeError, TraceError};
pub use registers::RegisterSnapshot;
pub use trace::TraceIndex;
