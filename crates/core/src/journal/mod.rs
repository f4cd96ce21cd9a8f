//! Download journal.
//!
//! The journal mirrors lifecycle messages and raw process output lines,
//! tagged with the originating download id, into a bounded in-memory
//! ring that the API can serve back to clients. Emission is decoupled
//! from storage through an async channel so workers never block on it.

mod handle;
mod writer;

pub use handle::{JournalHandle, JournalLine};
pub use writer::{create_journal, JournalBuffer, JournalWriter};
