//! The chat core: one request/response cycle.
//!
//! 1. **Parse** the client's conversation snapshot ([`snapshot`])
//! 2. **Assemble** context prefix + history + new user message ([`assembler`])
//! 3. **Complete** against the configured provider, converting any failure
//!    into a user-facing message ([`completion`])
//! 4. **Return** an [`ActionResult`] echoing the original history
//!
//! There is no retry and no streaming: each submission is one awaited call.

pub mod assembler;
pub mod completion;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use assembler::assemble;
pub use completion::{ActionResult, Completer, CompletionFailure};
pub use snapshot::{parse_snapshot, parse_snapshot_value};
