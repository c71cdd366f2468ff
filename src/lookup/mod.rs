//! Query resolution against the external summary service.
//!
//! * [`QueryResolver`]: async trait implemented by every answer source.
//! * [`SummaryResolver`]: REST page-summary lookup (the default source).
//! * [`LookupError`]: why a lookup failed; the orchestrator replaces any of
//!   them with a fixed apology.

pub mod resolver;

pub use resolver::{LookupError, QueryResolver, SummaryResolver, NO_SUMMARY};
