//! Typed text reveal.
//!
//! * [`Reveal`]: the lazy character sequence (`next_chunk`).
//! * [`TypedRenderer`]: drives a `Reveal` into a [`TextSurface`] on a fixed
//!   tick, one pending render per surface.

pub mod reveal;
pub mod typed;

pub use reveal::{Chunk, Reveal};
pub use typed::{RenderHandle, RenderOutcome, TextSurface, TypedRenderer};
