//! Closure resolution.
//!
//! The resolver drives everything: it asks the descriptor codec to read
//! the unit's declared descriptors, the provider index for missing ones,
//! the rewrite engine to patch them, and the materializer to place bytes
//! in the output tree, iterating until `required ⊆ available`.
//!
//! Entry point: build a [`ResolveContext`] and call [`resolve`].

mod closure;
mod context;
mod materialize;
mod report;

pub use closure::{ClosureResolver, resolve};
pub use context::{ResolveContext, platform};
pub use materialize::place;
pub use report::{ClosureReport, ReportEntry};
