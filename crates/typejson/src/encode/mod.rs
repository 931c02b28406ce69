//! Text-level building blocks shared by the writers: escaping, literals and
//! the output buffer with its single deferred insertion.

pub mod primitives;
pub mod writer;
