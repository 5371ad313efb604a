//! Small, self-contained data structures backing the scheduler.
//!
//! # Scope
//! `stdx` hosts the allocation-free containers the tick dispatcher is built
//! on. They are tuned for predictable memory use on small targets rather
//! than general-purpose ergonomics.
//!
//! # Design themes
//! - Fixed capacity chosen at compile time; overflow hands the value back or
//!   is a documented no-op, never a reallocation.
//! - Tight invariants enable `unsafe` fast paths (documented per type).
//! - Deterministic reset behavior for reuse in the per-tick hot loop.
//!
//! # Module map
//! - `bitset`: 32-wide boolean set used as the per-tick ran mask.
//! - `fixed_queue`: ring FIFO with overwrite-oldest push.
//! - `fixed_vec`: stack-allocated vector with erase and descending sort.

pub mod bitset;
pub mod fixed_queue;
pub mod fixed_vec;

pub use bitset::BitSet32;
pub use fixed_queue::FixedQueue;
pub use fixed_vec::FixedVec;
