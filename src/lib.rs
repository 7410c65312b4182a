//! bounded_bitset — fixed-capacity integer sets over `[0, size)`.
//!
//! - Packed `u64` storage, bounds-checked `add` / `remove` / `contains`.
//! - `union` / `intersection` / `difference` return new sets; operands are never touched.
//! - Errors are values: out-of-range elements and size mismatches come back as [`BitSetError`].

mod bitset;
pub mod shell;

pub use bitset::{BitSet, BitSetError, Iter};
pub use shell::{Shell, ShellConfig, ShellError};
