//! kilnc-util - Foundation Types for the Kiln Compiler
//!
//! This crate provides the small set of building blocks every other phase
//! of the compiler depends on:
//!
//! - [`span`]: source locations ([`Span`], [`FileId`])
//! - [`symbol`]: interned identifier strings ([`Symbol`])
//! - [`index_vec`]: typed-index vectors ([`IndexVec`], [`Idx`]) used for
//!   the arena-style graphs in the checker (types, entities, scopes)
//! - [`diagnostic`]: error and warning reporting ([`Handler`],
//!   [`Diagnostic`], [`DiagnosticBuilder`])
//!
//! Everything here is deliberately dependency-light and free of any
//! language semantics; the crates that sit on top (`kilnc-ast`,
//! `kilnc-sem`) define what the program *means*.

pub mod diagnostic;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, DiagnosticBuilder, DiagnosticCode, Handler, Level};
pub use index_vec::{Idx, IndexVec};
pub use span::{FileId, Span};
pub use symbol::Symbol;

// Fast, non-cryptographic hash maps used throughout the compiler.
pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;
