//! kilnc-ast - Syntax Tree Definitions
//!
//! The node types produced by the Kiln parser and consumed by the checker.
//! This crate is pure data: nodes, spans, and a pretty-printer used to
//! quote expressions back to the user inside diagnostics. Parsing itself
//! lives in its own crate; semantic analysis lives in `kilnc-sem`.
//!
//! Parse errors surface here as `Expr::Bad` / `Stmt::Bad` nodes so that a
//! recovered parse still produces a tree the checker can walk without
//! cascading complaints.

pub mod ast;

pub use ast::*;
