//! kilnc-sem - Statement & Declaration Checker
//!
//! The semantic phase of the Kiln front-end. Given a parsed
//! [`File`](kilnc_ast::File) and a diagnostics
//! [`Handler`](kilnc_util::Handler), the checker validates every statement
//! and declaration, assigns types to expressions and entities, enforces
//! assignability between the language's type fragments (named vs unnamed,
//! typed vs untyped, pointers vs `rawptr`, arrays vs slices), destructures
//! multi-value results, and verifies that procedures with results always
//! return.
//!
//! # Shape of the pass
//!
//! One mutable [`Checker`] drives a depth-first walk. Expressions produce
//! transient [`Operand`]s; declarations produce [`Entity`]s living in an
//! arena; types live in a [`TypeArena`] as an index-based graph. User
//! errors become diagnostics and demote the offending operand or entity
//! to the `Invalid` sentinel so dependents stay quiet; only internal
//! invariant violations panic.
//!
//! # Entry points
//!
//! - [`Checker::check_file`] — collect top-level declarations, resolve
//!   every entity, drain deferred procedure bodies.
//! - [`Checker::check_statement`] / [`Checker::check_statement_list`] —
//!   the statement dispatcher.
//! - [`Checker::check_entity_declaration`] — resolve one entity on
//!   demand (also used by identifier resolution).
//! - [`Checker::check_procedure_body`] — check a body in its parameter
//!   scope and enforce the trailing-return rule.
//!
//! ```
//! use kilnc_ast::File;
//! use kilnc_sem::Checker;
//! use kilnc_util::Handler;
//!
//! let file = File { stmts: vec![] };
//! let handler = Handler::new();
//! let mut checker = Checker::new(&handler);
//! checker.check_file(&file);
//! assert!(!handler.has_errors());
//! ```

pub mod checker;
pub mod entity;
mod expr;
pub mod operand;
pub mod scope;
mod stmt;
pub mod types;
pub mod value;

mod edge_cases;

pub use checker::{Checker, DeclId, DeclInfo};
pub use entity::{Entity, EntityArena, EntityId, EntityKind};
pub use expr::ExprKind;
pub use operand::{AddressingMode, Operand};
pub use scope::{Scope, ScopeArena, ScopeId};
pub use stmt::{is_terminating, is_terminating_list};
pub use types::{BasicKind, TypeArena, TypeId, TypeKind};
pub use value::{ConstValue, EvalError};
