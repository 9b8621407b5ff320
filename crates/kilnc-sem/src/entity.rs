//! Entities: the named things a program declares.
//!
//! An entity is created the first time the checker sees its declaration,
//! registered into the declaring scope, and mutated exactly once when its
//! initializer resolves (type assigned, constant value installed). The
//! `visited` flag in the shared header is the cycle breaker: it is set
//! *before* the initializer is checked so a recursive reference finds an
//! in-flight entity and collapses to `Invalid` instead of recursing.

use crate::scope::ScopeId;
use crate::types::TypeId;
use crate::value::ConstValue;
use kilnc_util::{define_idx, IndexVec, Span, Symbol};

define_idx!(
    /// Index of an entity in the checker's entity arena.
    EntityId
);

/// Arena of all entities in the compilation.
pub type EntityArena = IndexVec<EntityId, Entity>;

/// A declared program object.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Declared name.
    pub name: Symbol,
    /// Position of the declaring identifier.
    pub span: Span,
    /// Scope the entity was declared in.
    pub scope: ScopeId,
    /// Resolved type; `None` until the declaration has been checked.
    pub ty: Option<TypeId>,
    /// Set before the initializer is checked; breaks declaration cycles.
    pub visited: bool,
    pub kind: EntityKind,
}

/// What kind of thing an entity names.
#[derive(Debug, Clone)]
pub enum EntityKind {
    Variable {
        /// Whether any expression has read the variable.
        used: bool,
    },
    Constant {
        value: ConstValue,
    },
    TypeName,
    Procedure,
    /// Placeholder for `_` slots and parse-recovery.
    Dummy,
}

impl Entity {
    fn new(scope: ScopeId, name: Symbol, span: Span, ty: Option<TypeId>, kind: EntityKind) -> Self {
        Self {
            name,
            span,
            scope,
            ty,
            visited: false,
            kind,
        }
    }

    pub fn variable(scope: ScopeId, name: Symbol, span: Span, ty: Option<TypeId>) -> Self {
        Self::new(scope, name, span, ty, EntityKind::Variable { used: false })
    }

    pub fn constant(scope: ScopeId, name: Symbol, span: Span, value: ConstValue) -> Self {
        Self::new(scope, name, span, None, EntityKind::Constant { value })
    }

    pub fn type_name(scope: ScopeId, name: Symbol, span: Span) -> Self {
        Self::new(scope, name, span, None, EntityKind::TypeName)
    }

    pub fn procedure(scope: ScopeId, name: Symbol, span: Span) -> Self {
        Self::new(scope, name, span, None, EntityKind::Procedure)
    }

    /// A throwaway variable entity for `_` slots and recovered parses.
    pub fn dummy_variable(scope: ScopeId, span: Span) -> Self {
        Self::new(
            scope,
            kilnc_util::symbol::SYM_UNDERSCORE,
            span,
            None,
            EntityKind::Dummy,
        )
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.kind, EntityKind::Variable { .. })
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.kind, EntityKind::Constant { .. })
    }

    /// The recorded constant value, if this is a constant entity.
    pub fn constant_value(&self) -> Option<&ConstValue> {
        match &self.kind {
            EntityKind::Constant { value } => Some(value),
            _ => None,
        }
    }
}
