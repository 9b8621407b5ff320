//! The semantic type graph.
//!
//! Types live in a single [`TypeArena`] and reference each other through
//! [`TypeId`] indices, never through owning pointers. That makes
//! self-referential named types (`type Node = *Node` through a pointer)
//! plain data: the named type is allocated first, its entity points at it,
//! and the base index is patched in once the right-hand side resolves.
//!
//! The arena is seeded with one node per [`BasicKind`] plus the shared
//! `Invalid` sentinel at index 0, so basic types and `Invalid` are
//! referentially unique: comparing their ids *is* comparing the types.

use crate::entity::{Entity, EntityId};
use crate::scope::ScopeId;
use kilnc_util::{define_idx, IndexVec, Symbol};

define_idx!(
    /// Index of a type in the [`TypeArena`].
    TypeId
);

impl TypeId {
    /// The shared invalid-type sentinel.
    ///
    /// Anything that sees this id returns early instead of piling further
    /// diagnostics on top of an already-reported problem.
    pub const INVALID: TypeId = TypeId(0);
}

/// The basic (non-composite) types, including the untyped constant kinds.
///
/// Untyped kinds are distinct variants, not concrete types plus a flag:
/// an untyped operand carries a value awaiting a target type and is
/// lowered by conversion or by the default-type rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Int,
    U8,
    U16,
    U32,
    U64,
    Uint,
    F32,
    F64,
    Str,
    Rune,
    Rawptr,
    UntypedBool,
    UntypedInteger,
    UntypedFloat,
    UntypedString,
    UntypedRune,
    UntypedNil,
}

impl BasicKind {
    /// Every kind, in arena seeding order. The position of a kind here
    /// fixes its `TypeId` (offset by one for the `Invalid` slot).
    pub const ALL: &'static [BasicKind] = &[
        BasicKind::Bool,
        BasicKind::I8,
        BasicKind::I16,
        BasicKind::I32,
        BasicKind::I64,
        BasicKind::Int,
        BasicKind::U8,
        BasicKind::U16,
        BasicKind::U32,
        BasicKind::U64,
        BasicKind::Uint,
        BasicKind::F32,
        BasicKind::F64,
        BasicKind::Str,
        BasicKind::Rune,
        BasicKind::Rawptr,
        BasicKind::UntypedBool,
        BasicKind::UntypedInteger,
        BasicKind::UntypedFloat,
        BasicKind::UntypedString,
        BasicKind::UntypedRune,
        BasicKind::UntypedNil,
    ];

    /// The name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::I8 => "i8",
            BasicKind::I16 => "i16",
            BasicKind::I32 => "i32",
            BasicKind::I64 => "i64",
            BasicKind::Int => "int",
            BasicKind::U8 => "u8",
            BasicKind::U16 => "u16",
            BasicKind::U32 => "u32",
            BasicKind::U64 => "u64",
            BasicKind::Uint => "uint",
            BasicKind::F32 => "f32",
            BasicKind::F64 => "f64",
            BasicKind::Str => "string",
            BasicKind::Rune => "rune",
            BasicKind::Rawptr => "rawptr",
            BasicKind::UntypedBool => "untyped bool",
            BasicKind::UntypedInteger => "untyped int",
            BasicKind::UntypedFloat => "untyped float",
            BasicKind::UntypedString => "untyped string",
            BasicKind::UntypedRune => "untyped rune",
            BasicKind::UntypedNil => "untyped nil",
        }
    }

    /// Resolve a source-level type name to a concrete basic kind.
    ///
    /// Untyped kinds have no surface syntax and are never returned.
    pub fn from_name(name: &str) -> Option<BasicKind> {
        Some(match name {
            "bool" => BasicKind::Bool,
            "i8" => BasicKind::I8,
            "i16" => BasicKind::I16,
            "i32" => BasicKind::I32,
            "i64" => BasicKind::I64,
            "int" => BasicKind::Int,
            "u8" => BasicKind::U8,
            "u16" => BasicKind::U16,
            "u32" => BasicKind::U32,
            "u64" => BasicKind::U64,
            "uint" => BasicKind::Uint,
            "f32" => BasicKind::F32,
            "f64" => BasicKind::F64,
            "string" => BasicKind::Str,
            "rune" => BasicKind::Rune,
            "rawptr" => BasicKind::Rawptr,
            _ => return None,
        })
    }

    /// True for the untyped constant kinds.
    pub fn is_untyped(self) -> bool {
        matches!(
            self,
            BasicKind::UntypedBool
                | BasicKind::UntypedInteger
                | BasicKind::UntypedFloat
                | BasicKind::UntypedString
                | BasicKind::UntypedRune
                | BasicKind::UntypedNil
        )
    }

    /// True for integer kinds, typed and untyped.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            BasicKind::I8
                | BasicKind::I16
                | BasicKind::I32
                | BasicKind::I64
                | BasicKind::Int
                | BasicKind::U8
                | BasicKind::U16
                | BasicKind::U32
                | BasicKind::U64
                | BasicKind::Uint
                | BasicKind::UntypedInteger
        )
    }

    /// True for unsigned integer kinds.
    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            BasicKind::U8 | BasicKind::U16 | BasicKind::U32 | BasicKind::U64 | BasicKind::Uint
        )
    }

    /// True for floating-point kinds, typed and untyped.
    pub fn is_float(self) -> bool {
        matches!(
            self,
            BasicKind::F32 | BasicKind::F64 | BasicKind::UntypedFloat
        )
    }

    /// True for kinds that participate in arithmetic.
    pub fn is_numeric(self) -> bool {
        self.is_integer()
            || self.is_float()
            || matches!(self, BasicKind::Rune | BasicKind::UntypedRune)
    }

    /// True for boolean kinds.
    pub fn is_boolean(self) -> bool {
        matches!(self, BasicKind::Bool | BasicKind::UntypedBool)
    }

    /// The concrete kind an untyped operand falls back to when no target
    /// type directs it. `UntypedNil` has no default; using it without a
    /// pointer target is an error at the call site.
    pub fn default_kind(self) -> Option<BasicKind> {
        Some(match self {
            BasicKind::UntypedBool => BasicKind::Bool,
            BasicKind::UntypedInteger => BasicKind::Int,
            BasicKind::UntypedFloat => BasicKind::F64,
            BasicKind::UntypedString => BasicKind::Str,
            BasicKind::UntypedRune => BasicKind::Rune,
            BasicKind::UntypedNil => return None,
            concrete => concrete,
        })
    }
}

/// A type constructor node in the arena.
#[derive(Clone, Debug)]
pub enum TypeKind {
    /// Sentinel for recovered errors; unique at [`TypeId::INVALID`].
    Invalid,
    Basic(BasicKind),
    Pointer {
        elem: TypeId,
    },
    Array {
        elem: TypeId,
        count: i64,
    },
    Slice {
        elem: TypeId,
    },
    /// Multi-value result of a procedure. Tuples never nest and are not a
    /// first-class user type.
    Tuple {
        variables: Vec<EntityId>,
    },
    Proc {
        scope: ScopeId,
        params: Option<TypeId>,
        results: Option<TypeId>,
    },
    /// A user declaration wrapping a base type. The base is patched after
    /// the right-hand side resolves, which is what permits recursion
    /// through pointer or slice indirection.
    Named {
        name: Symbol,
        base: TypeId,
        type_name: EntityId,
    },
}

/// Owner of every type node for the compilation.
///
/// Types are allocated for the compilation lifetime and never freed
/// individually.
pub struct TypeArena {
    kinds: IndexVec<TypeId, TypeKind>,
}

impl TypeArena {
    /// Create an arena seeded with `Invalid` and the basic types.
    pub fn new() -> Self {
        let mut kinds = IndexVec::with_capacity(1 + BasicKind::ALL.len());
        kinds.push(TypeKind::Invalid);
        for &kind in BasicKind::ALL {
            kinds.push(TypeKind::Basic(kind));
        }
        Self { kinds }
    }

    /// The shared node for a basic kind.
    pub fn basic(&self, kind: BasicKind) -> TypeId {
        let position = BasicKind::ALL
            .iter()
            .position(|&k| k == kind)
            .unwrap_or_default();
        TypeId(1 + position as u32)
    }

    /// The constructor of `id`.
    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.kinds[id]
    }

    pub fn pointer_to(&mut self, elem: TypeId) -> TypeId {
        self.kinds.push(TypeKind::Pointer { elem })
    }

    pub fn array_of(&mut self, elem: TypeId, count: i64) -> TypeId {
        self.kinds.push(TypeKind::Array { elem, count })
    }

    pub fn slice_of(&mut self, elem: TypeId) -> TypeId {
        self.kinds.push(TypeKind::Slice { elem })
    }

    pub fn tuple(&mut self, variables: Vec<EntityId>) -> TypeId {
        self.kinds.push(TypeKind::Tuple { variables })
    }

    /// Allocate an empty procedure type shell; the signature is filled in
    /// by `set_proc_signature` once params and results resolve. Installing
    /// the shell on the entity first is what allows recursive calls.
    pub fn procedure(&mut self, scope: ScopeId) -> TypeId {
        self.kinds.push(TypeKind::Proc {
            scope,
            params: None,
            results: None,
        })
    }

    pub fn set_proc_signature(
        &mut self,
        proc_ty: TypeId,
        params: Option<TypeId>,
        results: Option<TypeId>,
    ) {
        if let TypeKind::Proc {
            params: p,
            results: r,
            ..
        } = &mut self.kinds[proc_ty]
        {
            *p = params;
            *r = results;
        }
    }

    /// Allocate a named type with an unresolved base.
    pub fn named(&mut self, name: Symbol, type_name: EntityId) -> TypeId {
        self.kinds.push(TypeKind::Named {
            name,
            base: TypeId::INVALID,
            type_name,
        })
    }

    pub fn set_named_base(&mut self, named: TypeId, new_base: TypeId) {
        if let TypeKind::Named { base, .. } = &mut self.kinds[named] {
            *base = new_base;
        }
    }

    /// Unwrap every `Named` layer.
    ///
    /// A named type whose base is still unresolved unwraps to `Invalid`;
    /// that happens only while its own declaration is being checked.
    pub fn base_type(&self, id: TypeId) -> TypeId {
        let mut current = id;
        while let TypeKind::Named { base, .. } = self.kinds[current] {
            if base == current {
                return TypeId::INVALID;
            }
            current = base;
        }
        current
    }

    /// The basic kind of `id` without unwrapping named layers.
    pub fn as_basic(&self, id: TypeId) -> Option<BasicKind> {
        match self.kinds[id] {
            TypeKind::Basic(kind) => Some(kind),
            _ => None,
        }
    }

    /// The basic kind of the base of `id`.
    pub fn base_basic(&self, id: TypeId) -> Option<BasicKind> {
        self.as_basic(self.base_type(id))
    }

    pub fn is_untyped(&self, id: TypeId) -> bool {
        self.as_basic(id).is_some_and(BasicKind::is_untyped)
    }

    pub fn is_boolean(&self, id: TypeId) -> bool {
        self.base_basic(id).is_some_and(BasicKind::is_boolean)
    }

    pub fn is_numeric(&self, id: TypeId) -> bool {
        self.base_basic(id).is_some_and(BasicKind::is_numeric)
    }

    pub fn is_integer(&self, id: TypeId) -> bool {
        self.base_basic(id).is_some_and(BasicKind::is_integer)
    }

    /// True when the base of `id` is a typed pointer (`*T`).
    pub fn is_pointer(&self, id: TypeId) -> bool {
        matches!(self.kinds[self.base_type(id)], TypeKind::Pointer { .. })
    }

    /// True when the base of `id` is the raw pointer type.
    pub fn is_rawptr(&self, id: TypeId) -> bool {
        self.base_basic(id) == Some(BasicKind::Rawptr)
    }

    /// True for user-declared named types. Basic types are unnamed here,
    /// which is what lets `type A = int` exchange values with plain `int`
    /// while staying incompatible with a sibling `type B = int`.
    pub fn is_named(&self, id: TypeId) -> bool {
        matches!(self.kinds[id], TypeKind::Named { .. })
    }

    pub fn is_tuple(&self, id: TypeId) -> bool {
        matches!(self.kinds[id], TypeKind::Tuple { .. })
    }

    /// Types a constant may have: basics and pointers over them.
    pub fn is_constant_type(&self, id: TypeId) -> bool {
        match &self.kinds[self.base_type(id)] {
            TypeKind::Basic(_) => true,
            TypeKind::Pointer { elem } => {
                matches!(self.kinds[self.base_type(*elem)], TypeKind::Basic(_))
            }
            _ => false,
        }
    }

    /// The type an untyped operand materializes to without a target;
    /// `None` for `UntypedNil`, identity for already-typed ids.
    pub fn default_type(&self, id: TypeId) -> Option<TypeId> {
        match self.as_basic(id) {
            Some(kind) if kind.is_untyped() => kind.default_kind().map(|k| self.basic(k)),
            _ => Some(id),
        }
    }

    /// The element count of the results tuple of a procedure type.
    pub fn proc_result_count(&self, proc_ty: TypeId) -> usize {
        match &self.kinds[self.base_type(proc_ty)] {
            TypeKind::Proc {
                results: Some(results),
                ..
            } => match &self.kinds[*results] {
                TypeKind::Tuple { variables } => variables.len(),
                _ => 0,
            },
            _ => 0,
        }
    }

    /// Render `id` for diagnostics: `int`, `untyped bool`, `*T`, `[4]T`,
    /// `[]T`, `(a, b)`, `proc(..) -> (..)`, or a named type's name.
    pub fn display(&self, id: TypeId, entities: &IndexVec<EntityId, Entity>) -> String {
        let mut out = String::new();
        self.write_type(&mut out, id, entities);
        out
    }

    fn write_type(&self, out: &mut String, id: TypeId, entities: &IndexVec<EntityId, Entity>) {
        match &self.kinds[id] {
            TypeKind::Invalid => out.push_str("invalid type"),
            TypeKind::Basic(kind) => out.push_str(kind.name()),
            TypeKind::Pointer { elem } => {
                out.push('*');
                self.write_type(out, *elem, entities);
            }
            TypeKind::Array { elem, count } => {
                out.push_str(&format!("[{count}]"));
                self.write_type(out, *elem, entities);
            }
            TypeKind::Slice { elem } => {
                out.push_str("[]");
                self.write_type(out, *elem, entities);
            }
            TypeKind::Tuple { variables } => {
                out.push('(');
                for (i, &var) in variables.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let ty = entities[var].ty.unwrap_or(TypeId::INVALID);
                    self.write_type(out, ty, entities);
                }
                out.push(')');
            }
            TypeKind::Proc {
                params, results, ..
            } => {
                out.push_str("proc");
                match params {
                    Some(params) => self.write_type(out, *params, entities),
                    None => out.push_str("()"),
                }
                if let Some(results) = results {
                    out.push_str(" -> ");
                    self.write_type(out, *results, entities);
                }
            }
            TypeKind::Named { name, .. } => out.push_str(name.as_str()),
        }
    }
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}
