//! Operands: the transient judgment for each checked expression.
//!
//! Every expression check produces an [`Operand`] describing what the
//! expression *is* (its addressing mode), its type, the constant value if
//! it has one, and a back-pointer to the AST node for diagnostics.
//! Operands are stack-local and die at the end of the statement that
//! produced them.
//!
//! An `Invalid` operand means an error was already reported somewhere in
//! the subtree; every downstream check detects it and returns without a
//! diagnostic, so the user sees one message per root cause.

use crate::types::TypeId;
use crate::value::ConstValue;
use kilnc_ast::Expr;
use kilnc_util::Span;

/// Classification of an expression's result, driving which operations are
/// legal on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressingMode {
    /// Error recovery; short-circuits all downstream checks silently.
    Invalid,
    /// A call with no results; usable only as a statement.
    NoValue,
    /// An ordinary r-value.
    Value,
    /// A mutable, addressable location.
    Variable,
    /// A compile-time constant carrying a value.
    Constant,
    /// A type used in expression position.
    Type,
}

/// The result of checking one expression.
#[derive(Clone, Debug)]
pub struct Operand<'ast> {
    pub mode: AddressingMode,
    pub ty: TypeId,
    /// The expression this operand came from, for diagnostics.
    pub expr: Option<&'ast Expr>,
    /// Value when `mode` is `Constant`.
    pub value: ConstValue,
}

impl<'ast> Operand<'ast> {
    /// The error operand.
    pub fn invalid() -> Self {
        Self {
            mode: AddressingMode::Invalid,
            ty: TypeId::INVALID,
            expr: None,
            value: ConstValue::Invalid,
        }
    }

    pub fn is_invalid(&self) -> bool {
        self.mode == AddressingMode::Invalid
    }

    /// Demote to the error operand, keeping the expression back-pointer.
    pub fn invalidate(&mut self) {
        self.mode = AddressingMode::Invalid;
        self.ty = TypeId::INVALID;
        self.value = ConstValue::Invalid;
    }

    /// Source location for diagnostics about this operand.
    pub fn span(&self) -> Span {
        self.expr.map(Expr::span).unwrap_or(Span::DUMMY)
    }

    /// The expression quoted into diagnostics.
    pub fn expr_string(&self) -> String {
        match self.expr {
            Some(expr) => expr.to_string(),
            None => String::from("<expression>"),
        }
    }
}
