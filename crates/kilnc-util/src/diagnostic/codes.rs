//! Stable codes for the checker's diagnostic families.
//!
//! Codes let tooling match on a diagnostic without parsing its message.
//! The families mirror how the checker classifies user errors: type
//! mismatches, arity mismatches, l-value violations, category errors
//! (expression used as statement and the like), malformed declarations,
//! and control-flow rules.

use std::fmt;

/// A machine-readable diagnostic code: a number plus a stable slug.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DiagnosticCode {
    /// Numeric code, rendered as `E3001`.
    pub number: u16,
    /// Stable identifier, e.g. `type_mismatch`.
    pub name: &'static str,
}

impl DiagnosticCode {
    /// Create a code from its parts.
    pub const fn new(number: u16, name: &'static str) -> Self {
        Self { number, name }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.number)
    }
}

/// A value cannot flow into a slot of the target type.
pub const E_TYPE_MISMATCH: DiagnosticCode = DiagnosticCode::new(3001, "type_mismatch");
/// Wrong number of values in a declaration, return, or assignment.
pub const E_ARITY_MISMATCH: DiagnosticCode = DiagnosticCode::new(3002, "arity_mismatch");
/// Assignment target is not an addressable variable.
pub const E_NOT_LVALUE: DiagnosticCode = DiagnosticCode::new(3003, "not_lvalue");
/// A construct used in the wrong syntactic category.
pub const E_BAD_CATEGORY: DiagnosticCode = DiagnosticCode::new(3004, "bad_category");
/// A declaration is malformed (cycles, missing parts, bad tags).
pub const E_DECLARATION: DiagnosticCode = DiagnosticCode::new(3005, "bad_declaration");
/// A control-flow rule is violated (returns, defers).
pub const E_CONTROL_FLOW: DiagnosticCode = DiagnosticCode::new(3006, "control_flow");
/// An identifier does not resolve to anything in scope.
pub const E_UNDECLARED_NAME: DiagnosticCode = DiagnosticCode::new(3007, "undeclared_name");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_display() {
        assert_eq!(format!("{E_TYPE_MISMATCH}"), "E3001");
        assert_eq!(format!("{E_UNDECLARED_NAME}"), "E3007");
    }

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            E_TYPE_MISMATCH,
            E_ARITY_MISMATCH,
            E_NOT_LVALUE,
            E_BAD_CATEGORY,
            E_DECLARATION,
            E_CONTROL_FLOW,
            E_UNDECLARED_NAME,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a.number, b.number);
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn test_custom_code() {
        let code = DiagnosticCode::new(9999, "custom");
        assert_eq!(code.number, 9999);
        assert_eq!(code.name, "custom");
    }
}
