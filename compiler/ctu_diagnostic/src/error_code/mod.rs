//! Error codes for all tree diagnostics.
//!
//! Each code is a unique identifier (e.g. `E2001`) whose first digit names
//! the family of failure. `W` codes are warnings and never halt a stage on
//! their own.

use std::fmt;

/// Error codes for all tree diagnostics.
///
/// Format: E#### where the first digit indicates the family:
/// - E1xxx: Symbol lookup
/// - E2xxx: Structural cycles
/// - E3xxx: Attribute and declaration misuse
/// - E4xxx: Type mismatches
/// - E5xxx: Control flow
/// - E9xxx: Internal errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lookup Errors (E1xxx)
    /// Symbol or namespace not found
    E1001,
    /// Symbol found through an import but not public
    E1002,
    /// Path segment names a declaration where a namespace was expected
    E1003,
    /// Symbol declared twice in the same scope
    E1004,

    // Cycle Errors (E2xxx)
    /// Cyclic dependency between declarations during resolution
    E2001,
    /// Evaluation of a global may be infinite
    E2002,
    /// Size of an aggregate type may be infinite
    E2003,
    /// Type contains itself through pointers or aliases
    E2004,

    // Attribute Errors (E3xxx)
    /// Multiple entry points of the same kind
    E3001,
    /// Entry point function has no body
    E3002,
    /// Entry point attribute on a non-function
    E3003,
    /// Declaration with an empty name
    E3004,
    /// Global storage of unit or empty type
    E3005,

    // Type Errors (E4xxx)
    /// Return type does not match function return type
    E4001,
    /// Incorrect number of call arguments
    E4002,
    /// Incorrect call argument type
    E4003,
    /// Invalid cast
    E4004,
    /// Invalid binary operation
    E4005,

    // Control Flow Errors (E5xxx)
    /// Function may not return a value
    E5001,

    // Internal Errors (E9xxx)
    /// Internal compiler error
    E9001,
    /// Too many errors
    E9002,

    // Warnings (Wxxx)
    /// Call to deprecated function
    W1001,
    /// Imported declaration has an implementation
    W3001,
    /// Internal linkage with user-defined mangling
    W3002,
}

impl ErrorCode {
    /// All error code variants.
    ///
    /// When adding a new variant: add it to the enum, `as_str()`, and here.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        ErrorCode::E3005,
        ErrorCode::E4001,
        ErrorCode::E4002,
        ErrorCode::E4003,
        ErrorCode::E4004,
        ErrorCode::E4005,
        ErrorCode::E5001,
        ErrorCode::E9001,
        ErrorCode::E9002,
        ErrorCode::W1001,
        ErrorCode::W3001,
        ErrorCode::W3002,
    ];

    /// Short alias for the event, used in logs and documentation.
    pub const SYMBOL_NOT_FOUND: ErrorCode = ErrorCode::E1001;
    pub const SYMBOL_NOT_VISIBLE: ErrorCode = ErrorCode::E1002;
    pub const MALFORMED_TYPE_NAME: ErrorCode = ErrorCode::E1003;
    pub const SYMBOL_SHADOWED: ErrorCode = ErrorCode::E1004;
    pub const CYCLIC_DEPENDENCY: ErrorCode = ErrorCode::E2001;
    pub const RECURSIVE_EVAL: ErrorCode = ErrorCode::E2002;
    pub const INFINITE_SIZED_TYPE: ErrorCode = ErrorCode::E2003;
    pub const INVALID_TYPE: ErrorCode = ErrorCode::E2004;
    pub const MULTIPLE_ENTRY_POINTS: ErrorCode = ErrorCode::E3001;
    pub const ENTRY_MISSING_BODY: ErrorCode = ErrorCode::E3002;
    pub const ENTRY_NOT_FUNCTION: ErrorCode = ErrorCode::E3003;
    pub const INVALID_NAME: ErrorCode = ErrorCode::E3004;
    pub const INVALID_STORAGE: ErrorCode = ErrorCode::E3005;
    pub const RETURN_TYPE_MISMATCH: ErrorCode = ErrorCode::E4001;
    pub const INCORRECT_PARAM_COUNT: ErrorCode = ErrorCode::E4002;
    pub const INCORRECT_PARAM_TYPE: ErrorCode = ErrorCode::E4003;
    pub const INVALID_CAST: ErrorCode = ErrorCode::E4004;
    pub const INVALID_BINARY_OPERATION: ErrorCode = ErrorCode::E4005;
    pub const MAY_NOT_RETURN: ErrorCode = ErrorCode::E5001;
    pub const DEPRECATED: ErrorCode = ErrorCode::W1001;
    pub const IMPORTED_WITH_IMPL: ErrorCode = ErrorCode::W3001;
    pub const IGNORED_MANGLING: ErrorCode = ErrorCode::W3002;

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E4004 => "E4004",
            ErrorCode::E4005 => "E4005",
            ErrorCode::E5001 => "E5001",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
            ErrorCode::W1001 => "W1001",
            ErrorCode::W3001 => "W3001",
            ErrorCode::W3002 => "W3002",
        }
    }

    /// Check if this is a symbol lookup error (E1xxx range).
    pub fn is_lookup_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E1001 | ErrorCode::E1002 | ErrorCode::E1003 | ErrorCode::E1004
        )
    }

    /// Check if this is a structural cycle error (E2xxx range).
    pub fn is_cycle_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E2001 | ErrorCode::E2002 | ErrorCode::E2003 | ErrorCode::E2004
        )
    }

    /// Check if this is an attribute misuse error (E3xxx range).
    pub fn is_attribute_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E3001
                | ErrorCode::E3002
                | ErrorCode::E3003
                | ErrorCode::E3004
                | ErrorCode::E3005
        )
    }

    /// Check if this is a type mismatch error (E4xxx range).
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E4001
                | ErrorCode::E4002
                | ErrorCode::E4003
                | ErrorCode::E4004
                | ErrorCode::E4005
        )
    }

    pub fn is_control_flow_error(&self) -> bool {
        matches!(self, ErrorCode::E5001)
    }

    pub fn is_internal_error(&self) -> bool {
        matches!(self, ErrorCode::E9001 | ErrorCode::E9002)
    }

    /// Check if this is a warning code (Wxxx range).
    pub fn is_warning(&self) -> bool {
        matches!(self, ErrorCode::W1001 | ErrorCode::W3001 | ErrorCode::W3002)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E2001"` or `"W1001"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}
