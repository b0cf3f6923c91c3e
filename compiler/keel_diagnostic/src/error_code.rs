//! Stable codes for every diagnostic the lowering engine can emit.

use std::fmt;

/// Diagnostic codes.
///
/// Format: `E####` for fatal errors, `W####` for unsupported-construct
/// warnings. The first digit names the phase:
/// - 1: naming and mangling
/// - 2: declaration lowering
/// - 3: expression lowering
/// - 4: placeholders (warnings)
/// - 9: internal invariant violations
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum ErrorCode {
    /// Anonymous declaration is not a member of its own scope
    E1001,
    /// Bit-field members have no layout term
    E2001,
    /// Base class specifier does not name a record
    E2002,
    /// Instantiation argument is not a type
    E2003,
    /// Linkage specification reached declaration lowering
    E2004,
    /// Declaration is missing a part its kind requires
    E2005,
    /// `new` expression without an allocation function
    E3001,
    /// `delete` expression without a deallocation function
    E3002,
    /// Destroying `operator delete`
    E3003,
    /// Temporary with extended lifetime
    E3004,
    /// Type trait other than size or alignment
    E3005,
    /// `offsetof` with a component other than a single field
    E3006,
    /// Shared subexpression bound twice
    E3007,
    /// Expression node violates its structural contract
    E3008,
    /// Unsupported expression or statement
    W4001,
    /// Unsupported cast kind
    W4002,
    /// Virtual base emitted with a placeholder offset
    W4003,
    /// Pointer-to-member call
    W4004,
    /// Anonymous entity named by a placeholder
    W4005,
    /// Unsupported type
    W4006,
    /// Unsupported operator
    W4007,
    /// Host mangler could not name a declaration
    W4008,
    /// Binder nesting depth not restored after an expression
    E9001,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E3006 => "E3006",
            ErrorCode::E3007 => "E3007",
            ErrorCode::E3008 => "E3008",
            ErrorCode::W4001 => "W4001",
            ErrorCode::W4002 => "W4002",
            ErrorCode::W4003 => "W4003",
            ErrorCode::W4004 => "W4004",
            ErrorCode::W4005 => "W4005",
            ErrorCode::W4006 => "W4006",
            ErrorCode::W4007 => "W4007",
            ErrorCode::W4008 => "W4008",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Warnings mark placeholders; everything else aborts lowering.
    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with('W')
    }

    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "anonymous declaration not found in its own scope",
            ErrorCode::E2001 => "bit-fields are not supported",
            ErrorCode::E2002 => "base class is not a record type",
            ErrorCode::E2003 => "only type arguments are supported in instantiations",
            ErrorCode::E2004 => "linkage specifications must be flattened before lowering",
            ErrorCode::E2005 => "declaration is missing a required part",
            ErrorCode::E3001 => "new expression without operator new",
            ErrorCode::E3002 => "delete expression without operator delete",
            ErrorCode::E3003 => "destroying operator delete is not supported",
            ErrorCode::E3004 => "lifetime-extended temporaries are not supported",
            ErrorCode::E3005 => "unsupported type trait",
            ErrorCode::E3006 => "offsetof supports only a single field",
            ErrorCode::E3007 => "shared subexpression bound twice",
            ErrorCode::E3008 => "malformed expression",
            ErrorCode::W4001 => "unsupported construct",
            ErrorCode::W4002 => "unsupported cast",
            ErrorCode::W4003 => "virtual base offset unknown",
            ErrorCode::W4004 => "pointer-to-member call",
            ErrorCode::W4005 => "anonymous entity has no stable name",
            ErrorCode::W4006 => "unsupported type",
            ErrorCode::W4007 => "unsupported operator",
            ErrorCode::W4008 => "declaration cannot be mangled",
            ErrorCode::E9001 => "binder nesting imbalance",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
