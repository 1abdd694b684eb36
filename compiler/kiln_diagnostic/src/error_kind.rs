use std::fmt;

/// Kind of a front-end diagnostic.
///
/// Codes are stable and grouped by phase:
/// - E0xxx: tokenizer errors
/// - E1xxx: parser and syntax errors
/// - E2xxx: type errors
/// - E3xxx: macro expansion and compile-time evaluation errors
/// - E9xxx: resource exhaustion
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorKind {
    // Tokenizer (E0xxx)
    /// Unrecognized character, bad literal or escape
    InvalidToken,

    // Parser (E1xxx)
    /// A specific token was required
    ExpectedToken,
    /// A type was required
    ExpectedTypeSpecifier,
    /// Statement form not recognized
    UnknownStatement,
    /// Expression form not recognized
    UnknownExpression,
    /// Name already declared in the same body
    Redefinition,

    // Types and resolution (E2xxx)
    /// Value type not castable to the expected type
    IncorrectType,
    /// Operand must be an addressable variable
    MustBeVariable,
    /// Value must be known at compile time
    MustBeStatic,
    /// Call arity or argument mismatch
    WrongArguments,
    /// No member with that name
    UnknownMember,
    /// No function with that name in scope
    UnknownFunction,
    /// No variable with that name in scope
    UnknownVariable,
    /// No type with that name in scope
    UnknownType,

    // Macros and evaluation (E3xxx)
    /// No syntax rule matches the consumed nodes
    UnknownSyntax,
    /// Macro expansion nested too deeply
    MaxMacroDepth,
    /// Raised by the `error()` built-in
    UserError,
    /// Static division or remainder by zero
    DivisionByZero,
    /// Static evaluation recursed or looped too deeply
    RecursionLimit,

    // Resources (E9xxx)
    /// A growth point could not allocate
    OutOfMemory,
}

impl ErrorKind {
    /// Stable error code.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidToken => "E0001",
            ErrorKind::ExpectedToken => "E1001",
            ErrorKind::ExpectedTypeSpecifier => "E1002",
            ErrorKind::UnknownStatement => "E1003",
            ErrorKind::UnknownExpression => "E1004",
            ErrorKind::Redefinition => "E1005",
            ErrorKind::IncorrectType => "E2001",
            ErrorKind::MustBeVariable => "E2002",
            ErrorKind::MustBeStatic => "E2003",
            ErrorKind::WrongArguments => "E2004",
            ErrorKind::UnknownMember => "E2005",
            ErrorKind::UnknownFunction => "E2006",
            ErrorKind::UnknownVariable => "E2007",
            ErrorKind::UnknownType => "E2008",
            ErrorKind::UnknownSyntax => "E3001",
            ErrorKind::MaxMacroDepth => "E3002",
            ErrorKind::UserError => "E3003",
            ErrorKind::DivisionByZero => "E3004",
            ErrorKind::RecursionLimit => "E3005",
            ErrorKind::OutOfMemory => "E9001",
        }
    }

    /// Default classification: only redefinitions let parsing continue.
    pub fn is_fatal(self) -> bool {
        !matches!(self, ErrorKind::Redefinition)
    }

    /// Hard kinds are never discarded by a speculative parse attempt.
    ///
    /// They signal exhaustion or an explicit user abort, which no
    /// alternative parse path can recover from.
    pub fn is_hard(self) -> bool {
        matches!(
            self,
            ErrorKind::OutOfMemory
                | ErrorKind::MaxMacroDepth
                | ErrorKind::RecursionLimit
                | ErrorKind::UserError
        )
    }

    /// Short description used as the default message.
    pub fn description(self) -> &'static str {
        match self {
            ErrorKind::InvalidToken => "invalid token",
            ErrorKind::ExpectedToken => "expected token",
            ErrorKind::ExpectedTypeSpecifier => "expected type specifier",
            ErrorKind::UnknownStatement => "unknown statement",
            ErrorKind::UnknownExpression => "unknown expression",
            ErrorKind::Redefinition => "redefinition",
            ErrorKind::IncorrectType => "incorrect type",
            ErrorKind::MustBeVariable => "must be a variable",
            ErrorKind::MustBeStatic => "must be static",
            ErrorKind::WrongArguments => "wrong arguments",
            ErrorKind::UnknownMember => "unknown member",
            ErrorKind::UnknownFunction => "unknown function",
            ErrorKind::UnknownVariable => "unknown variable",
            ErrorKind::UnknownType => "unknown type",
            ErrorKind::UnknownSyntax => "unknown syntax",
            ErrorKind::MaxMacroDepth => "maximum macro depth exceeded",
            ErrorKind::UserError => "user error",
            ErrorKind::DivisionByZero => "division by zero",
            ErrorKind::RecursionLimit => "recursion limit exceeded",
            ErrorKind::OutOfMemory => "out of memory",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
