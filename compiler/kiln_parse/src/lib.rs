//! Recursive descent parser for Kiln.
//!
//! Parsing, syntax rule expansion and compile-time evaluation are one
//! process: a matched rule redirects the token cursor into its body, a
//! static call runs the evaluator, and the evaluator may parse a
//! deferred function body on first use. All of it hangs off [`Parser`],
//! split by concern across the `grammar`, `syntax` and `eval` modules.
//!
//! Fatal diagnostics propagate as `Err(Fatal)`; the top-level loop stops
//! at the first one and returns everything parsed so far together with
//! the diagnostics, marked critical.

mod ast;
mod config;
mod context;
mod cursor;
mod error;
mod eval;
mod grammar;
mod module;
mod snapshot;
pub mod stack;
mod symbols;
mod syntax;
mod value;

pub use ast::{BinaryOp, Callee, Expr, ExprKind, Stmt, StmtKind, UnaryOp, VarRef};
pub use config::ParserConfig;
pub use context::ParseContext;
pub use cursor::{CursorDepthError, CursorSnapshot, DeferredRange, StateKind, TokenCursor};
pub use eval::{fold_binary, fold_unary, Builtin, FoldError};
pub use module::{Module, ModuleComposite, ModuleFunction, ModuleTypedata, ModuleVariable};
pub use symbols::{
    Binding, BodyId, CompId, Composite, Entry, EntryId, Function, FunctionBody, FunctionId,
    Member, RuleId, Scopes, SymbolKind, SymbolTables, SyntaxRule, Table, TableError, Typedata,
    TypedataId, VarId, Variable,
};
pub use syntax::SyntaxNode;
pub use value::Value;

use kiln_diagnostic::{Diagnostic, DiagnosticSink, Fatal};
use kiln_ir::{Name, Span, Token, TokenKind, TokenList};
use kiln_types::Type;

use crate::syntax::ExpansionFrame;

/// Result of a parser step; `Err` means a fatal diagnostic was recorded.
pub(crate) type PResult<T> = Result<T, Fatal>;

/// Non-local exit requested by a parse-time construct.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum StaticFlow {
    /// `break` inside an unrolled loop.
    Break,
    /// `continue` inside an unrolled loop.
    Continue,
    /// `return` ending a syntax body.
    Return,
}

/// Output of a parse.
#[derive(Debug)]
pub struct ParseOutput {
    /// Top-level statements, possibly partial when `critical`.
    pub statements: Vec<Stmt>,
    pub tables: SymbolTables,
    pub diagnostics: Vec<Diagnostic>,
    /// A fatal diagnostic aborted the parse.
    pub critical: bool,
}

impl ParseOutput {
    /// Whether any fatal diagnostic was reported.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.fatal)
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    /// Hand the result to code generation. A critical parse yields
    /// nothing: its tree is not valid.
    pub fn into_module(self) -> Option<Module> {
        if self.critical {
            return None;
        }
        Some(Module::export(self.statements, &self.tables))
    }
}

/// Parse a whole token list.
pub fn parse(tokens: TokenList, config: ParserConfig) -> ParseOutput {
    Parser::new(tokens, config).parse_program()
}

/// Parser state.
pub struct Parser {
    cursor: TokenCursor,
    tables: SymbolTables,
    sink: DiagnosticSink,
    config: ParserConfig,
    context: ParseContext,
    /// Current lexical body; `None` at top level.
    body: Option<BodyId>,
    /// Return type of the function whose body is being parsed.
    fn_ret: Option<Type>,
    /// Active syntax rule expansions, innermost last.
    expansions: Vec<ExpansionFrame>,
    /// Statements produced while parsing an expression, to be placed
    /// before the statement that contains it.
    pending_stmts: Vec<Stmt>,
    /// Token runs from `insert`, entered after the current statement.
    pending_splices: Vec<DeferredRange>,
    static_flow: Option<StaticFlow>,
    /// Value of a `return` that ended a syntax body.
    expansion_value: Option<Expr>,
    /// Nesting of static calls being evaluated.
    eval_depth: usize,
}

impl Parser {
    /// Create a parser over `tokens`.
    pub fn new(tokens: TokenList, config: ParserConfig) -> Self {
        Parser {
            cursor: TokenCursor::new(tokens.into_vec(), config.max_cursor_depth),
            tables: SymbolTables::new(config.entry_limit),
            sink: DiagnosticSink::new(),
            config,
            context: ParseContext::new(),
            body: None,
            fn_ret: None,
            expansions: Vec::new(),
            pending_stmts: Vec::new(),
            pending_splices: Vec::new(),
            static_flow: None,
            expansion_value: None,
            eval_depth: 0,
        }
    }

    /// Parse every top-level statement.
    ///
    /// Stops at the first fatal diagnostic; the statements parsed before
    /// it are kept for reporting.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn parse_program(mut self) -> ParseOutput {
        let mut statements = Vec::new();
        let result = self
            .register_builtin_types()
            .and_then(|()| self.parse_top_level(&mut statements));
        let critical = result.is_err() || self.sink.is_critical();
        ParseOutput {
            statements,
            tables: self.tables,
            diagnostics: self.sink.into_diagnostics(),
            critical,
        }
    }

    fn register_builtin_types(&mut self) -> PResult<()> {
        for builtin in [kiln_types::TOKEN_TYPEDATA, kiln_types::STATEMENT_TYPEDATA] {
            let typedata = Typedata {
                name: Name::new(builtin, Span::DUMMY),
                members: Vec::new(),
            };
            self.tables
                .define_typedata(typedata, None)
                .map_err(|err| self.table_error(err, Span::DUMMY))?;
        }
        Ok(())
    }

    // Cursor delegation.

    #[inline]
    fn current(&self) -> &Token {
        self.cursor.current()
    }

    #[inline]
    fn current_kind(&self) -> TokenKind {
        self.cursor.current_kind()
    }

    #[inline]
    fn current_span(&self) -> Span {
        self.cursor.current_span()
    }

    #[inline]
    fn previous_span(&self) -> Span {
        self.cursor.previous_span()
    }

    #[inline]
    fn peek_kind(&self, k: usize) -> TokenKind {
        self.cursor.peek(k).kind
    }

    #[inline]
    fn check(&self, kind: TokenKind) -> bool {
        self.cursor.current_kind() == kind
    }

    #[inline]
    fn at_eof(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    #[inline]
    fn advance(&mut self) -> Token {
        self.cursor.advance()
    }

    /// Consume the current token if it has kind `kind`.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.expected(&kind.describe()))
        }
    }

    fn expect_word(&mut self) -> PResult<Name> {
        let token = self.current().clone();
        match Name::from_token(&token) {
            Some(name) => {
                self.advance();
                Ok(name)
            }
            None => Err(self.expected("an identifier")),
        }
    }
}

#[cfg(test)]
mod tests;
