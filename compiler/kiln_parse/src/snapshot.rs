//! Parser snapshots for speculative parsing.
//!
//! A snapshot captures everything a discarded attempt could have
//! changed in the parser itself: the cursor (including nested states),
//! the diagnostic sink position and the pending statement and splice
//! lists. Symbol table entries are NOT rolled back; a discarded attempt
//! that declared something keeps the declaration.
//!
//! - `look_ahead`: token-level predicate, always restored
//! - `speculate`: full parse attempt, restored only on failure
//! - `snapshot` / `rewind`: manual control, used by longest-match search

use kiln_diagnostic::{Diagnostic, SinkMark};

use crate::context::ParseContext;
use crate::cursor::CursorSnapshot;
use crate::symbols::BodyId;
use crate::{PResult, Parser, StaticFlow};

#[derive(Clone, Debug)]
pub(crate) struct ParserSnapshot {
    cursor: CursorSnapshot,
    mark: SinkMark,
    pending_stmts: usize,
    pending_splices: usize,
    static_flow: Option<StaticFlow>,
    context: ParseContext,
    body: Option<BodyId>,
}

impl Parser {
    pub(crate) fn snapshot(&self) -> ParserSnapshot {
        ParserSnapshot {
            cursor: self.cursor.save(),
            mark: self.sink.mark(),
            pending_stmts: self.pending_stmts.len(),
            pending_splices: self.pending_splices.len(),
            static_flow: self.static_flow,
            context: self.context,
            body: self.body,
        }
    }

    /// Return to `snapshot`, dropping diagnostics reported since.
    pub(crate) fn rewind(&mut self, snapshot: ParserSnapshot) {
        self.sink.discard_since(snapshot.mark);
        self.restore_state(snapshot);
    }

    fn restore_state(&mut self, snapshot: ParserSnapshot) {
        self.cursor.restore(snapshot.cursor);
        self.pending_stmts.truncate(snapshot.pending_stmts);
        self.pending_splices.truncate(snapshot.pending_splices);
        self.static_flow = snapshot.static_flow;
        self.context = snapshot.context;
        self.body = snapshot.body;
    }

    /// Run a token-level predicate without moving the parser.
    pub(crate) fn look_ahead(&mut self, f: impl FnOnce(&mut Self) -> bool) -> bool {
        let snapshot = self.snapshot();
        let result = f(self);
        self.rewind(snapshot);
        result
    }

    /// Attempt a parse.
    ///
    /// On success the parser stays where `f` left it. On an ordinary
    /// failure the parser is restored and the attempt's diagnostics are
    /// handed back, so the caller can try another path or re-report
    /// them. Hard failures (resource exhaustion, `error()`) are never
    /// suppressed and propagate as `Err`.
    pub(crate) fn speculate<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<Result<T, Vec<Diagnostic>>> {
        let snapshot = self.snapshot();
        match f(self) {
            Ok(value) => Ok(Ok(value)),
            Err(fatal) => {
                if self.sink.has_hard_since(snapshot.mark) {
                    return Err(fatal);
                }
                let diagnostics = self.sink.take_since(snapshot.mark);
                self.restore_state(snapshot);
                Ok(Err(diagnostics))
            }
        }
    }
}
