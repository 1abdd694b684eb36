//! Repositionable token cursor with nested states.
//!
//! The cursor reads one active buffer at a time. Entering a
//! [`DeferredRange`] saves the active state on a stack and makes the
//! range active; leaving restores the saved state. Three kinds of state
//! nest this way:
//!
//! - `Expansion`: the body of a syntax rule being expanded
//! - `Deferred`: a function body parsed after its declaration was skipped
//! - `Splice`: tokens inserted by a macro; popped automatically once
//!   exhausted, so parsing continues seamlessly after them
//!
//! Reading past the end of the active buffer yields an end-of-buffer
//! token rather than panicking.

use std::rc::Rc;

use kiln_ir::{Span, Token, TokenKind};
use smallvec::SmallVec;
use tracing::trace;

/// A captured token range, not yet parsed.
#[derive(Clone, Debug)]
pub struct DeferredRange {
    tokens: Rc<[Token]>,
    start: usize,
    end: usize,
}

impl DeferredRange {
    /// Range over `start..end` of a shared buffer. Bounds are clamped to
    /// the buffer.
    pub fn new(tokens: Rc<[Token]>, start: usize, end: usize) -> Self {
        let end = end.min(tokens.len());
        DeferredRange {
            tokens,
            start: start.min(end),
            end,
        }
    }

    /// Range over a fresh buffer of synthesized tokens.
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        let end = tokens.len();
        DeferredRange {
            tokens: tokens.into(),
            start: 0,
            end,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The tokens of the range.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens[self.start..self.end]
    }

    /// Span from the first to the last token, `DUMMY` when empty.
    pub fn span(&self) -> Span {
        match (self.tokens().first(), self.tokens().last()) {
            (Some(first), Some(last)) => first.span.merge(last.span),
            _ => Span::DUMMY,
        }
    }
}

/// Why a state was entered.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum StateKind {
    Expansion,
    Splice,
    Deferred,
}

#[derive(Clone, Debug)]
struct CursorState {
    range: DeferredRange,
    pos: usize,
}

impl CursorState {
    fn new(range: DeferredRange) -> Self {
        let pos = range.start;
        CursorState { range, pos }
    }

    #[inline]
    fn at_end(&self) -> bool {
        self.pos >= self.range.end
    }
}

type StateStack = SmallVec<[(StateKind, CursorState); 8]>;

/// Saved cursor position, including the nested state stack.
#[derive(Clone, Debug)]
pub struct CursorSnapshot {
    active: CursorState,
    saved: StateStack,
}

/// Entering a state would exceed the nesting bound.
#[derive(Copy, Clone, Eq, PartialEq, Debug, thiserror::Error)]
#[error("token cursor nesting exceeds {limit} states")]
pub struct CursorDepthError {
    pub limit: usize,
}

/// Cursor over the active token buffer.
pub struct TokenCursor {
    active: CursorState,
    saved: StateStack,
    max_depth: usize,
    eof: Token,
}

impl TokenCursor {
    /// Create a cursor at the start of `tokens`.
    pub fn new(tokens: Vec<Token>, max_depth: usize) -> Self {
        let eof_span = tokens.last().map_or(Span::DUMMY, |last| last.span.end_point());
        TokenCursor {
            active: CursorState::new(DeferredRange::from_tokens(tokens)),
            saved: SmallVec::new(),
            max_depth,
            eof: Token::eof(eof_span),
        }
    }

    /// The current token; the end-of-buffer token once exhausted.
    #[inline]
    pub fn current(&self) -> &Token {
        self.peek(0)
    }

    /// The token `k` places ahead inside the active buffer, clamped to
    /// the end-of-buffer token.
    pub fn peek(&self, k: usize) -> &Token {
        let idx = self.active.pos.saturating_add(k);
        if idx < self.active.range.end {
            &self.active.range.tokens[idx]
        } else {
            &self.eof
        }
    }

    #[inline]
    pub fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    /// Span of the current token, or of the end of the last one read.
    pub fn current_span(&self) -> Span {
        if self.active.at_end() {
            self.previous_span().end_point()
        } else {
            self.current().span
        }
    }

    /// Span of the token just consumed in the active buffer.
    pub fn previous_span(&self) -> Span {
        if self.active.pos > self.active.range.start {
            self.active.range.tokens[self.active.pos - 1].span
        } else {
            self.eof.span
        }
    }

    /// Consume and return the current token.
    pub fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.active.at_end() {
            self.active.pos += 1;
        }
        self.pop_exhausted_splices();
        token
    }

    /// Step back one token inside the active buffer.
    pub fn retreat(&mut self) -> bool {
        if self.active.pos > self.active.range.start {
            self.active.pos -= 1;
            true
        } else {
            false
        }
    }

    /// Whether the active buffer is exhausted.
    #[inline]
    pub fn at_end(&self) -> bool {
        self.active.at_end()
    }

    /// Number of saved states below the active one.
    #[inline]
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Kind of the innermost entered state, `None` at the root buffer.
    pub fn active_kind(&self) -> Option<StateKind> {
        self.saved.last().map(|(kind, _)| *kind)
    }

    pub fn save(&self) -> CursorSnapshot {
        CursorSnapshot {
            active: self.active.clone(),
            saved: self.saved.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: CursorSnapshot) {
        self.active = snapshot.active;
        self.saved = snapshot.saved;
    }

    /// Tokens consumed since `snapshot`, when both positions are in the
    /// same buffer at the same nesting.
    pub fn consumed_since(&self, snapshot: &CursorSnapshot) -> Option<usize> {
        let same_buffer = Rc::ptr_eq(&self.active.range.tokens, &snapshot.active.range.tokens)
            && self.saved.len() == snapshot.saved.len();
        same_buffer.then(|| self.active.pos.saturating_sub(snapshot.active.pos))
    }

    /// Make `range` the active buffer, saving the current state.
    pub fn enter(&mut self, range: DeferredRange, kind: StateKind) -> Result<(), CursorDepthError> {
        if self.saved.len() >= self.max_depth {
            return Err(CursorDepthError {
                limit: self.max_depth,
            });
        }
        trace!(?kind, depth = self.saved.len() + 1, tokens = range.len(), "enter cursor state");
        let outer = std::mem::replace(&mut self.active, CursorState::new(range));
        self.saved.push((kind, outer));
        self.pop_exhausted_splices();
        Ok(())
    }

    /// Restore the state saved by the innermost `enter`.
    pub fn leave(&mut self) -> Option<StateKind> {
        let (kind, outer) = self.saved.pop()?;
        trace!(?kind, depth = self.saved.len(), "leave cursor state");
        self.active = outer;
        Some(kind)
    }

    /// Leave states until only `depth` remain saved.
    ///
    /// Used to unwind a state entered at `depth` together with any
    /// splices still active inside it.
    pub fn leave_to(&mut self, depth: usize) {
        while self.saved.len() > depth {
            self.leave();
        }
    }

    /// Skip the rest of the active buffer.
    pub fn skip_to_end(&mut self) {
        self.active.pos = self.active.range.end;
    }

    /// Capture the tokens between the current `{` and its matching `}`.
    ///
    /// On success the cursor sits after the closing brace. Returns `None`
    /// (cursor unmoved) when the current token is not `{` or the block is
    /// not closed inside the active buffer.
    pub fn capture_braced(&mut self) -> Option<DeferredRange> {
        if self.current_kind() != TokenKind::LBrace {
            return None;
        }
        let tokens = Rc::clone(&self.active.range.tokens);
        let open = self.active.pos;
        let mut depth = 0usize;
        for idx in open..self.active.range.end {
            match tokens[idx].kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        let range = DeferredRange::new(tokens, open + 1, idx);
                        self.active.pos = idx + 1;
                        self.pop_exhausted_splices();
                        return Some(range);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn pop_exhausted_splices(&mut self) {
        while self.active.at_end() && self.active_kind() == Some(StateKind::Splice) {
            self.leave();
        }
    }
}

#[cfg(test)]
mod tests;
