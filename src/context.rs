use std::fmt;

/// Something the walk skipped instead of converting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// No converter is registered for this token type.
    UnsupportedToken { kind: String, position: usize },
    /// A recognised construct whose converter is not implemented.
    UnsupportedBlock { construct: String, position: usize },
    /// A converter failed on this construct and it was left out.
    Skipped {
        kind: String,
        position: usize,
        reason: String,
    },
}

impl Diagnostic {
    pub fn position(&self) -> usize {
        match self {
            Diagnostic::UnsupportedToken { position, .. }
            | Diagnostic::UnsupportedBlock { position, .. }
            | Diagnostic::Skipped { position, .. } => *position,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnsupportedToken { kind, position } => {
                write!(f, "token {position}: no converter for `{kind}`")
            }
            Diagnostic::UnsupportedBlock {
                construct,
                position,
            } => write!(f, "token {position}: `{construct}` blocks are not supported"),
            Diagnostic::Skipped {
                kind,
                position,
                reason,
            } => write!(f, "token {position}: skipped `{kind}`: {reason}"),
        }
    }
}

/// Mutable state threaded through one document's walk.
///
/// `number_stack` holds one counter per open ordered or bulleted list. The
/// scoped helpers below are the only way to change `depth` or the stack, so
/// every push is matched by a pop even when the inner conversion fails.
#[derive(Debug, Default)]
pub struct ConversionContext {
    depth: usize,
    number_stack: Vec<u32>,
    diagnostics: Vec<Diagnostic>,
}

impl ConversionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn number_stack(&self) -> &[u32] {
        &self.number_stack
    }

    /// Run `f` one list level deeper with a fresh item counter.
    pub fn enter_list<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.depth += 1;
        self.number_stack.push(0);
        let out = f(self);
        self.number_stack.pop();
        self.depth -= 1;
        out
    }

    /// Run `f` one level deeper without touching numbering (columns, toggles).
    pub fn enter_depth<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    /// Advance the counter of the innermost list and return the item's number.
    ///
    /// An item outside any list scope gets a counter created on the spot, so
    /// it is numbered 1.
    pub fn next_number(&mut self) -> u32 {
        if self.number_stack.is_empty() {
            self.number_stack.push(0);
        }
        match self.number_stack.last_mut() {
            Some(top) => {
                *top += 1;
                *top
            }
            None => 1,
        }
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
