/// The whitespace-separated words of one incoming message, with a read cursor.
///
/// The cursor always stays within `0..=len`. Handlers read their arguments with
/// [`Tokens::next`] and may give back a speculatively read token with [`Tokens::back`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    tokens: Vec<String>,
    current: usize,
}

impl Tokens {
    /// Splits `text` on whitespace.
    pub fn new(text: &str) -> Self {
        Self { tokens: text.split_whitespace().map(str::to_owned).collect(), current: 0 }
    }

    /// Returns the token under the cursor and advances, or an empty string once exhausted.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> &str {
        match self.tokens.get(self.current) {
            Some(token) => {
                self.current += 1;
                token
            }
            None => "",
        }
    }

    /// Moves the cursor back by one token. No-op at the start of the stream.
    pub fn back(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// Number of tokens not consumed yet.
    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.current
    }

    /// Current cursor position.
    pub const fn position(&self) -> usize {
        self.current
    }

    /// Moves the cursor to a position previously returned by [`Tokens::position`].
    pub fn restore(&mut self, position: usize) {
        self.current = position.min(self.tokens.len());
    }
}

impl From<&str> for Tokens {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}
