//! Trusted operator bookkeeping.

/// Outcome of checking a sender against the [`Operators`] set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    /// The set was empty and the sender became its first member.
    Bootstrapped,
    /// The sender is a known operator.
    Trusted,
    /// The sender is not a known operator.
    Rejected,
}

/// The set of identities allowed to issue commands.
///
/// The first sender ever seen by an empty set is trusted automatically. Once the set has a
/// member, only exact matches are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operators {
    operators: Vec<String>,
}

impl Operators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pre-seeded set. A non-empty seed disables the first-sender bootstrap.
    pub fn with_seed<I, S>(seed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut operators = Self::new();
        for operator in seed {
            operators.add(operator);
        }
        operators
    }

    /// Checks `sender`, bootstrapping the set if it is empty.
    pub fn authorize(&mut self, sender: &str) -> Authorization {
        if self.operators.is_empty() {
            self.operators.push(sender.to_string());
            tracing::info!(sender, "first operator bootstrapped");
            return Authorization::Bootstrapped;
        }

        if self.contains(sender) {
            Authorization::Trusted
        } else {
            tracing::warn!(sender, "rejected message from unknown sender");
            Authorization::Rejected
        }
    }

    /// Adds an operator. Returns `false` if it was already present.
    pub fn add(&mut self, operator: impl Into<String>) -> bool {
        let operator = operator.into();
        if self.contains(&operator) {
            return false;
        }

        tracing::info!(%operator, "operator added");
        self.operators.push(operator);
        true
    }

    pub fn contains(&self, sender: &str) -> bool {
        self.operators.iter().any(|operator| operator == sender)
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.operators.iter().map(String::as_str)
    }
}
