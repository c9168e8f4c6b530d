use rustc_hash::FxHashMap;

use crate::{Context, Tokens};

/// A command handler.
///
/// Handlers receive the token stream positioned right after their keyword, consume the
/// arguments they need and return the reply text for the operator.
pub trait Handler: Send {
    fn handle(&self, ctx: &mut Context, tokens: &mut Tokens) -> String;
}

impl<F> Handler for F
where
    F: Fn(&mut Context, &mut Tokens) -> String + Send,
{
    fn handle(&self, ctx: &mut Context, tokens: &mut Tokens) -> String {
        self(ctx, tokens)
    }
}

/// Maps lower-cased command keywords to their handlers.
#[derive(Default)]
pub struct Registry {
    handlers: FxHashMap<String, Box<dyn Handler>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("commands", &self.names()).finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `keyword`, case-insensitively. A previous handler registered
    /// under the same keyword is replaced.
    pub fn register(&mut self, keyword: &str, handler: impl Handler + 'static) -> &mut Self {
        let keyword = keyword.to_lowercase();
        if self.handlers.insert(keyword.clone(), Box::new(handler)).is_some() {
            tracing::warn!(%keyword, "command handler replaced");
        }
        self
    }

    /// Looks up a handler. `keyword` must already be lower-cased.
    pub fn get(&self, keyword: &str) -> Option<&dyn Handler> {
        self.handlers.get(keyword).map(|handler| &**handler)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.handlers.contains_key(keyword)
    }

    /// Registered keywords, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Lists every registered keyword.
    pub fn help(&self) -> String {
        format!("Known commands:\n  - {}", self.names().join("\n  - "))
    }
}
