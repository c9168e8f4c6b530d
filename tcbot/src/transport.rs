use tcbot_core::{ConversationId, Incoming};

/// Errors raised by a chat transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error: {0}")]
    Api(String),
}

/// A chat service delivering operator messages and carrying replies back.
#[async_trait::async_trait]
pub trait Transport: Clone + Send + Sync + 'static {
    /// Checks the connection, returning the name the transport is known by.
    async fn connect(&self) -> Result<String, TransportError>;

    /// Waits for the next batch of messages. An empty batch is a normal outcome.
    async fn receive(&self) -> Result<Vec<Incoming>, TransportError>;

    /// Sends one reply to a conversation.
    async fn send(&self, conversation: ConversationId, text: &str) -> Result<(), TransportError>;
}
