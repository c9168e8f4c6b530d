use std::io;

use tcbot_sim::{
    ip::{InterfaceSource, Inventory},
    tc::Shaper,
};
use tracing::{debug, error, info, warn};

use crate::{commands, Authorization, Operators, Registry, Tokens, VlanSelection};

/// Identifies the conversation a message came from and replies go to.
pub type ConversationId = i64;

/// One text message delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incoming {
    /// Identity of the sender, matched against the operator set.
    pub sender: String,
    pub conversation: ConversationId,
    pub text: String,
}

impl Incoming {
    pub fn new(
        sender: impl Into<String>,
        conversation: ConversationId,
        text: impl Into<String>,
    ) -> Self {
        Self { sender: sender.into(), conversation, text: text.into() }
    }
}

/// Sink for the replies produced while handling a message.
pub trait Outbox {
    fn send(&mut self, conversation: ConversationId, text: String);
}

impl Outbox for Vec<(ConversationId, String)> {
    fn send(&mut self, conversation: ConversationId, text: String) {
        self.push((conversation, text));
    }
}

/// State shared by every command handler.
pub struct Context {
    /// Identities allowed to issue commands.
    pub operators: Operators,
    /// Last interface snapshot.
    pub inventory: Inventory,
    /// The VLAN that `in` and `out` act on.
    pub vlan: VlanSelection,
    interfaces: Box<dyn InterfaceSource>,
    shaper: Box<dyn Shaper>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("operators", &self.operators)
            .field("inventory", &self.inventory)
            .field("vlan", &self.vlan)
            .finish_non_exhaustive()
    }
}

impl Context {
    pub fn new(interfaces: impl InterfaceSource + 'static, shaper: impl Shaper + 'static) -> Self {
        Self {
            operators: Operators::new(),
            inventory: Inventory::new(),
            vlan: VlanSelection::default(),
            interfaces: Box::new(interfaces),
            shaper: Box::new(shaper),
        }
    }

    pub fn with_operators(mut self, operators: Operators) -> Self {
        self.operators = operators;
        self
    }

    /// Rebuilds the interface snapshot from the live interface table.
    pub fn refresh_inventory(&mut self) -> io::Result<()> {
        self.inventory.refresh(self.interfaces.as_ref())
    }

    pub fn shaper(&self) -> &dyn Shaper {
        self.shaper.as_ref()
    }
}

/// Interprets operator messages against a [`Registry`] and a shared [`Context`].
///
/// Messages must be handled one at a time: the context is not designed for concurrent use.
#[derive(Debug)]
pub struct Session {
    registry: Registry,
    context: Context,
}

impl Session {
    /// Creates a session with the default command set.
    pub fn new(context: Context) -> Self {
        let mut registry = Registry::new();
        commands::register_defaults(&mut registry);
        Self::with_registry(registry, context)
    }

    pub fn with_registry(registry: Registry, context: Context) -> Self {
        Self { registry, context }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    /// Authorizes the sender and dispatches every command in the message, sending one reply
    /// per handled command.
    pub fn handle(&mut self, message: &Incoming, outbox: &mut dyn Outbox) {
        debug!(sender = %message.sender, text = %message.text, "received message");

        match self.context.operators.authorize(&message.sender) {
            Authorization::Bootstrapped => outbox.send(
                message.conversation,
                format!("{} has become my first master", message.sender),
            ),
            Authorization::Trusted => {}
            Authorization::Rejected => {
                outbox.send(message.conversation, format!("{} is not my master", message.sender));
                return;
            }
        }

        let mut tokens = Tokens::new(&message.text);
        self.dispatch(message.conversation, &mut tokens, outbox);
    }

    /// Runs commands until the stream is exhausted, a command is unknown or a handler fails
    /// to make progress.
    ///
    /// Every iteration, command keyword included, must shrink the stream. A handler that hands
    /// back everything it was given would otherwise be dispatched forever.
    pub fn dispatch(
        &mut self,
        conversation: ConversationId,
        tokens: &mut Tokens,
        outbox: &mut dyn Outbox,
    ) {
        while tokens.remaining() > 0 {
            let before = tokens.remaining();
            let keyword = tokens.next().to_lowercase();

            let Some(handler) = self.registry.get(&keyword) else {
                warn!(%keyword, "unknown command");
                outbox.send(
                    conversation,
                    format!("Command {keyword} is not known.\n{}", self.registry.help()),
                );
                return;
            };

            let mut reply = handler.handle(&mut self.context, tokens);
            let after = tokens.remaining();

            if after >= before {
                error!(%keyword, before, after, "command did not consume input, aborting message");
                reply.push_str(&format!(
                    "\nPossible loop in command {keyword}, len(remainder) has not decreased"
                ));
                outbox.send(conversation, reply);
                return;
            }

            info!(%keyword, consumed = before - after, "command handled");
            outbox.send(conversation, reply);
        }
    }
}
