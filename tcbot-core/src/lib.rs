#![doc(issue_tracker_base_url = "https://github.com/chainbound/tcbot/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Command interpretation for tcbot.
//!
//! A [`Session`] turns operator messages into replies: it authorizes the sender against the
//! [`Operators`] set, splits the text into [`Tokens`] and dispatches every command found in it
//! through a [`Registry`] of [`Handler`]s. The built-in handlers select a VLAN and install
//! netem impairments on it through a [`tcbot_sim::tc::Shaper`].

mod applier;
mod auth;
pub mod commands;
mod error;
mod params;
mod registry;
mod session;
mod tokens;
mod vlan;

pub use applier::apply;
pub use auth::{Authorization, Operators};
pub use error::{CommandError, IMPAIR_USAGE, MASTER_USAGE, VLAN_USAGE};
pub use params::parse_impairment;
pub use registry::{Handler, Registry};
pub use session::{Context, ConversationId, Incoming, Outbox, Session};
pub use tokens::Tokens;
pub use vlan::{select_vlan, VlanSelection, MAX_VLAN};
