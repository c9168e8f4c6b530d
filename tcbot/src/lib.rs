#![doc(issue_tracker_base_url = "https://github.com/chainbound/tcbot/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Chat front-end for the VLAN impairment commands: transport, configuration and the service
//! loop tying them to a [`tcbot_core::Session`].

pub mod backoff;
pub mod cli;
pub mod service;
pub mod telegram;
pub mod transport;
pub mod worker;

pub use backoff::ExponentialBackoff;
pub use service::{run, ServiceError};
pub use transport::{Transport, TransportError};
