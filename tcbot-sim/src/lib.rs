#![doc(issue_tracker_base_url = "https://github.com/chainbound/tcbot/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod command;
pub mod ip;
pub mod tc;
