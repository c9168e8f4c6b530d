//! In-memory stand-ins for the interface table and `tc`.

use std::{
    io,
    net::Ipv4Addr,
    process::ExitStatus,
    sync::{Arc, Mutex},
};

use tcbot_core::{Context, ConversationId, Incoming, Session};
use tcbot_sim::{
    command::{self, Output},
    ip::{InterfaceAddresses, InterfaceSource},
    tc::Shaper,
};

#[derive(Clone, Default)]
pub struct FakeInterfaces {
    pub listing: Arc<Mutex<InterfaceAddresses>>,
}

impl FakeInterfaces {
    pub fn with(interfaces: &[(&str, [u8; 4])]) -> Self {
        let listing = interfaces
            .iter()
            .map(|(name, ip)| (name.to_string(), vec![Ipv4Addr::from(*ip)]))
            .collect();
        Self { listing: Arc::new(Mutex::new(listing)) }
    }
}

impl InterfaceSource for FakeInterfaces {
    fn list_interface_addresses(&self) -> io::Result<InterfaceAddresses> {
        Ok(self.listing.lock().unwrap().clone())
    }
}

/// Records every `tc` invocation and answers filter table queries from a canned table.
#[derive(Clone, Default)]
pub struct RecordingShaper {
    pub runs: Arc<Mutex<Vec<Vec<String>>>>,
    pub queries: Arc<Mutex<Vec<String>>>,
    /// Filter table returned for every device. `None` makes the query fail.
    pub filter_table: Arc<Mutex<Option<String>>>,
    /// Fail `qdisc del` calls, as `tc` does when no root qdisc is installed.
    pub fail_del: bool,
    /// Fail `qdisc add` calls.
    pub fail_add: bool,
}

impl RecordingShaper {
    pub fn with_ifb(ifb: &str) -> Self {
        let shaper = Self::default();
        shaper.set_redirect(Some(ifb));
        shaper
    }

    pub fn without_ifb() -> Self {
        let shaper = Self::default();
        shaper.set_redirect(None);
        shaper
    }

    /// Makes later filter table queries report `ifb` as the redirect target, or no redirect.
    pub fn set_redirect(&self, ifb: Option<&str>) {
        let table = match ifb {
            Some(ifb) => format!(
                "filter parent ffff: protocol all pref 49152 u32 chain 0\n\
                 \taction order 1: mirred (Egress Redirect to device {ifb}) stolen\n"
            ),
            None => "filter parent ffff: protocol all pref 49152 u32 chain 0\n".to_string(),
        };
        *self.filter_table.lock().unwrap() = Some(table);
    }

    pub fn runs(&self) -> Vec<String> {
        self.runs.lock().unwrap().iter().map(|args| args.join(" ")).collect()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

fn exit_status(ok: bool) -> ExitStatus {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(if ok { 0 } else { 2 << 8 })
    }
    #[cfg(windows)]
    {
        use std::os::windows::process::ExitStatusExt;
        ExitStatus::from_raw(if ok { 0 } else { 2 })
    }
}

impl Shaper for RecordingShaper {
    fn run(&self, args: &[String]) -> command::Result<Output> {
        self.runs.lock().unwrap().push(args.to_vec());

        let failing = match args.get(1).map(String::as_str) {
            Some("del") => self.fail_del,
            Some("add") => self.fail_add,
            _ => false,
        };

        if failing {
            return Err(command::Error::NonZero(Output {
                status: exit_status(false),
                stdout: String::new(),
                stderr: "RTNETLINK answers: No such file or directory".to_string(),
            }));
        }

        Ok(Output { status: exit_status(true), stdout: String::new(), stderr: String::new() })
    }

    fn query_filter_table(&self, device: &str) -> command::Result<String> {
        self.queries.lock().unwrap().push(device.to_string());
        self.filter_table
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| command::Error::Io(io::Error::other("Cannot find device")))
    }
}

pub const CHAT: ConversationId = 42;

/// A session whose operator set already contains `alice`.
pub fn session(interfaces: FakeInterfaces, shaper: RecordingShaper) -> Session {
    let mut session = Session::new(Context::new(interfaces, shaper));
    session.context_mut().operators.add("alice");
    session
}

pub fn lab() -> FakeInterfaces {
    FakeInterfaces::with(&[
        ("lo", [127, 0, 0, 1]),
        ("eth0", [10, 0, 0, 1]),
        ("eth0.10", [192, 168, 10, 1]),
        ("eth0.20", [192, 168, 20, 1]),
    ])
}

/// Sends `text` as `alice` and returns the reply texts.
pub fn say(session: &mut Session, text: &str) -> Vec<String> {
    say_as(session, "alice", text)
}

pub fn say_as(session: &mut Session, sender: &str, text: &str) -> Vec<String> {
    let mut outbox = Vec::new();
    session.handle(&Incoming::new(sender, CHAT, text), &mut outbox);

    assert!(outbox.iter().all(|(chat, _)| *chat == CHAT), "reply sent to another chat");
    outbox.into_iter().map(|(_, text)| text).collect()
}
