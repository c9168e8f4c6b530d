use tcbot_core::{Context, Incoming, Session, Tokens, MASTER_USAGE};

use crate::fakes::{lab, say, say_as, session, RecordingShaper, CHAT};

#[test]
fn first_sender_becomes_master() {
    let _ = tracing_subscriber::fmt::try_init();

    let mut session = Session::new(Context::new(lab(), RecordingShaper::default()));

    let replies = say_as(&mut session, "alice", "help");
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0], "alice has become my first master");

    // Processing the same first message again does not bootstrap again.
    let replies = say_as(&mut session, "alice", "help");
    assert_eq!(replies.len(), 1);
    assert!(replies[0].starts_with("Usage:"));

    assert_eq!(session.context().operators.iter().collect::<Vec<_>>(), vec!["alice"]);
}

#[test]
fn bootstrap_with_empty_message() {
    let mut session = Session::new(Context::new(lab(), RecordingShaper::default()));

    assert_eq!(say_as(&mut session, "alice", ""), vec!["alice has become my first master"]);
    assert_eq!(say_as(&mut session, "alice", "   "), Vec::<String>::new());
}

#[test]
fn strangers_are_rejected_before_dispatch() {
    let shaper = RecordingShaper::with_ifb("ifb0");
    let mut session = session(lab(), shaper.clone());

    let replies = say_as(&mut session, "mallory", "vlan 10 out 50");

    assert_eq!(replies, vec!["mallory is not my master"]);
    assert!(shaper.runs().is_empty());
    assert!(shaper.queries().is_empty());
    assert!(!session.context().vlan.is_selected());
}

#[test]
fn master_adds_operator() {
    let mut session = session(lab(), RecordingShaper::default());

    assert_eq!(say(&mut session, "master bob"), vec!["Username bob added as master"]);
    assert_eq!(say(&mut session, "master bob"), vec!["Username bob is already a master"]);
    assert_eq!(say_as(&mut session, "bob", "master carol"), vec!["Username carol added as master"]);
    assert_eq!(session.context().operators.len(), 3);
}

#[test]
fn master_requires_identity() {
    let mut session = session(lab(), RecordingShaper::default());

    let replies = say(&mut session, "master");

    // The keyword itself was consumed, so the dispatcher accepts the usage reply.
    assert_eq!(replies, vec![MASTER_USAGE]);
    assert_eq!(session.context().operators.len(), 1);
}

#[test]
fn unknown_command_lists_known_commands_and_stops() {
    let shaper = RecordingShaper::default();
    let mut session = session(lab(), shaper.clone());

    let replies = say(&mut session, "frobnicate ip");

    assert_eq!(replies.len(), 1);
    assert_eq!(
        replies[0],
        "Command frobnicate is not known.\nKnown commands:\n  - help\n  - in\n  - ip\n  - master\n  - out\n  - vlan"
    );
}

#[test]
fn keywords_are_case_insensitive() {
    let shaper = RecordingShaper::with_ifb("ifb0");
    let mut session = session(lab(), shaper.clone());

    let replies = say(&mut session, "VLAN 10 Out 0");

    assert_eq!(replies.len(), 2);
    assert_eq!(shaper.runs(), vec!["qdisc del dev eth0.10 root"]);
}

#[test]
fn ip_lists_interfaces() {
    let mut session = session(lab(), RecordingShaper::default());

    let replies = say(&mut session, "ip");

    assert_eq!(
        replies,
        vec!["eth0: 10.0.0.1\neth0.10: 192.168.10.1\neth0.20: 192.168.20.1\nlo: 127.0.0.1"]
    );
}

#[test]
fn ip_without_addresses() {
    let mut session = session(Default::default(), RecordingShaper::default());

    assert_eq!(say(&mut session, "ip"), vec!["No interface has an IPv4 address"]);
}

#[test]
fn each_chained_command_gets_a_reply() {
    let mut session = session(lab(), RecordingShaper::with_ifb("ifb0"));

    let replies = say(&mut session, "ip vlan 20 help");

    assert_eq!(replies.len(), 3);
    assert!(replies[0].starts_with("eth0: "));
    assert_eq!(replies[1], "VLAN 20 selected (device eth0.20, ingress via ifb0)");
    assert!(replies[2].starts_with("Usage:"));
}

#[test]
fn handler_that_gives_back_its_keyword_is_stopped() {
    let _ = tracing_subscriber::fmt::try_init();

    let shaper = RecordingShaper::with_ifb("ifb0");
    let mut session = session(lab(), shaper.clone());
    session.registry_mut().register("again", |_: &mut tcbot_core::Context, tokens: &mut Tokens| {
        tokens.back();
        "looping".to_string()
    });

    let replies = say(&mut session, "again vlan 10");

    assert_eq!(
        replies,
        vec!["looping\nPossible loop in command again, len(remainder) has not decreased"]
    );
    assert!(!session.context().vlan.is_selected());
    assert!(shaper.queries().is_empty());
}

#[test]
fn loop_check_runs_after_earlier_commands() {
    let mut session = session(lab(), RecordingShaper::with_ifb("ifb0"));
    session.registry_mut().register("rewind", |_: &mut tcbot_core::Context, tokens: &mut Tokens| {
        tokens.restore(0);
        String::from("rewound")
    });

    let replies = say(&mut session, "vlan 10 rewind");

    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0], "VLAN 10 selected (device eth0.10, ingress via ifb0)");
    assert!(replies[1].ends_with("Possible loop in command rewind, len(remainder) has not decreased"));
}

#[test]
fn dispatch_can_be_driven_directly() {
    let mut session = session(lab(), RecordingShaper::default());
    let mut outbox = Vec::new();
    let mut tokens = Tokens::new("ip");

    session.dispatch(CHAT, &mut tokens, &mut outbox);

    assert_eq!(outbox.len(), 1);
    assert_eq!(tokens.remaining(), 0);

    // Handling goes through authorization first.
    session.handle(&Incoming::new("nobody", 7, "ip"), &mut outbox);
    assert_eq!(outbox.last().unwrap(), &(7, "nobody is not my master".to_string()));
}
