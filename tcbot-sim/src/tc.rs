//! Traffic control (`tc`) command construction.
//!
//! Impairments are applied as a single root `netem` qdisc on the target device. Ingress traffic
//! is shaped on the `ifb` device that the VLAN interface redirects its ingress into, which is
//! discovered from the interface's filter table.

use std::{fmt, sync::OnceLock};

use regex::Regex;

use crate::command::{self, Output, Runner};

/// The default `tc` executable, resolved through `PATH`.
pub const DEFAULT_TC_BINARY: &str = "tc";

/// A netem policy, in the units operators type them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NetemPolicy {
    /// Base delay, in milliseconds.
    pub delay_ms: u32,
    /// Delay variation, in milliseconds. Only applied together with a delay.
    pub jitter_ms: u32,
    /// Packet loss percentage (0.0 to 100.0).
    pub loss: f64,
    /// Loss correlation percentage (0.0 to 100.0). Only applied together with a loss.
    pub correlation: f64,
}

impl NetemPolicy {
    /// Returns `true` if the policy has no effect, in which case nothing needs to be installed.
    pub fn is_noop(&self) -> bool {
        self.delay_ms == 0 && self.loss == 0.0
    }
}

impl fmt::Display for NetemPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}ms delay ({}ms jitter), {}% PL ({}% correlation)",
            self.delay_ms, self.jitter_ms, self.loss, self.correlation
        )
    }
}

/// `tc qdisc del dev <device> root`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QdiscDelRequest<'a> {
    pub device: &'a str,
}

impl<'a> QdiscDelRequest<'a> {
    pub const fn new(device: &'a str) -> Self {
        Self { device }
    }

    /// Builds the arguments to pass to `tc`.
    pub fn build(self) -> Vec<String> {
        ["qdisc", "del", "dev", self.device, "root"].map(String::from).to_vec()
    }
}

/// `tc qdisc add dev <device> root netem ...`
///
/// The delay clause is present iff the delay is non-zero, with a normally distributed jitter
/// sub-clause iff the jitter is non-zero. The loss clause follows the same rule with its
/// correlation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QdiscNetemRequest<'a> {
    pub device: &'a str,
    pub policy: NetemPolicy,
}

impl<'a> QdiscNetemRequest<'a> {
    pub const fn new(device: &'a str, policy: NetemPolicy) -> Self {
        Self { device, policy }
    }

    /// Builds the arguments to pass to `tc`.
    pub fn build(self) -> Vec<String> {
        let mut args: Vec<String> =
            ["qdisc", "add", "dev", self.device, "root", "netem"].map(String::from).to_vec();

        let p = self.policy;
        if p.delay_ms != 0 {
            args.push("delay".to_string());
            args.push(format!("{}ms", p.delay_ms));
            if p.jitter_ms != 0 {
                args.push(format!("{}ms", p.jitter_ms));
                args.push("distribution".to_string());
                args.push("normal".to_string());
            }
        }

        if p.loss != 0.0 {
            args.push("loss".to_string());
            args.push(format!("{}%", p.loss));
            if p.correlation != 0.0 {
                args.push(format!("{}%", p.correlation));
            }
        }

        args
    }
}

/// `tc filter show dev <device> root`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterShowRequest<'a> {
    pub device: &'a str,
}

impl<'a> FilterShowRequest<'a> {
    pub const fn new(device: &'a str) -> Self {
        Self { device }
    }

    /// Builds the arguments to pass to `tc`.
    pub fn build(self) -> Vec<String> {
        ["filter", "show", "dev", self.device, "root"].map(String::from).to_vec()
    }
}

/// The external traffic shaping facility.
pub trait Shaper: Send {
    /// Runs `tc` with the given arguments, blocking until it exits.
    fn run(&self, args: &[String]) -> command::Result<Output>;

    /// Returns the textual filter table attached to the root of `device`.
    fn query_filter_table(&self, device: &str) -> command::Result<String>;
}

/// A [`Shaper`] that shells out to the `tc` binary.
#[derive(Debug, Clone)]
pub struct TcShaper {
    binary: String,
}

impl TcShaper {
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }
}

impl Default for TcShaper {
    fn default() -> Self {
        Self::new(DEFAULT_TC_BINARY)
    }
}

impl Shaper for TcShaper {
    fn run(&self, args: &[String]) -> command::Result<Output> {
        Runner::run(&self.binary, args)
    }

    fn query_filter_table(&self, device: &str) -> command::Result<String> {
        self.run(&FilterShowRequest::new(device).build()).map(|output| output.stdout)
    }
}

/// Errors resolving the ingress redirect device of an interface.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("Error at filter show: {0}")]
    Query(#[from] command::Error),
    #[error("Missing IFB device for {device} in {table:?}")]
    Missing { device: String, table: String },
}

fn redirect_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Egress Redirect to device (ifb[0-9]+)").expect("valid redirect pattern")
    })
}

/// Extracts the `ifbN` device from a `mirred` redirect action in a filter table dump.
pub fn parse_redirect_device(table: &str) -> Option<&str> {
    redirect_regex().captures(table).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

/// Finds the `ifb` device that receives the ingress traffic of `device`.
pub fn resolve_redirect_device(shaper: &dyn Shaper, device: &str) -> Result<String, FilterError> {
    let table = shaper.query_filter_table(device)?;

    match parse_redirect_device(&table) {
        Some(ifb) => {
            tracing::debug!(device, ifb, "resolved redirect device");
            Ok(ifb.to_string())
        }
        None => Err(FilterError::Missing { device: device.to_string(), table }),
    }
}
