use std::io;

/// Usage text for `vlan`.
pub const VLAN_USAGE: &str = "Error: must provide the VLAN number (vlan <vlan_number>)";
/// Usage text for `in` and `out`.
pub const IMPAIR_USAGE: &str = "Error: must at least provide delay (ms). \
     Format: [in|out] <delay_ms> <jitter_ms> <PL %> <correlation %>";
/// Usage text for `master`.
pub const MASTER_USAGE: &str = "You must specify the operator identity (master <identity>)";

/// Errors a command handler reports back to the operator.
///
/// The `Display` output is the reply text, so it is written for operators rather than logs.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// A required argument is missing.
    #[error("{0}")]
    Usage(&'static str),
    /// A numeric argument could not be parsed.
    #[error("Error: {what} {token:?} is not a valid number ({reason})")]
    InvalidNumber { what: &'static str, token: String, reason: String },
    /// A numeric argument is outside its accepted bounds.
    #[error("Error: {what} must be between {bounds}")]
    OutOfRange { what: &'static str, bounds: &'static str },
    /// No interface carries the requested VLAN tag.
    #[error("Error: VLAN {0} is not found. Run \"ip\" for more info")]
    VlanNotFound(u16),
    /// `in` or `out` was issued before `vlan`.
    #[error("No VLAN selected. Run \"vlan\" for more info")]
    NoVlanSelected,
    /// The selected VLAN has no ingress redirect device.
    #[error("Current VLAN does not have IFB device assigned, ingress shaping is not available")]
    IngressUnavailable,
    /// The interface table could not be read.
    #[error("Error: could not list interfaces: {0}")]
    Inventory(#[from] io::Error),
}

impl CommandError {
    pub(crate) fn invalid_number(
        what: &'static str,
        token: &str,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::InvalidNumber { what, token: token.to_string(), reason: reason.to_string() }
    }
}
