use tcbot_sim::tc::resolve_redirect_device;

use crate::{error::VLAN_USAGE, CommandError, Context, Tokens};

/// Highest valid 802.1Q VLAN identifier.
pub const MAX_VLAN: u16 = 4094;

/// The currently selected VLAN and the devices bound to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VlanSelection {
    /// Selected VLAN tag, `0` when nothing is selected.
    pub vlan: u16,
    /// Sub-interface carrying the VLAN, shaped by `out`.
    pub device: String,
    /// `ifb` device receiving the VLAN's ingress traffic, shaped by `in`. Empty if unknown.
    pub ifb: String,
}

impl VlanSelection {
    pub fn new(vlan: u16, device: impl Into<String>) -> Self {
        Self { vlan, device: device.into(), ifb: String::new() }
    }

    pub const fn is_selected(&self) -> bool {
        self.vlan != 0
    }

    /// The device to shape for ingress traffic, if it was resolved.
    pub fn ingress_device(&self) -> Option<&str> {
        (!self.ifb.is_empty()).then_some(self.ifb.as_str())
    }
}

/// Selects the VLAN named by the next token.
///
/// The selection is only replaced once the VLAN is known to exist. A missing ingress
/// redirect device does not fail the selection, it only disables `in`.
pub fn select_vlan(ctx: &mut Context, tokens: &mut Tokens) -> Result<String, CommandError> {
    if tokens.remaining() < 1 {
        return Err(CommandError::Usage(VLAN_USAGE));
    }

    let token = tokens.next();
    let vlan: i64 =
        token.parse().map_err(|e| CommandError::invalid_number("VLAN number", token, e))?;
    if !(1..=i64::from(MAX_VLAN)).contains(&vlan) {
        return Err(CommandError::OutOfRange { what: "VLAN number", bounds: "1 and 4094" });
    }
    let vlan = vlan as u16;

    ctx.refresh_inventory()?;
    let device = ctx.inventory.find_vlan(vlan).ok_or(CommandError::VlanNotFound(vlan))?.to_owned();

    ctx.vlan = VlanSelection::new(vlan, device.clone());
    tracing::info!(vlan, %device, "vlan selected");

    match resolve_redirect_device(ctx.shaper(), &device) {
        Ok(ifb) => {
            let reply = format!("VLAN {vlan} selected (device {device}, ingress via {ifb})");
            ctx.vlan.ifb = ifb;
            Ok(reply)
        }
        Err(e) => {
            tracing::warn!(vlan, %device, error = %e, "ingress shaping unavailable");
            Ok(format!("VLAN {vlan} selected (device {device}). Could not get IFB: {e}"))
        }
    }
}
