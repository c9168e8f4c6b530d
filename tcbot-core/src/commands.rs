//! The built-in operator commands.

use crate::{
    applier::apply,
    error::MASTER_USAGE,
    params::{parse_impairment, skip_impairment},
    vlan::select_vlan,
    CommandError, Context, Handler, Registry, Tokens,
};

const HELP: &str = "\
Usage:
  ip                                  - list interfaces and their IPv4 addresses
  vlan <1-4094>                       - select the VLAN to impair
  out <delay_ms> [jitter_ms] [PL %] [correlation %] - impair egress traffic
  in <delay_ms> [jitter_ms] [PL %] [correlation %]  - impair ingress traffic
  master <identity>                   - trust another operator
Several commands can be chained in one message, e.g. \"vlan 10 out 50 5\".
\"out 0\" removes the egress impairment.";

fn reply(result: Result<String, CommandError>) -> String {
    result.unwrap_or_else(|e| e.to_string())
}

/// `ip`: lists interfaces with IPv4 addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ip;

impl Handler for Ip {
    fn handle(&self, ctx: &mut Context, _tokens: &mut Tokens) -> String {
        if let Err(e) = ctx.refresh_inventory() {
            return CommandError::from(e).to_string();
        }

        if ctx.inventory.is_empty() {
            return "No interface has an IPv4 address".to_string();
        }

        ctx.inventory.to_string()
    }
}

/// `vlan <n>`: selects the VLAN that `in` and `out` act on.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vlan;

impl Handler for Vlan {
    fn handle(&self, ctx: &mut Context, tokens: &mut Tokens) -> String {
        reply(select_vlan(ctx, tokens))
    }
}

/// `out ...`: impairs traffic leaving through the VLAN sub-interface.
#[derive(Debug, Clone, Copy, Default)]
pub struct Out;

impl Handler for Out {
    fn handle(&self, ctx: &mut Context, tokens: &mut Tokens) -> String {
        reply(
            parse_impairment(&ctx.vlan, tokens)
                .map(|policy| apply(ctx.shaper(), &ctx.vlan.device, policy)),
        )
    }
}

/// `in ...`: impairs traffic entering through the VLAN, on its `ifb` redirect device.
#[derive(Debug, Clone, Copy, Default)]
pub struct In;

impl Handler for In {
    fn handle(&self, ctx: &mut Context, tokens: &mut Tokens) -> String {
        let Some(ifb) = ctx.vlan.ingress_device().map(str::to_owned) else {
            skip_impairment(tokens);
            return CommandError::IngressUnavailable.to_string();
        };

        reply(parse_impairment(&ctx.vlan, tokens).map(|policy| apply(ctx.shaper(), &ifb, policy)))
    }
}

/// `master <identity>`: adds a trusted operator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Master;

impl Handler for Master {
    fn handle(&self, ctx: &mut Context, tokens: &mut Tokens) -> String {
        if tokens.remaining() == 0 {
            return MASTER_USAGE.to_string();
        }

        let operator = tokens.next();
        if ctx.operators.add(operator) {
            format!("Username {operator} added as master")
        } else {
            format!("Username {operator} is already a master")
        }
    }
}

/// `help`: describes the command syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct Help;

impl Handler for Help {
    fn handle(&self, _ctx: &mut Context, _tokens: &mut Tokens) -> String {
        HELP.to_string()
    }
}

/// Registers `ip`, `vlan`, `out`, `in`, `master` and `help`.
pub fn register_defaults(registry: &mut Registry) {
    registry
        .register("ip", Ip)
        .register("vlan", Vlan)
        .register("out", Out)
        .register("in", In)
        .register("master", Master)
        .register("help", Help);
}
