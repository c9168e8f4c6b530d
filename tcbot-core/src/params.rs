use std::{ops::RangeInclusive, str::FromStr};

use tcbot_sim::tc::NetemPolicy;

use crate::{error::IMPAIR_USAGE, CommandError, Tokens, VlanSelection};

const DELAY_RANGE: RangeInclusive<i64> = 0..=4094;
const PERCENT_RANGE: RangeInclusive<f64> = 0.0..=100.0;

/// Reads the next token as `T`, giving it back if it does not parse.
fn speculative<T: FromStr>(tokens: &mut Tokens) -> Option<T> {
    if tokens.remaining() == 0 {
        return None;
    }

    let mark = tokens.position();
    match tokens.next().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tokens.restore(mark);
            None
        }
    }
}

/// Consumes the numeric arguments of an impairment command that cannot run, so they are not
/// dispatched as commands. The first non-numeric token is left in the stream.
pub(crate) fn skip_impairment(tokens: &mut Tokens) {
    for _ in 0..4 {
        if speculative::<f64>(tokens).is_none() {
            break;
        }
    }
}

fn check<T: PartialOrd>(
    value: T,
    range: &RangeInclusive<T>,
    what: &'static str,
    bounds: &'static str,
) -> Result<T, CommandError> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(CommandError::OutOfRange { what, bounds })
    }
}

/// Parses `<delay_ms> [jitter_ms] [loss %] [correlation %]` for the selected VLAN.
///
/// The delay is mandatory. Each optional argument that does not parse as a number is left in
/// the stream for the next command, and ends the argument list. Numbers outside their bounds
/// are errors.
pub fn parse_impairment(
    selection: &VlanSelection,
    tokens: &mut Tokens,
) -> Result<NetemPolicy, CommandError> {
    if !selection.is_selected() {
        skip_impairment(tokens);
        return Err(CommandError::NoVlanSelected);
    }
    if tokens.remaining() == 0 {
        return Err(CommandError::Usage(IMPAIR_USAGE));
    }

    let mut policy = NetemPolicy::default();

    let token = tokens.next();
    let delay: i64 = token.parse().map_err(|e| CommandError::invalid_number("delay", token, e))?;
    policy.delay_ms = check(delay, &DELAY_RANGE, "Delay", "0 and 4094 milliseconds")? as u32;

    let Some(jitter) = speculative::<i64>(tokens) else { return Ok(policy) };
    policy.jitter_ms = check(jitter, &DELAY_RANGE, "Jitter", "0 and 4094 milliseconds")? as u32;

    let Some(loss) = speculative::<f64>(tokens) else { return Ok(policy) };
    policy.loss = check(loss, &PERCENT_RANGE, "Packet loss", "0.0 and 100.0 percent")?;

    let Some(correlation) = speculative::<f64>(tokens) else { return Ok(policy) };
    policy.correlation = check(correlation, &PERCENT_RANGE, "Correlation", "0.0 and 100.0 percent")?;

    Ok(policy)
}
