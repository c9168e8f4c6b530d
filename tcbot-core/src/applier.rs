use tcbot_sim::tc::{NetemPolicy, QdiscDelRequest, QdiscNetemRequest, Shaper};

fn push_output(messages: &mut Vec<String>, stdout: &str) {
    let stdout = stdout.trim_end();
    if !stdout.is_empty() {
        messages.push(stdout.to_string());
    }
}

/// Replaces the root qdisc of `device` with `policy`.
///
/// The existing root qdisc is always removed first. Failing to remove it is expected when
/// nothing was installed, so it is only reported. A netem qdisc is added only if the policy
/// has an effect. The returned text carries the output of both `tc` runs and any failure.
pub fn apply(shaper: &dyn Shaper, device: &str, policy: NetemPolicy) -> String {
    let mut messages = Vec::with_capacity(6);

    match shaper.run(&QdiscDelRequest::new(device).build()) {
        Ok(output) => {
            messages.push(format!("Cleared interface {device}"));
            push_output(&mut messages, &output.stdout);
        }
        Err(e) => {
            tracing::debug!(device, error = %e, "qdisc del failed");
            messages.push(format!("(Ignore) Error at qdisc del: {e}"));
            messages.push(format!("Cleared interface {device}"));
            push_output(&mut messages, e.stdout());
        }
    }

    if policy.is_noop() {
        tracing::info!(device, "impairment cleared");
        return messages.join("\n");
    }

    messages.push(format!("Policy for interface {device}: {policy}"));

    match shaper.run(&QdiscNetemRequest::new(device, policy).build()) {
        Ok(output) => {
            tracing::info!(device, %policy, "impairment applied");
            push_output(&mut messages, &output.stdout);
        }
        Err(e) => {
            tracing::error!(device, %policy, error = %e, "qdisc add failed");
            push_output(&mut messages, e.stdout());
            messages.push(format!("Error at qdisc add: {e}"));
        }
    }

    messages.join("\n")
}
