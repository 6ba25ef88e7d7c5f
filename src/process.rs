//! Process id discovery by program name.

use std::collections::BTreeSet;

use tracing::debug;

use crate::host::Host;

/// Utility printing the pids of a running program
const PIDOF: &str = "/sbin/pidof";

/// Set of process ids, kept as printed by `pidof`
pub type PidSet = BTreeSet<String>;

/// Get all pids of `program`; empty if it isn't running or `pidof` fails
pub fn pid_set(host: &mut dyn Host, program: &str) -> PidSet {
    match host.capture(PIDOF, &[program.to_string()]) {
        Ok(output) => parse_pids(&output),
        Err(e) => {
            // pidof exits 1 when nothing matches, so this is the usual "none running" path
            debug!("{} {}: {}", PIDOF, program, e);
            PidSet::new()
        }
    }
}

/// Split whitespace-separated pids
pub fn parse_pids(output: &str) -> PidSet {
    output.split_whitespace().map(str::to_string).collect()
}
