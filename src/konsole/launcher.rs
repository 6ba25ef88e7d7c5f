//! Starting Konsole and identifying the new instance.

use thiserror::Error;
use tracing::info;

use super::{Konsole, Timing};
use crate::host::Host;
use crate::process::{pid_set, PidSet};

/// Process name to look for
const PROGRAM_NAME: &str = "konsole";

/// Starts a Konsole with DCOP scripting enabled
const START_COMMAND: (&str, &[&str]) = ("kstart", &["konsole", "--script"]);

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("couldn't get PID of the new Konsole: expected exactly one new process, found {}", new_pids.len())]
    Ambiguous { new_pids: PidSet },
}

/// Launch Konsole and return a handle addressed by its pid.
///
/// The pid is the single entry in (after - before). Any other Konsole that
/// starts or exits inside the settle window makes this fail.
pub fn launch(host: &mut dyn Host, timing: &Timing) -> Result<Konsole, LaunchError> {
    let before = pid_set(host, PROGRAM_NAME);
    info!("pids before launch: {:?}", before);

    let (program, args) = START_COMMAND;
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    host.run(program, &args);
    host.sleep(timing.launch_settle);

    let after = pid_set(host, PROGRAM_NAME);
    info!("pids after launch: {:?}", after);

    let mut new_pids = after.difference(&before);
    match (new_pids.next(), new_pids.next()) {
        (Some(pid), None) => {
            info!("New Konsole pid: {}", pid);
            Ok(Konsole::new(pid.as_str()))
        }
        _ => Err(LaunchError::Ambiguous {
            new_pids: after.difference(&before).cloned().collect(),
        }),
    }
}
