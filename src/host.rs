//! External process and timing seam.
//!
//! Everything konsole-tabs does to the outside world (spawning `kstart`,
//! `pidof` and `dcop`, and waiting for Konsole to catch up) goes through
//! [`Host`], so a run can be replayed against a recorder in tests.

use std::io;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

pub trait Host {
    /// Run a program to completion, ignoring its exit status
    fn run(&mut self, program: &str, args: &[String]);

    /// Run a program and return its stdout; non-zero exit is an error
    fn capture(&mut self, program: &str, args: &[String]) -> io::Result<String>;

    /// Block for a fixed settle delay
    fn sleep(&mut self, duration: Duration);
}

/// Host backed by real processes and real sleeps
#[derive(Debug, Default)]
pub struct SystemHost;

impl Host for SystemHost {
    fn run(&mut self, program: &str, args: &[String]) {
        debug!("run: {} {:?}", program, args);
        match Command::new(program).args(args).stdin(Stdio::null()).status() {
            Ok(status) => debug!("{} exited with {}", program, status),
            Err(e) => warn!("Failed to run {}: {}", program, e),
        }
    }

    fn capture(&mut self, program: &str, args: &[String]) -> io::Result<String> {
        debug!("capture: {} {:?}", program, args);
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()?;
        if !output.status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} exited with {}", program, output.status),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}
