//! Konsole remote control.
//!
//! Konsole is driven entirely through DCOP:
//!
//! - **launcher**: starts a scriptable Konsole and finds its pid
//! - **Konsole**: tab commands addressed to `konsole-<pid>`
//!
//! # Tab indices
//!
//! DCOP gives back no handle for a new session, so tabs are addressed by
//! position. The window opens with the placeholder at index 1; tabs created
//! afterwards take 2, 3, ... in creation order.

pub mod launcher;

use std::time::Duration;

use tracing::info;

use crate::host::Host;

pub use launcher::{launch, LaunchError};

/// Remote-control utility
const DCOP: &str = "dcop";

/// Index of the tab Konsole opens with
pub const PLACEHOLDER_TAB: usize = 1;

/// Index of the first tab we create
pub const FIRST_TAB: usize = 2;

/// Fixed settle delays around asynchronous Konsole state changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// After launching, before looking for the new pid
    pub launch_settle: Duration,
    /// After each new tab
    pub tab_settle: Duration,
    /// Before closing the placeholder tab
    pub close_settle: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            launch_settle: Duration::from_secs(1),
            tab_settle: Duration::from_millis(500),
            close_settle: Duration::from_secs(1),
        }
    }
}

impl Timing {
    #[cfg(test)]
    pub fn zero() -> Self {
        Self {
            launch_settle: Duration::ZERO,
            tab_settle: Duration::ZERO,
            close_settle: Duration::ZERO,
        }
    }
}

/// A running Konsole instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Konsole {
    pid: String,
}

impl Konsole {
    pub fn new(pid: impl Into<String>) -> Self {
        Self { pid: pid.into() }
    }

    pub fn pid(&self) -> &str {
        &self.pid
    }

    /// Open a new tab (session)
    pub fn create_tab(&self, host: &mut dyn Host) {
        self.dcop(host, &["konsole", "newSession"]);
    }

    /// Set a tab's title
    pub fn rename_tab(&self, host: &mut dyn Host, index: usize, name: &str) {
        info!("Tab {} -> {}", index, name);
        self.dcop(host, &[session(index).as_str(), "renameSession", name]);
    }

    /// Type a command into one tab
    pub fn send_to_tab(&self, host: &mut dyn Host, index: usize, command: &str) {
        self.dcop(host, &[session(index).as_str(), "sendSession", command]);
    }

    /// Type a command into every tab
    pub fn send_to_all_tabs(&self, host: &mut dyn Host, command: &str) {
        self.dcop(host, &["konsole", "sendAllSessions", command]);
    }

    /// Close one tab
    pub fn close_tab(&self, host: &mut dyn Host, index: usize) {
        self.dcop(host, &[session(index).as_str(), "closeSession"]);
    }

    fn dcop(&self, host: &mut dyn Host, args: &[&str]) {
        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(format!("konsole-{}", self.pid));
        argv.extend(args.iter().map(|a| a.to_string()));
        host.run(DCOP, &argv);
    }
}

fn session(index: usize) -> String {
    format!("session-{}", index)
}
