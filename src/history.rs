//! Per-tab shell history seeding.
//!
//! A new Konsole tab starts a shell that reads `~/.history`. To give each tab
//! its own history, the user's file is moved aside, the file is rewritten
//! for each tab just before it opens, and the original is moved back once
//! every tab exists.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

/// History file name, relative to the home directory
pub const HISTORY_FILENAME: &str = ".history";

/// Where the user's history is parked while tabs are created
pub const HISTORY_BACKUP_FILENAME: &str = ".history.tempbackup";

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("{} already exists, left by an interrupted run; move it back to ~/.history or delete it", .0.display())]
    BackupExists(PathBuf),

    #[error("failed to seed tab history: {0}")]
    Io(#[from] io::Error),

    #[error("failed to restore history; it is still at {}: {source}", backup.display())]
    NotRestored {
        backup: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The user's history file, moved aside for the duration of tab creation
#[derive(Debug)]
pub struct HistorySwap {
    path: PathBuf,
    backup: PathBuf,
}

impl HistorySwap {
    /// Move `~/.history` to its backup name, creating it empty first if needed.
    ///
    /// Refuses to start over an existing backup, which holds the real history
    /// of a run that never got to restore it.
    pub fn begin(home: &Path) -> Result<Self, HistoryError> {
        let swap = Self {
            path: home.join(HISTORY_FILENAME),
            backup: home.join(HISTORY_BACKUP_FILENAME),
        };

        if swap.backup.symlink_metadata().is_ok() {
            return Err(HistoryError::BackupExists(swap.backup));
        }
        if !swap.path.exists() {
            File::create(&swap.path)?;
        }
        fs::rename(&swap.path, &swap.backup)?;
        Ok(swap)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the history file with `commands`, one per line
    pub fn seed(&self, commands: &[String]) -> io::Result<()> {
        let mut file = File::create(&self.path)?;
        for command in commands {
            info!("history: {}", command);
            writeln!(file, "{}", command)?;
        }
        file.flush()
    }

    /// Remove the seeded file once its tab has read it
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    /// Put the user's history back
    pub fn finish(self) -> Result<(), HistoryError> {
        fs::rename(&self.backup, &self.path).map_err(|source| HistoryError::NotRestored {
            backup: self.backup,
            source,
        })
    }
}

/// Run `seed_tabs` with the user's history moved aside, restoring it afterwards
/// even when `seed_tabs` fails.
///
/// If both fail, the restore error is returned and the seed error is logged.
pub fn with_swapped_history<F>(home: &Path, seed_tabs: F) -> Result<(), HistoryError>
where
    F: FnOnce(&HistorySwap) -> io::Result<()>,
{
    let swap = HistorySwap::begin(home)?;
    let seeded = seed_tabs(&swap);

    match (seeded, swap.finish()) {
        (Ok(()), restored) => restored,
        (Err(e), Ok(())) => Err(e.into()),
        (Err(e), Err(not_restored)) => {
            warn!("failed to seed tab history: {}", e);
            Err(not_restored)
        }
    }
}
