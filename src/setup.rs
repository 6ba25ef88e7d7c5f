//! A full konsole-tabs run, start to finish.

use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Config, TabSpec};
use crate::history::{with_swapped_history, HistoryError};
use crate::host::Host;
use crate::konsole::{self, Konsole, LaunchError, Timing, FIRST_TAB, PLACEHOLDER_TAB};

#[derive(Error, Debug)]
pub enum SetupError {
    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Launch Konsole and lay out every configured tab
pub fn run(
    host: &mut dyn Host,
    config: &Config,
    home: &Path,
    timing: &Timing,
) -> Result<Konsole, SetupError> {
    let konsole = konsole::launch(host, timing)?;

    create_tabs(host, &konsole, &config.tabs, home, timing)?;

    for (index, tab) in tab_indices(&config.tabs) {
        konsole.rename_tab(host, index, &tab.name);
    }

    for command in &config.common_commands {
        konsole.send_to_all_tabs(host, command);
    }

    for (index, tab) in tab_indices(&config.tabs) {
        for command in &tab.commands {
            konsole.send_to_tab(host, index, command);
        }
    }

    host.sleep(timing.close_settle);
    konsole.close_tab(host, PLACEHOLDER_TAB);

    info!("Konsole {} ready with {} tabs", konsole.pid(), config.tabs.len());
    Ok(konsole)
}

/// Open one tab per `TabSpec`, each starting with its own history
fn create_tabs(
    host: &mut dyn Host,
    konsole: &Konsole,
    tabs: &[TabSpec],
    home: &Path,
    timing: &Timing,
) -> Result<(), HistoryError> {
    with_swapped_history(home, |swap| {
        debug!("Seeding {} for {} tabs", swap.path().display(), tabs.len());
        tabs.iter().try_for_each(|tab| {
            swap.seed(&tab.history)?;
            konsole.create_tab(host);
            host.sleep(timing.tab_settle);
            swap.clear()
        })
    })
}

fn tab_indices(tabs: &[TabSpec]) -> impl Iterator<Item = (usize, &TabSpec)> {
    tabs.iter().enumerate().map(|(i, tab)| (FIRST_TAB + i, tab))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{HISTORY_BACKUP_FILENAME, HISTORY_FILENAME};
    use crate::host::testing::{Call, RecordingHost};
    use std::fs;
    use std::time::Duration;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn example_config() -> Config {
        Config {
            tabs: vec![
                TabSpec::new("build", &[], &["make -j8"]),
                TabSpec::new("run", &["./start.sh"], &[]),
            ],
            common_commands: vec!["source env.sh".to_string()],
        }
    }

    fn launching_host(home: &Path) -> RecordingHost {
        let mut host = RecordingHost::with_outputs(&[Some("10\n"), Some("10 77\n")]);
        host.history_path = Some(home.join(HISTORY_FILENAME));
        host
    }

    #[test]
    fn test_example_scenario() {
        let home = tempfile::tempdir().unwrap();
        fs::write(home.path().join(HISTORY_FILENAME), "git status\n").unwrap();
        let mut host = launching_host(home.path());

        let konsole = run(&mut host, &example_config(), home.path(), &Timing::zero()).unwrap();
        assert_eq!(konsole.pid(), "77");

        assert_eq!(
            host.dcop_calls(),
            vec![
                argv(&["konsole-77", "konsole", "newSession"]),
                argv(&["konsole-77", "konsole", "newSession"]),
                argv(&["konsole-77", "session-2", "renameSession", "build"]),
                argv(&["konsole-77", "session-3", "renameSession", "run"]),
                argv(&["konsole-77", "konsole", "sendAllSessions", "source env.sh"]),
                argv(&["konsole-77", "session-3", "sendSession", "./start.sh"]),
                argv(&["konsole-77", "session-1", "closeSession"]),
            ]
        );
        assert_eq!(
            host.seeded,
            vec![Some("make -j8\n".to_string()), Some(String::new())]
        );
        assert_eq!(
            fs::read_to_string(home.path().join(HISTORY_FILENAME)).unwrap(),
            "git status\n"
        );
        assert!(!home.path().join(HISTORY_BACKUP_FILENAME).exists());
    }

    #[test]
    fn test_ordering_and_addressing() {
        let home = tempfile::tempdir().unwrap();
        let config = Config {
            tabs: vec![
                TabSpec::new("a", &["a1", "a2"], &["ha1", "ha2"]),
                TabSpec::new("b", &[], &[]),
                TabSpec::new("c", &["c1"], &["hc1"]),
            ],
            common_commands: vec!["common1".to_string(), "common2".to_string()],
        };
        let mut host = launching_host(home.path());

        run(&mut host, &config, home.path(), &Timing::zero()).unwrap();
        let calls = host.dcop_calls();
        let ops: Vec<&str> = calls.iter().map(|c| c[2].as_str()).collect();

        assert_eq!(
            ops,
            vec![
                "newSession",
                "newSession",
                "newSession",
                "renameSession",
                "renameSession",
                "renameSession",
                "sendAllSessions",
                "sendAllSessions",
                "sendSession",
                "sendSession",
                "sendSession",
                "closeSession",
            ]
        );
        assert_eq!(calls[3], argv(&["konsole-77", "session-2", "renameSession", "a"]));
        assert_eq!(calls[4], argv(&["konsole-77", "session-3", "renameSession", "b"]));
        assert_eq!(calls[5], argv(&["konsole-77", "session-4", "renameSession", "c"]));
        assert_eq!(calls[6][3], "common1");
        assert_eq!(calls[7][3], "common2");
        assert_eq!(calls[8], argv(&["konsole-77", "session-2", "sendSession", "a1"]));
        assert_eq!(calls[9], argv(&["konsole-77", "session-2", "sendSession", "a2"]));
        assert_eq!(calls[10], argv(&["konsole-77", "session-4", "sendSession", "c1"]));

        assert_eq!(
            host.seeded,
            vec![
                Some("ha1\nha2\n".to_string()),
                Some(String::new()),
                Some("hc1\n".to_string()),
            ]
        );
    }

    #[test]
    fn test_settle_delays() {
        let home = tempfile::tempdir().unwrap();
        let mut host = launching_host(home.path());

        run(&mut host, &example_config(), home.path(), &Timing::default()).unwrap();
        let sleeps: Vec<Duration> = host
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Sleep(d) => Some(*d),
                _ => None,
            })
            .collect();

        assert_eq!(
            sleeps,
            vec![
                Duration::from_secs(1),
                Duration::from_millis(500),
                Duration::from_millis(500),
                Duration::from_secs(1),
            ]
        );
        // The last sleep sits right before closing the placeholder
        let n = host.calls.len();
        assert_eq!(host.calls[n - 2], Call::Sleep(Duration::from_secs(1)));
    }

    #[test]
    fn test_missing_history_restored_empty() {
        let home = tempfile::tempdir().unwrap();
        let mut host = launching_host(home.path());

        run(&mut host, &example_config(), home.path(), &Timing::zero()).unwrap();

        assert_eq!(fs::read(home.path().join(HISTORY_FILENAME)).unwrap(), b"");
        assert!(!home.path().join(HISTORY_BACKUP_FILENAME).exists());
    }

    #[test]
    fn test_no_tabs() {
        let home = tempfile::tempdir().unwrap();
        let config = Config { tabs: vec![], common_commands: vec!["x".to_string()] };
        let mut host = launching_host(home.path());

        run(&mut host, &config, home.path(), &Timing::zero()).unwrap();
        assert_eq!(
            host.dcop_calls(),
            vec![
                argv(&["konsole-77", "konsole", "sendAllSessions", "x"]),
                argv(&["konsole-77", "session-1", "closeSession"]),
            ]
        );
    }

    #[test]
    fn test_ambiguous_launch_creates_nothing() {
        let home = tempfile::tempdir().unwrap();
        fs::write(home.path().join(HISTORY_FILENAME), "keep me\n").unwrap();

        for outputs in [[Some("10"), Some("10")], [Some("10"), Some("10 11 12")]] {
            let mut host = RecordingHost::with_outputs(&outputs);
            let err = run(&mut host, &example_config(), home.path(), &Timing::zero()).unwrap_err();

            assert!(matches!(err, SetupError::Launch(LaunchError::Ambiguous { .. })));
            assert!(host.dcop_calls().is_empty());
        }
        assert_eq!(
            fs::read_to_string(home.path().join(HISTORY_FILENAME)).unwrap(),
            "keep me\n"
        );
        assert!(!home.path().join(HISTORY_BACKUP_FILENAME).exists());
    }

    #[test]
    fn test_leftover_backup_stops_tab_creation() {
        let home = tempfile::tempdir().unwrap();
        let backup = home.path().join(HISTORY_BACKUP_FILENAME);
        fs::write(&backup, "precious\n").unwrap();
        let mut host = launching_host(home.path());

        let err = run(&mut host, &example_config(), home.path(), &Timing::zero()).unwrap_err();

        assert!(matches!(err, SetupError::History(HistoryError::BackupExists(_))));
        assert!(host.dcop_calls().is_empty());
        assert_eq!(fs::read_to_string(&backup).unwrap(), "precious\n");
    }

    #[test]
    fn test_unrestorable_history_names_backup() {
        let home = tempfile::tempdir().unwrap();
        fs::write(home.path().join(HISTORY_FILENAME), "git status\n").unwrap();
        let mut host = launching_host(home.path());
        host.obstruct_history = true;

        let err = run(&mut host, &example_config(), home.path(), &Timing::zero()).unwrap_err();

        assert!(matches!(err, SetupError::History(HistoryError::NotRestored { .. })));
        assert!(err.to_string().contains(".history.tempbackup"));
        // The loop stops at the first tab and nothing after it is sent
        assert_eq!(host.dcop_calls().len(), 1);
        assert_eq!(
            fs::read_to_string(home.path().join(HISTORY_BACKUP_FILENAME)).unwrap(),
            "git status\n"
        );
    }
}
