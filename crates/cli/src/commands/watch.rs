//! Follow changes made by other processes sharing the data directory.

use std::io::Write;
use std::thread;
use std::time::Duration;

use tokio::sync::broadcast::error::TryRecvError;
use tracing::{debug, warn};

use salesdesk_admin::db::{ChangeOrigin, StorageEvent};
use salesdesk_admin::state::AppState;

use super::{CommandError, app_err};

/// Poll for external changes every `interval_secs`, printing one line per
/// changed slot. Runs until interrupted, or for `checks` rounds if given.
///
/// # Errors
///
/// Returns an error if the data directory cannot be scanned.
pub fn run(
    state: &AppState,
    interval_secs: u64,
    checks: Option<u64>,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let mut events = state.storage().subscribe();
    let interval = Duration::from_secs(interval_secs);
    let mut round = 0_u64;

    writeln!(out, "Watching {}", state.config().data_dir.display())?;
    out.flush()?;
    loop {
        state.storage().poll_external().map_err(app_err)?;
        loop {
            match events.try_recv() {
                Ok(event) => report(out, &event)?,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "missed change notifications");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        out.flush()?;

        round += 1;
        if checks.is_some_and(|limit| round >= limit) {
            return Ok(());
        }
        debug!(round, "waiting for changes");
        thread::sleep(interval);
    }
}

fn report(out: &mut dyn Write, event: &StorageEvent) -> Result<(), CommandError> {
    let origin = match event.origin {
        ChangeOrigin::Local => "local",
        ChangeOrigin::External => "external",
    };
    writeln!(out, "{} changed ({origin}, {})", event.key, event.revision)?;
    Ok(())
}
