//! Service control backed by `systemctl`.

use std::process::Command;

use gatecfg_config::ServiceControl;
use tracing::{debug, warn};

/// Reloads services through `systemctl try-reload-or-restart`.
pub struct SystemServiceControl;

impl ServiceControl for SystemServiceControl {
    fn reconfigure(&self, service: &str) -> bool {
        debug!(service, "reloading service");
        match Command::new("systemctl")
            .args(["try-reload-or-restart", service])
            .status()
        {
            Ok(status) if status.success() => true,
            Ok(status) => {
                warn!(service, %status, "systemctl reported failure");
                false
            }
            Err(e) => {
                warn!(service, error = %e, "could not run systemctl");
                false
            }
        }
    }
}

/// Leaves services alone; used with `--no-reload`.
pub struct NoReload;

impl ServiceControl for NoReload {
    fn reconfigure(&self, service: &str) -> bool {
        debug!(service, "not reloading (--no-reload)");
        true
    }
}
