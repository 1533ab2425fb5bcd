//! External daemon control.
//!
//! The engine never links against fetchmail or Dovecot; it talks to them
//! through three configurable commands: a Dovecot config dry-run check and
//! one reload signal per daemon. Each is a single boolean-result call. An
//! empty argv disables that call (useful in tests and partial deployments).

use std::path::Path;
use std::time::Duration;

use mailharbor_common::PlatformError;
use tokio::process::Command;
use tracing::{debug, warn};

/// Handle to the downstream daemons' control commands.
#[derive(Debug, Clone)]
pub struct DaemonControl {
    timeout: Duration,
    check_dovecot: Vec<String>,
    reload_dovecot: Vec<String>,
    reload_fetchmail: Vec<String>,
}

impl DaemonControl {
    pub fn new(
        timeout: Duration,
        check_dovecot: Vec<String>,
        reload_dovecot: Vec<String>,
        reload_fetchmail: Vec<String>,
    ) -> Self {
        Self {
            timeout,
            check_dovecot,
            reload_dovecot,
            reload_fetchmail,
        }
    }

    /// Dry-run the committed Dovecot config (`doveconf -n -c <path>` by
    /// default). `Ok(true)` means the daemon would accept it.
    pub async fn check_dovecot(&self, conf_path: &Path) -> Result<bool, PlatformError> {
        let conf = conf_path.to_string_lossy();
        self.run("dovecot config check", &self.check_dovecot, &[conf.as_ref()])
            .await
    }

    /// Tell Dovecot its configuration changed.
    pub async fn reload_dovecot(&self) -> Result<bool, PlatformError> {
        self.run("dovecot reload", &self.reload_dovecot, &[]).await
    }

    /// Tell the fetch agent its configuration changed.
    pub async fn reload_fetchmail(&self) -> Result<bool, PlatformError> {
        self.run("fetchmail reload", &self.reload_fetchmail, &[])
            .await
    }

    async fn run(
        &self,
        label: &str,
        argv: &[String],
        extra: &[&str],
    ) -> Result<bool, PlatformError> {
        let Some((program, args)) = argv.split_first() else {
            debug!("{label}: no command configured, skipping");
            return Ok(true);
        };

        let mut cmd = Command::new(program);
        cmd.args(args).args(extra).kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Err(_) => {
                return Err(PlatformError::Timeout(format!(
                    "{label} ({program}) exceeded {:?}",
                    self.timeout
                )));
            }
            Ok(Err(e)) => {
                return Err(PlatformError::ProcessError(format!(
                    "{label}: failed to spawn {program}: {e}"
                )));
            }
            Ok(Ok(output)) => output,
        };

        if output.status.success() {
            debug!("{label}: ok");
            Ok(true)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                "{label}: {program} exited with {} — {}",
                output.status,
                stderr.trim()
            );
            Ok(false)
        }
    }
}
