// systemd service control via systemctl / journalctl subprocesses

mod parse;

use crate::error::ServiceError;
use crate::models::{ServiceAction, ServiceDetail, ServiceRecord};
use futures_util::future::BoxFuture;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Journal lines embedded in the service detail view.
pub const DETAIL_LOG_LINES: &str = "50";
/// Journal lines returned by the logs endpoint when `lines` is not given.
pub const DEFAULT_LOG_LINES: &str = "100";

/// `systemctl status` exits 3 for units that are loaded but not running.
const STATUS_EXIT_INACTIVE: i32 = 3;

/// Captured result of one finished subprocess.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// The subprocess boundary. Everything systemd-specific above it is plain text parsing.
pub trait CommandRunner: Send + Sync {
    fn run<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
    ) -> BoxFuture<'a, std::io::Result<CommandOutput>>;
}

/// Runs real processes. The child is killed if the caller stops waiting (e.g. the HTTP
/// client disconnects during `journalctl -f`).
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
    ) -> BoxFuture<'a, std::io::Result<CommandOutput>> {
        Box::pin(async move {
            let output = tokio::process::Command::new(program)
                .args(args)
                .kill_on_drop(true)
                .output()
                .await?;
            Ok(CommandOutput {
                code: output.status.code(),
                stdout: output.stdout,
                stderr: output.stderr,
            })
        })
    }
}

pub struct SystemdRepo {
    runner: Arc<dyn CommandRunner>,
}

impl Default for SystemdRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemdRepo {
    pub fn new() -> Self {
        Self::with_runner(Arc::new(ProcessRunner))
    }

    pub fn with_runner(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// All service units, running first, then by sub state, then by name.
    #[instrument(skip(self), fields(repo = "systemd", operation = "list_services"))]
    pub async fn list_services(&self) -> Result<Vec<ServiceRecord>, ServiceError> {
        let out = self
            .run_checked(
                "systemctl",
                &[
                    "list-units",
                    "--type=service",
                    "--all",
                    "--no-pager",
                    "--no-legend",
                ],
            )
            .await?;
        let mut services = parse::parse_list_units(&String::from_utf8_lossy(&out.stdout));
        parse::sort_services(&mut services);
        Ok(services)
    }

    /// Status text, `systemctl show` properties and the last journal lines for one unit.
    /// Only the status call is required; missing properties or logs leave those parts empty.
    #[instrument(skip(self), fields(repo = "systemd", operation = "service_detail"))]
    pub async fn service_detail(&self, name: &str) -> Result<ServiceDetail, ServiceError> {
        check_unit_name(name)?;

        let status_out = self
            .run(
                "systemctl",
                &["status", name, "--no-pager", "--lines=0"],
            )
            .await?;
        if !(status_out.success() || status_out.code == Some(STATUS_EXIT_INACTIVE)) {
            return Err(failed("systemctl", &status_out));
        }
        let status = String::from_utf8_lossy(&status_out.stdout).into_owned();
        let mut service = parse::parse_status(name, &status);

        let properties = match self.run_checked("systemctl", &["show", name, "--no-pager"]).await {
            Ok(out) => parse::parse_show(&String::from_utf8_lossy(&out.stdout)),
            Err(e) => {
                warn!("systemctl show {} failed: {}", name, e);
                Default::default()
            }
        };
        parse::apply_properties(&mut service, &properties);

        let logs = match self.journal(name, DETAIL_LOG_LINES, false).await {
            Ok(text) => parse::journal_lines(&text),
            Err(e) => {
                warn!("journalctl for {} failed: {}", name, e);
                Vec::new()
            }
        };

        Ok(ServiceDetail {
            service,
            status,
            logs,
            properties,
        })
    }

    /// Raw journal text for a unit. With `follow` the flag is handed to journalctl and the
    /// call completes only when the subprocess exits.
    #[instrument(skip(self), fields(repo = "systemd", operation = "service_logs"))]
    pub async fn service_logs(
        &self,
        name: &str,
        lines: Option<&str>,
        follow: bool,
    ) -> Result<String, ServiceError> {
        check_unit_name(name)?;
        let lines = lines.filter(|l| !l.is_empty()).unwrap_or(DEFAULT_LOG_LINES);
        self.journal(name, lines, follow).await
    }

    #[instrument(skip(self), fields(repo = "systemd", operation = "control"))]
    pub async fn control(&self, name: &str, action: ServiceAction) -> Result<(), ServiceError> {
        check_unit_name(name)?;
        self.run_checked("systemctl", &[action.verb(), name]).await?;
        tracing::info!("systemctl {} {}", action, name);
        Ok(())
    }

    async fn journal(&self, name: &str, lines: &str, follow: bool) -> Result<String, ServiceError> {
        let mut args = vec!["-u", name, "--no-pager", "-n", lines];
        if follow {
            args.push("-f");
        }
        args.push("--output=short");
        let out = self.run_checked("journalctl", &args).await?;
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }

    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ServiceError> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.runner
            .run(program, &args)
            .await
            .map_err(|source| ServiceError::Spawn {
                program: program.to_string(),
                source,
            })
    }

    async fn run_checked(
        &self,
        program: &str,
        args: &[&str],
    ) -> Result<CommandOutput, ServiceError> {
        let out = self.run(program, args).await?;
        if out.success() {
            Ok(out)
        } else {
            Err(failed(program, &out))
        }
    }
}

fn failed(program: &str, out: &CommandOutput) -> ServiceError {
    ServiceError::Failed {
        program: program.to_string(),
        status: match out.code {
            Some(code) => format!("exit status {}", code),
            None => "signal".to_string(),
        },
        stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
    }
}

/// Unit names go straight into argv; refuse anything that would parse as an option.
fn check_unit_name(name: &str) -> Result<(), ServiceError> {
    if name.is_empty() || name.starts_with('-') {
        return Err(ServiceError::InvalidName(name.to_string()));
    }
    Ok(())
}
