use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::config::ToolConfig;
use crate::contract::{RemotePath, TransferError, Transferer};

/// Runs `gsutil` (or a compatible tool) as a subprocess, one argument vector per call.
#[derive(Debug, Clone)]
pub struct GsutilTransfer {
    program: PathBuf,
    parallel: bool,
}

impl GsutilTransfer {
    pub fn new(tool: &ToolConfig) -> Self {
        Self {
            program: tool.program.clone(),
            parallel: tool.parallel,
        }
    }

    /// `[-m] cp <flag> <local> <remote>`
    fn cp_args(&self, flag: &str, local: &Path, remote: &RemotePath) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(5);
        if self.parallel {
            args.push("-m".into());
        }
        args.push("cp".into());
        args.push(flag.into());
        args.push(local.as_os_str().to_owned());
        args.push(remote.as_str().into());
        args
    }

    async fn execute(&self, args: Vec<OsString>) -> Result<(), TransferError> {
        let command = std::iter::once(self.program.as_os_str())
            .chain(args.iter().map(OsString::as_os_str))
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");
        debug!(command = %command, "Launching transfer tool");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|source| {
                error!(error = ?source, program = %self.program.display(), "Failed to launch transfer tool");
                TransferError::Launch {
                    program: self.program.display().to_string(),
                    source,
                }
            })?;

        if output.status.success() {
            info!(command = %command, "Transfer tool finished");
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        error!(
            command = %command,
            status = ?output.status,
            stderr = %stderr,
            "Transfer tool exited with non-zero status"
        );
        Err(TransferError::Failed {
            command,
            code: output.status.code(),
            stderr,
        })
    }
}

#[async_trait]
impl Transferer for GsutilTransfer {
    async fn copy_if_absent(
        &self,
        local: &Path,
        remote: &RemotePath,
    ) -> Result<(), TransferError> {
        self.execute(self.cp_args("-n", local, remote)).await
    }

    async fn copy_tree(&self, local: &Path, remote: &RemotePath) -> Result<(), TransferError> {
        self.execute(self.cp_args("-r", local, remote)).await
    }
}
