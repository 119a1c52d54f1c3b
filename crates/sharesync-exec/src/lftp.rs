//! lftp script construction and the mirror executor
//!
//! Every lftp session is one child process fed a script on stdin. The
//! password never appears in the script or on the command line: `open`
//! uses `--env-password` and the secret travels in `LFTP_PASSWORD`.
//!
//! ## Pass layout
//!
//! ```text
//! share → transfer:  mirror --reverse <mount_point> <remote_root>   (upload)
//! transfer → share:  mirror <remote_root> <mount_point>             (download)
//! ```

use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::Context;
use async_trait::async_trait;
use sharesync_core::{
    domain::{Credential, Direction, EndpointConfig, MirrorFlags, SlotKind},
    ports::{IMirrorExecutor, MirrorEndpoint, MirrorOutcome},
};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, instrument};

use crate::error::AdapterError;
use crate::share;

/// Environment variable lftp reads for `open --env-password`
pub const PASSWORD_ENV: &str = "LFTP_PASSWORD";

/// Transfer protocol spoken by lftp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Ftp,
    Sftp,
}

impl Protocol {
    pub fn parse(value: &str) -> Result<Self, AdapterError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ftp" => Ok(Protocol::Ftp),
            "sftp" => Ok(Protocol::Sftp),
            other => Err(AdapterError::UnsupportedProtocol(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Ftp => "ftp",
            Protocol::Sftp => "sftp",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Protocol::Ftp => 21,
            Protocol::Sftp => 22,
        }
    }
}

/// Validated connection settings of the transfer slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSettings {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
    /// Directory on the server that passes mirror to and from
    pub remote_root: String,
    pub credential: Option<Credential>,
}

impl TransferSettings {
    /// Reads settings from a transfer endpoint config
    ///
    /// Recognised keys: `server` (required), `protocol` (ftp by default),
    /// `port` (protocol default), `remote_path` (`default_root` otherwise).
    pub fn from_config(config: &EndpointConfig, default_root: &str) -> Result<Self, AdapterError> {
        let host = config
            .get_str("server")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(AdapterError::MissingField("server"))?;
        if host.chars().any(char::is_whitespace) {
            return Err(AdapterError::InvalidValue {
                field: "server",
                value: host.to_string(),
                reason: "must not contain whitespace".into(),
            });
        }

        let protocol = config
            .get_str("protocol")
            .map(Protocol::parse)
            .transpose()?
            .unwrap_or(Protocol::Ftp);

        let port = match config.get("port") {
            None => protocol.default_port(),
            Some(raw) => config
                .get_u64("port")
                .and_then(|p| u16::try_from(p).ok())
                .filter(|p| *p != 0)
                .ok_or_else(|| AdapterError::InvalidValue {
                    field: "port",
                    value: raw.to_string(),
                    reason: "expected a number between 1 and 65535".into(),
                })?,
        };

        let remote_root = config
            .get_str("remote_path")
            .unwrap_or(default_root)
            .to_string();

        Ok(Self {
            protocol,
            host: host.to_string(),
            port,
            remote_root,
            credential: config.credential().cloned(),
        })
    }

    /// `open` command for this endpoint; carries no secret
    fn open_command(&self) -> String {
        let url = format!("{}://{}", self.protocol.as_str(), self.host);
        match &self.credential {
            Some(credential) => format!(
                "open -u {} --env-password -p {} {}",
                quote(&credential.username),
                self.port,
                quote(&url)
            ),
            None => format!("open -p {} {}", self.port, quote(&url)),
        }
    }
}

/// Quotes one lftp command argument
pub(crate) fn quote(arg: &str) -> String {
    let escaped = arg.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// An lftp command script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LftpScript {
    lines: Vec<String>,
}

impl LftpScript {
    /// Starts a script with the listing options every session uses
    pub fn for_session(settings: &TransferSettings, compress: bool) -> Self {
        let mut script = Self::default();
        script.push("set ftp:list-options -a");
        if compress {
            match settings.protocol {
                Protocol::Ftp => script.push("set ftp:use-mode-z true"),
                Protocol::Sftp => script.push("set sftp:connect-program \"ssh -a -x -C\""),
            }
        }
        script.push(settings.open_command());
        script
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Appends the mirror command for one pass
    pub fn mirror(&mut self, flags: &MirrorFlags, mount_point: &Path, remote_root: &str) {
        let mut line = String::from("mirror --verbose");
        if flags.direction == Direction::ShareToTransfer {
            line.push_str(" --reverse");
        }
        if flags.delete_extraneous {
            line.push_str(" --delete");
        }
        if !flags.preserve_attributes {
            line.push_str(" --no-perms");
        }
        let local = quote(&mount_point.to_string_lossy());
        let remote = quote(remote_root);
        match flags.direction {
            Direction::ShareToTransfer => line.push_str(&format!(" {local} {remote}")),
            Direction::TransferToShare => line.push_str(&format!(" {remote} {local}")),
        }
        self.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Full script text, terminated with `quit`
    pub fn render(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push_str("\nquit\n");
        text
    }
}

/// Captured result of one lftp session
#[derive(Debug)]
pub(crate) struct SessionOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs `script` through `binary` and waits for it to exit
///
/// The child is killed if the returned future is dropped.
pub(crate) async fn run_session(
    binary: &str,
    script: &LftpScript,
    credential: Option<&Credential>,
) -> Result<SessionOutput, AdapterError> {
    let mut command = Command::new(binary);
    command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(credential) = credential {
        command.env(PASSWORD_ENV, &credential.password);
    }

    let launch = |source| AdapterError::Launch {
        tool: binary.to_string(),
        source,
    };
    let mut child = command.spawn().map_err(launch)?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(script.render().as_bytes())
            .await
            .map_err(launch)?;
        // Dropping stdin closes it so lftp sees end of script
    }

    let output = child.wait_with_output().await.map_err(launch)?;
    Ok(SessionOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// [`IMirrorExecutor`] that drives `lftp mirror`
#[derive(Debug, Clone)]
pub struct LftpMirrorExecutor {
    binary: String,
    default_remote_root: String,
}

impl LftpMirrorExecutor {
    pub fn new(binary: impl Into<String>, default_remote_root: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            default_remote_root: default_remote_root.into(),
        }
    }

    /// Builds the script for one pass without running it
    pub fn script_for(
        &self,
        source: &MirrorEndpoint,
        destination: &MirrorEndpoint,
        flags: &MirrorFlags,
    ) -> Result<(LftpScript, TransferSettings), AdapterError> {
        let (share, transfer) = match (source.kind, destination.kind) {
            (SlotKind::Share, SlotKind::Transfer) => (source, destination),
            (SlotKind::Transfer, SlotKind::Share) => (destination, source),
            _ => return Err(AdapterError::MismatchedEndpoints),
        };

        let mount_point: PathBuf = share::mount_point(&share.config);
        let settings = TransferSettings::from_config(&transfer.config, &self.default_remote_root)?;

        let mut script = LftpScript::for_session(&settings, flags.compress);
        script.mirror(flags, &mount_point, &settings.remote_root);
        Ok((script, settings))
    }
}

impl Default for LftpMirrorExecutor {
    fn default() -> Self {
        Self::new("lftp", "/")
    }
}

#[async_trait]
impl IMirrorExecutor for LftpMirrorExecutor {
    #[instrument(skip_all, fields(direction = %flags.direction))]
    async fn run(
        &self,
        source: &MirrorEndpoint,
        destination: &MirrorEndpoint,
        flags: &MirrorFlags,
    ) -> anyhow::Result<MirrorOutcome> {
        let (script, settings) = self
            .script_for(source, destination, flags)
            .context("Failed to prepare mirror pass")?;
        debug!(host = %settings.host, port = settings.port, "Launching lftp mirror");

        let output = run_session(&self.binary, &script, settings.credential.as_ref())
            .await
            .context("Failed to run lftp")?;

        info!(exit_code = ?output.exit_code, "lftp mirror finished");
        let mut diagnostics = output.stdout;
        if !output.stderr.is_empty() {
            if !diagnostics.is_empty() && !diagnostics.ends_with('\n') {
                diagnostics.push('\n');
            }
            diagnostics.push_str(&output.stderr);
        }
        Ok(MirrorOutcome {
            exit_code: output.exit_code,
            diagnostics,
        })
    }
}
