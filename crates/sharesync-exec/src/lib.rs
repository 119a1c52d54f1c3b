//! ShareSync Exec - adapters backed by the local system
//!
//! Implements the ports declared in `sharesync-core`:
//!
//! - [`MountedShareConnector`] - share slot over an already-mounted directory
//! - [`LftpTransferConnector`] - transfer slot (FTP or SFTP) through `lftp`
//! - [`LftpMirrorExecutor`] - runs `lftp mirror` for one directional pass
//! - [`PathCapabilityProbe`] - looks tools up on `PATH`
//!
//! All child processes are spawned with `kill_on_drop`, so dropping an
//! in-flight call (cancellation, timeout) terminates the tool.

pub mod error;
pub mod lftp;
pub mod probe;
pub mod share;
pub mod transfer;

pub use error::AdapterError;
pub use lftp::{LftpMirrorExecutor, LftpScript, Protocol, TransferSettings};
pub use probe::PathCapabilityProbe;
pub use share::MountedShareConnector;
pub use transfer::LftpTransferConnector;
