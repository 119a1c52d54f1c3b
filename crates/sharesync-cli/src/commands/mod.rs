//! Subcommand implementations and the wiring they share

pub mod list;
pub mod plan;
pub mod probe;
pub mod run;

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;
use sharesync_core::{
    config::Config,
    domain::{Credential, EndpointConfig, SlotKind, SyncOptionsPatch},
};
use sharesync_exec::{
    LftpMirrorExecutor, LftpTransferConnector, MountedShareConnector, PathCapabilityProbe,
};
use sharesync_sync::{Collaborators, Orchestrator};

/// Option overrides accepted by commands that resolve sync options
#[derive(Debug, Default, Args)]
pub struct SyncFlags {
    /// Mirror share to transfer only (skip the reverse pass)
    #[arg(long)]
    pub one_way: bool,

    /// Delete destination files missing from the source
    #[arg(long)]
    pub delete: bool,

    /// Do not preserve permissions
    #[arg(long)]
    pub no_preserve: bool,

    /// Disable compression in transit
    #[arg(long)]
    pub no_compress: bool,
}

impl SyncFlags {
    /// Converts the flags that were given into a patch over config defaults
    pub fn to_patch(&self) -> SyncOptionsPatch {
        let mut patch = SyncOptionsPatch::empty();
        if self.one_way {
            patch = patch.bidirectional(false);
        }
        if self.delete {
            patch = patch.delete_extraneous(true);
        }
        if self.no_preserve {
            patch = patch.preserve_attributes(false);
        }
        if self.no_compress {
            patch = patch.compress(false);
        }
        patch
    }
}

/// Environment variable holding the password for `kind`
pub fn password_env(kind: SlotKind) -> &'static str {
    match kind {
        SlotKind::Share => "SHARESYNC_SHARE_PASSWORD",
        SlotKind::Transfer => "SHARESYNC_TRANSFER_PASSWORD",
    }
}

/// Returns the configured endpoint for `kind`
///
/// A password found in the slot's environment variable replaces the one
/// from the file, so secrets need not be stored in the config.
pub fn endpoint_for(config: &Config, kind: SlotKind) -> Result<EndpointConfig> {
    let configured = match kind {
        SlotKind::Share => config.endpoints.share.clone(),
        SlotKind::Transfer => config.endpoints.transfer.clone(),
    };
    let Some(endpoint) = configured else {
        bail!("No {kind} endpoint configured (set endpoints.{kind} in the config file)");
    };
    Ok(with_env_password(endpoint, std::env::var(password_env(kind)).ok()))
}

fn with_env_password(endpoint: EndpointConfig, password: Option<String>) -> EndpointConfig {
    match (endpoint.credential().cloned(), password) {
        (Some(credential), Some(password)) => {
            endpoint.with_credential(Credential::new(credential.username, password))
        }
        _ => endpoint,
    }
}

/// Builds an orchestrator wired to the system adapters
pub fn build_orchestrator(config: &Config) -> Orchestrator {
    let mirror = &config.mirror;
    Orchestrator::new(
        config,
        Collaborators {
            share: Arc::new(MountedShareConnector::new()),
            transfer: Arc::new(LftpTransferConnector::new(
                mirror.lftp_binary.clone(),
                mirror.remote_root.clone(),
            )),
            executor: Arc::new(LftpMirrorExecutor::new(
                mirror.lftp_binary.clone(),
                mirror.remote_root.clone(),
            )),
            probe: Arc::new(PathCapabilityProbe::new()),
        },
    )
}

#[cfg(test)]
mod tests {
    use sharesync_core::config::ConfigBuilder;

    use super::*;

    #[test]
    fn test_flags_only_patch_given_options() {
        assert_eq!(SyncFlags::default().to_patch(), SyncOptionsPatch::empty());

        let flags = SyncFlags {
            one_way: true,
            no_compress: true,
            ..SyncFlags::default()
        };
        let patch = flags.to_patch();
        assert_eq!(patch.bidirectional, Some(false));
        assert_eq!(patch.compress, Some(false));
        assert_eq!(patch.delete_extraneous, None);
        assert_eq!(patch.preserve_attributes, None);
    }

    #[test]
    fn test_endpoint_for_missing_slot() {
        let err = endpoint_for(&Config::default(), SlotKind::Share).unwrap_err();
        assert!(err.to_string().contains("No share endpoint configured"));
    }

    #[test]
    fn test_env_password_replaces_configured_one() {
        let endpoint = EndpointConfig::new()
            .with("server", "ftp.example.com")
            .with_credential(Credential::new("alice", ""));

        let resolved = with_env_password(endpoint.clone(), Some("s3cret".into()));
        let credential = resolved.credential().unwrap();
        assert_eq!(credential.username, "alice");
        assert_eq!(credential.password, "s3cret");

        assert_eq!(with_env_password(endpoint.clone(), None), endpoint);
    }

    #[test]
    fn test_env_password_needs_a_username() {
        let endpoint = EndpointConfig::new().with("server", "ftp.example.com");
        assert_eq!(with_env_password(endpoint.clone(), Some("x".into())), endpoint);
    }

    #[test]
    fn test_endpoint_for_configured_slot() {
        let config = ConfigBuilder::new()
            .transfer_endpoint(EndpointConfig::new().with("server", "ftp.example.com"))
            .build();
        let endpoint = endpoint_for(&config, SlotKind::Transfer).unwrap();
        assert_eq!(endpoint.get_str("server"), Some("ftp.example.com"));
    }
}
