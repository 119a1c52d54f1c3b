//! Sync options and resolved mirror flags
//!
//! Callers submit a partial [`SyncOptionsPatch`]; it is merged over the
//! configured defaults into a complete [`SyncOptions`], which is then
//! resolved into one [`MirrorFlags`] per directional pass.

use serde::{Deserialize, Serialize};

/// Complete set of options for one sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
    /// Mirror in both directions (two sequential passes)
    pub bidirectional: bool,
    /// Delete destination files that do not exist at the source
    #[serde(alias = "delete_files")]
    pub delete_extraneous: bool,
    /// Preserve permissions and attributes
    pub preserve_attributes: bool,
    /// Compress data in transit where the protocol allows it
    #[serde(alias = "compress_transfer")]
    pub compress: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            bidirectional: true,
            delete_extraneous: false,
            preserve_attributes: true,
            compress: true,
        }
    }
}

impl SyncOptions {
    /// Returns a copy with every field present in `patch` overridden
    pub fn merged(&self, patch: &SyncOptionsPatch) -> Self {
        Self {
            bidirectional: patch.bidirectional.unwrap_or(self.bidirectional),
            delete_extraneous: patch.delete_extraneous.unwrap_or(self.delete_extraneous),
            preserve_attributes: patch
                .preserve_attributes
                .unwrap_or(self.preserve_attributes),
            compress: patch.compress.unwrap_or(self.compress),
        }
    }

    /// Resolves these options into the ordered list of mirror passes
    ///
    /// The share-to-transfer pass always runs first. A bidirectional run
    /// appends the reverse pass; whichever pass writes a file last wins,
    /// since no conflict resolution takes place between them.
    pub fn passes(&self) -> Vec<MirrorFlags> {
        let mut directions = vec![Direction::ShareToTransfer];
        if self.bidirectional {
            directions.push(Direction::TransferToShare);
        }
        directions
            .into_iter()
            .map(|direction| MirrorFlags {
                direction,
                compress: self.compress,
                delete_extraneous: self.delete_extraneous,
                preserve_attributes: self.preserve_attributes,
            })
            .collect()
    }
}

/// Partial options supplied with a start request
///
/// Absent fields fall back to the configured defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOptionsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bidirectional: Option<bool>,
    #[serde(default, alias = "delete_files", skip_serializing_if = "Option::is_none")]
    pub delete_extraneous: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_attributes: Option<bool>,
    #[serde(default, alias = "compress_transfer", skip_serializing_if = "Option::is_none")]
    pub compress: Option<bool>,
}

impl SyncOptionsPatch {
    /// An empty patch; every option takes its default
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bidirectional(mut self, value: bool) -> Self {
        self.bidirectional = Some(value);
        self
    }

    pub fn delete_extraneous(mut self, value: bool) -> Self {
        self.delete_extraneous = Some(value);
        self
    }

    pub fn preserve_attributes(mut self, value: bool) -> Self {
        self.preserve_attributes = Some(value);
        self
    }

    pub fn compress(mut self, value: bool) -> Self {
        self.compress = Some(value);
        self
    }
}

/// Direction of one mirror pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Share is the source, transfer endpoint the destination
    ShareToTransfer,
    /// Transfer endpoint is the source, share the destination
    TransferToShare,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::ShareToTransfer => write!(f, "share -> transfer"),
            Direction::TransferToShare => write!(f, "transfer -> share"),
        }
    }
}

/// Flags handed to the mirror executor for a single pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorFlags {
    pub direction: Direction,
    pub compress: bool,
    pub delete_extraneous: bool,
    pub preserve_attributes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let opts = SyncOptions::default();
        assert!(opts.bidirectional);
        assert!(!opts.delete_extraneous);
        assert!(opts.preserve_attributes);
        assert!(opts.compress);
    }

    #[test]
    fn test_merge_overrides_only_present_fields() {
        let patch = SyncOptionsPatch::empty()
            .delete_extraneous(true)
            .compress(false);
        let merged = SyncOptions::default().merged(&patch);

        assert!(merged.bidirectional);
        assert!(merged.delete_extraneous);
        assert!(merged.preserve_attributes);
        assert!(!merged.compress);
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let base = SyncOptions {
            bidirectional: false,
            delete_extraneous: true,
            preserve_attributes: false,
            compress: false,
        };
        assert_eq!(base.merged(&SyncOptionsPatch::empty()), base);
    }

    #[test]
    fn test_patch_accepts_legacy_key_names() {
        let patch: SyncOptionsPatch =
            serde_json::from_str(r#"{"delete_files": true, "compress_transfer": false}"#).unwrap();
        assert_eq!(patch.delete_extraneous, Some(true));
        assert_eq!(patch.compress, Some(false));
        assert_eq!(patch.bidirectional, None);
    }

    #[test]
    fn test_unidirectional_has_single_pass() {
        let opts = SyncOptions {
            bidirectional: false,
            ..SyncOptions::default()
        };
        let passes = opts.passes();
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].direction, Direction::ShareToTransfer);
    }

    #[test]
    fn test_bidirectional_is_two_passes_last_writer_wins() {
        let opts = SyncOptions {
            delete_extraneous: true,
            ..SyncOptions::default()
        };
        let passes = opts.passes();
        assert_eq!(passes.len(), 2);
        assert_eq!(passes[0].direction, Direction::ShareToTransfer);
        assert_eq!(passes[1].direction, Direction::TransferToShare);
        assert!(passes.iter().all(|p| p.delete_extraneous && p.compress));
    }
}
