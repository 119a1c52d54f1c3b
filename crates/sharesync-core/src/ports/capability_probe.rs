//! System capability probe port
//!
//! Used only to populate the diagnostic `system_requirements` field of
//! status reports. Nothing in the core is gated on its answers.

use std::collections::BTreeMap;

/// Port trait for checking whether a system tool is available
pub trait ICapabilityProbe: Send + Sync {
    /// Returns true if `tool` is installed and usable
    fn has(&self, tool: &str) -> bool;
}

/// Probes every tool in `requirements` and returns a name-to-presence map
pub fn requirement_report(
    probe: &dyn ICapabilityProbe,
    requirements: &[String],
) -> BTreeMap<String, bool> {
    requirements
        .iter()
        .map(|tool| (tool.clone(), probe.has(tool)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OnlyLftp;

    impl ICapabilityProbe for OnlyLftp {
        fn has(&self, tool: &str) -> bool {
            tool == "lftp"
        }
    }

    #[test]
    fn test_requirement_report() {
        let reqs = vec!["rsync".to_string(), "lftp".to_string()];
        let report = requirement_report(&OnlyLftp, &reqs);
        assert_eq!(report.len(), 2);
        assert!(report["lftp"]);
        assert!(!report["rsync"]);
    }
}
