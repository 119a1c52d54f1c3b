//! Transfer connector (FTP and SFTP) driven through lftp
//!
//! lftp sessions are per-command, so "connected" means the last login
//! probe succeeded; there is no long-lived session to tear down.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use sharesync_core::{
    domain::EndpointConfig,
    ports::{IEndpointConnector, RemoteEntry},
};
use tracing::{debug, instrument};

use crate::error::AdapterError;
use crate::lftp::{quote, run_session, LftpScript, TransferSettings};

#[derive(Debug, Clone)]
pub struct LftpTransferConnector {
    binary: String,
    default_remote_root: String,
}

impl LftpTransferConnector {
    pub fn new(binary: impl Into<String>, default_remote_root: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            default_remote_root: default_remote_root.into(),
        }
    }

    fn settings(&self, config: &EndpointConfig) -> Result<TransferSettings, AdapterError> {
        TransferSettings::from_config(config, &self.default_remote_root)
    }

    /// Runs `command` after logging in and returns its stdout
    async fn session(&self, config: &EndpointConfig, command: &str) -> anyhow::Result<String> {
        let settings = self.settings(config)?;
        let mut script = LftpScript::for_session(&settings, false);
        script.push(format!("{command} {}", quote(&settings.remote_root)));

        let output = run_session(&self.binary, &script, settings.credential.as_ref()).await?;
        if output.exit_code != Some(0) {
            return Err(AdapterError::ToolFailed {
                tool: self.binary.clone(),
                status: output
                    .exit_code
                    .map(|c| format!("status {c}"))
                    .unwrap_or_else(|| "a signal".into()),
                stderr: output.stderr.trim().to_string(),
            }
            .into());
        }
        Ok(output.stdout)
    }
}

impl Default for LftpTransferConnector {
    fn default() -> Self {
        Self::new("lftp", "/")
    }
}

#[async_trait]
impl IEndpointConnector for LftpTransferConnector {
    fn validate(&self, config: &EndpointConfig) -> anyhow::Result<()> {
        self.settings(config)?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn connect(&self, config: &EndpointConfig) -> anyhow::Result<()> {
        self.session(config, "cd")
            .await
            .context("Login probe failed")?;
        debug!("Transfer login probe succeeded");
        Ok(())
    }

    async fn disconnect(&self, _config: &EndpointConfig) -> anyhow::Result<()> {
        Ok(())
    }

    #[instrument(skip_all)]
    async fn list_entries(&self, config: &EndpointConfig) -> anyhow::Result<Vec<RemoteEntry>> {
        let listing = self
            .session(config, "ls")
            .await
            .context("Listing failed")?;
        Ok(parse_listing(&listing, Utc::now()))
    }
}

/// Parses `ls` long-format output
///
/// Lines with fewer than nine fields are skipped, as are `.` and `..`.
/// `now` resolves the year of entries that show a time instead of one.
pub fn parse_listing(output: &str, now: DateTime<Utc>) -> Vec<RemoteEntry> {
    output
        .lines()
        .filter_map(|line| parse_line(line, now))
        .collect()
}

fn parse_line(line: &str, now: DateTime<Utc>) -> Option<RemoteEntry> {
    let fields: Vec<&str> = line.split_whitespace().take(8).collect();
    if fields.len() < 8 {
        return None;
    }

    // The name is everything after the eighth field, spaces included
    let mut rest = line.trim_start();
    for _ in 0..8 {
        let end = rest.find(char::is_whitespace)?;
        rest = rest[end..].trim_start();
    }
    let mut name = rest.trim_end();
    if name.is_empty() {
        return None;
    }

    let kind = fields[0].chars().next()?;
    if kind == 'l' {
        if let Some((link, _target)) = name.split_once(" -> ") {
            name = link;
        }
    }
    if name == "." || name == ".." {
        return None;
    }

    let is_directory = kind == 'd';
    Some(RemoteEntry {
        name: name.to_string(),
        is_directory,
        size: if is_directory {
            0
        } else {
            fields[4].parse().unwrap_or(0)
        },
        modified_at: parse_modified(fields[5], fields[6], fields[7], now),
    })
}

fn parse_modified(month: &str, day: &str, year_or_time: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let (year, time) = match year_or_time.split_once(':') {
        Some(_) => (now.year(), NaiveTime::parse_from_str(year_or_time, "%H:%M").ok()?),
        None => (year_or_time.parse().ok()?, NaiveTime::from_hms_opt(0, 0, 0)?),
    };
    let date = NaiveDate::parse_from_str(&format!("{month} {day} {year}"), "%b %d %Y").ok()?;
    let stamp = date.and_time(time).and_utc();

    // Servers omit the year for the last six months only
    if year_or_time.contains(':') && stamp > now + Duration::days(1) {
        let date = NaiveDate::parse_from_str(&format!("{month} {day} {}", year - 1), "%b %d %Y").ok()?;
        return Some(date.and_time(time).and_utc());
    }
    Some(stamp)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    const LISTING: &str = "\
drwxr-xr-x    2 ftp      ftp          4096 Jan 10 09:30 .
drwxr-xr-x    5 ftp      ftp          4096 Jan 10 09:30 ..
drwxr-xr-x    2 ftp      ftp          4096 Feb 02 08:15 incoming
-rw-r--r--    1 ftp      ftp         52311 Dec 24  2023 annual  report.pdf
lrwxrwxrwx    1 ftp      ftp            11 Mar 01 10:00 latest -> incoming
total 12
";

    #[test]
    fn test_parse_listing() {
        let entries = parse_listing(LISTING, now());

        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].name, "incoming");
        assert!(entries[0].is_directory);
        assert_eq!(entries[0].size, 0);
        assert_eq!(
            entries[0].modified_at,
            Some(Utc.with_ymd_and_hms(2024, 2, 2, 8, 15, 0).unwrap())
        );

        assert_eq!(entries[1].name, "annual  report.pdf");
        assert!(!entries[1].is_directory);
        assert_eq!(entries[1].size, 52311);
        assert_eq!(
            entries[1].modified_at,
            Some(Utc.with_ymd_and_hms(2023, 12, 24, 0, 0, 0).unwrap())
        );

        assert_eq!(entries[2].name, "latest");
    }

    #[test]
    fn test_time_in_future_belongs_to_previous_year() {
        let entries = parse_listing(
            "-rw-r--r-- 1 u g 10 Nov 30 23:59 old.txt\n",
            now(),
        );
        assert_eq!(
            entries[0].modified_at,
            Some(Utc.with_ymd_and_hms(2023, 11, 30, 23, 59, 0).unwrap())
        );
    }

    #[test]
    fn test_short_lines_are_skipped() {
        assert!(parse_listing("total 0\nfoo bar\n\n", now()).is_empty());
    }

    #[test]
    fn test_validate_uses_transfer_settings() {
        let connector = LftpTransferConnector::default();
        assert!(connector
            .validate(&EndpointConfig::new().with("server", "ftp.example.com").with("protocol", "ftp"))
            .is_ok());
        assert!(connector.validate(&EndpointConfig::new().with("protocol", "ftp")).is_err());
        assert!(connector
            .validate(&EndpointConfig::new().with("server", "h").with("protocol", "smb"))
            .is_err());
    }

    #[tokio::test]
    async fn test_connect_fails_without_lftp() {
        let connector = LftpTransferConnector::new("/nonexistent/sharesync-lftp", "/");
        let config = EndpointConfig::new().with("server", "ftp.example.com");
        assert!(connector.connect(&config).await.is_err());
    }
}
