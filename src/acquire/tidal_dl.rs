//! [`ReleaseAcquirer`] backed by the external `tidal-dl` command-line tool.
//!
//! The tool keeps its settings and token files under `$HOME`, so every
//! invocation pins HOME to our config directory to keep its state contained
//! and out of the user's real home.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{LoginOutcome, ReleaseAcquirer};

const SETTINGS_FILE: &str = ".tidal-dl.json";
const TOKEN_FILE: &str = ".tidal-dl.token.json";

lazy_static! {
    static ref LOGIN_LINK_RE: Regex =
        Regex::new(r"http://link\.tidal\.com/[A-Z0-9]{5}").expect("static regex");
}

pub struct TidalDlAcquirer {
    binary: String,
    config_dir: PathBuf,
    login_timeout: Duration,
}

impl TidalDlAcquirer {
    pub fn new(config_dir: PathBuf, login_timeout: Duration) -> Self {
        Self {
            binary: "tidal-dl".to_string(),
            config_dir,
            login_timeout,
        }
    }

    /// Write the tool's settings file. Overwrites whatever is there so the
    /// tool always runs with a known configuration.
    pub fn write_settings(&self) -> Result<()> {
        let settings = settings_json(&self.config_dir);
        let path = self.config_dir.join(SETTINGS_FILE);
        std::fs::write(&path, serde_json::to_string_pretty(&settings)?)
            .with_context(|| format!("Failed to write downloader settings: {:?}", path))?;
        warn!("Wrote downloader settings file at {:?}", path);
        Ok(())
    }

    fn token_file_path(&self) -> PathBuf {
        self.config_dir.join(TOKEN_FILE)
    }

    fn read_token(&self) -> Result<String> {
        let path = self.token_file_path();
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read token file: {:?}", path))?;
        decode_token(&contents)
    }

    async fn run_tool(&self, args: &[&str]) -> Result<ToolOutput> {
        let output = Command::new(&self.binary)
            .args(args)
            .env("HOME", &self.config_dir)
            .env("HOMEPATH", &self.config_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.binary))?;

        Ok(ToolOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[async_trait]
impl ReleaseAcquirer for TidalDlAcquirer {
    async fn validate(&self) -> Result<()> {
        match self.run_tool(&["--version"]).await {
            Ok(output) if output.success() => Ok(()),
            _ => bail!("{} was not found; install it and make sure it is on PATH", self.binary),
        }
    }

    async fn login(&self) -> Result<LoginOutcome> {
        let mut child = Command::new(&self.binary)
            .env("HOME", &self.config_dir)
            .env("HOMEPATH", &self.config_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start {} for login", self.binary))?;

        let stdout = child
            .stdout
            .take()
            .context("Login process has no stdout handle")?;
        let mut lines = BufReader::new(stdout).lines();

        let wait_for_outcome = async {
            while let Some(line) = lines.next_line().await? {
                match classify_login_line(&line) {
                    Some(LoginEvent::Link(link)) => {
                        info!("Log in to the streaming service with this link: {}", link);
                    }
                    Some(LoginEvent::Authenticated) => {
                        return Ok(LoginOutcome::Authenticated(String::new()));
                    }
                    Some(LoginEvent::Failed) => {
                        return Ok(LoginOutcome::Failed(
                            "the tool rejected the login attempt".to_string(),
                        ));
                    }
                    None => {}
                }
            }
            Ok::<_, anyhow::Error>(LoginOutcome::Failed(
                "login output ended without an outcome".to_string(),
            ))
        };

        let outcome = match tokio::time::timeout(self.login_timeout, wait_for_outcome).await {
            Ok(result) => result?,
            Err(_) => LoginOutcome::TimedOut,
        };

        let _ = child.kill().await;

        // The token is not printed; the tool drops it in a file once
        // authorization succeeds.
        let outcome = match outcome {
            LoginOutcome::Authenticated(_) => match self.read_token() {
                Ok(token) => LoginOutcome::Authenticated(token),
                Err(e) => LoginOutcome::Failed(format!(
                    "logged in, but the token file is unreadable: {e:#}"
                )),
            },
            other => other,
        };

        Ok(outcome)
    }

    async fn acquire(&self, release_id: u64, destination: &Path) -> Result<bool> {
        tokio::fs::create_dir_all(destination)
            .await
            .with_context(|| format!("Failed to create destination: {:?}", destination))?;

        let release_id = release_id.to_string();
        let destination = destination.to_string_lossy().into_owned();
        let output = self
            .run_tool(&["--link", &release_id, "--output", &destination])
            .await?;

        for line in output.stdout.lines().filter(|l| !l.trim().is_empty()) {
            debug!("[{}] {}", self.binary, line.trim());
        }
        if !output.success() && !output.stderr.trim().is_empty() {
            debug!("[{}] {}", self.binary, output.stderr.trim());
        }

        Ok(output.success())
    }
}

struct ToolOutput {
    stdout: String,
    stderr: String,
}

impl ToolOutput {
    // The tool exits zero even on failure; produced output is the only
    // usable success signal.
    fn success(&self) -> bool {
        !self.stdout.is_empty()
    }
}

enum LoginEvent {
    Link(String),
    Authenticated,
    Failed,
}

fn classify_login_line(line: &str) -> Option<LoginEvent> {
    if line.contains("Login failed") {
        return Some(LoginEvent::Failed);
    }
    if line.contains("AccessToken good for") {
        return Some(LoginEvent::Authenticated);
    }
    LOGIN_LINK_RE
        .find(line)
        .map(|m| LoginEvent::Link(m.as_str().to_string()))
}

/// Token file contents: base64-wrapped JSON with an `accessToken` field.
fn decode_token(contents: &str) -> Result<String> {
    let decoded = BASE64
        .decode(contents.trim())
        .context("Token file is not valid base64")?;
    let payload: TokenPayload =
        serde_json::from_slice(&decoded).context("Token file payload is not valid JSON")?;
    match payload.access_token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => bail!("Token file has no access token"),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenPayload {
    access_token: Option<String>,
}

fn settings_json(config_dir: &Path) -> serde_json::Value {
    json!({
        "albumFolderFormat": "/",
        "apiKeyIndex": 4,
        "audioQuality": "HiFi",
        "checkExist": true,
        "downloadDelay": true,
        "downloadPath": config_dir.join("downloads"),
        "includeEP": true,
        "language": 0,
        "lyricFile": true,
        "multiThread": false,
        "playlistFolderFormat": "Playlist/{PlaylistName} [{PlaylistUUID}]",
        "saveAlbumInfo": false,
        "saveCovers": true,
        "showProgress": true,
        "showTrackInfo": true,
        "trackFileFormat": "{TrackNumber}. {TrackTitle}",
        "usePlaylistFolder": true,
        "videoFileFormat": "{VideoNumber} - {ArtistName} - {VideoTitle}{ExplicitFlag}",
        "videoQuality": "P360"
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_classify_login_link() {
        let line = "Please open http://link.tidal.com/A1B2C to authorize.";
        match classify_login_line(line) {
            Some(LoginEvent::Link(link)) => assert_eq!(link, "http://link.tidal.com/A1B2C"),
            _ => panic!("expected a link event"),
        }
    }

    #[test]
    fn test_classify_login_success() {
        assert!(matches!(
            classify_login_line("AccessToken good for 7 days."),
            Some(LoginEvent::Authenticated)
        ));
    }

    #[test]
    fn test_classify_login_failure() {
        assert!(matches!(
            classify_login_line("Login failed.Error while checking for authorization."),
            Some(LoginEvent::Failed)
        ));
    }

    #[test]
    fn test_classify_ignores_chatter() {
        assert!(classify_login_line("Downloading metadata...").is_none());
        assert!(classify_login_line("").is_none());
        // Lowercase token fragments are not valid login links.
        assert!(classify_login_line("http://link.tidal.com/abcde").is_none());
    }

    #[test]
    fn test_decode_token_roundtrip() {
        let payload = BASE64.encode(r#"{"accessToken": "secret-token-value"}"#);
        assert_eq!(decode_token(&payload).unwrap(), "secret-token-value");
    }

    #[test]
    fn test_decode_token_rejects_missing_field() {
        let payload = BASE64.encode(r#"{"refreshToken": "nope"}"#);
        assert!(decode_token(&payload).is_err());
    }

    #[test]
    fn test_decode_token_rejects_garbage() {
        assert!(decode_token("not base64 at all!!!").is_err());
        let payload = BASE64.encode("not json");
        assert!(decode_token(&payload).is_err());
    }

    #[test]
    fn test_write_settings_creates_file() {
        let dir = TempDir::new().unwrap();
        let acquirer = TidalDlAcquirer::new(dir.path().to_path_buf(), Duration::from_secs(1));
        acquirer.write_settings().unwrap();

        let contents = std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed["audioQuality"], "HiFi");
        assert_eq!(parsed["trackFileFormat"], "{TrackNumber}. {TrackTitle}");
        assert_eq!(parsed["includeEP"], true);
    }
}
