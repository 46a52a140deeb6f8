//! AWS credential and region resolution
//!
//! Supports:
//! - Environment variables (AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, AWS_SESSION_TOKEN)
//! - Shared credentials file (~/.aws/credentials or AWS_SHARED_CREDENTIALS_FILE)
//! - Config file (~/.aws/config or AWS_CONFIG_FILE), including `region`
//! - `credential_process` on either file

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// AWS credentials
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

type Sections = HashMap<String, HashMap<String, String>>;

/// Locations of the shared AWS files
#[derive(Debug, Clone)]
pub struct ProfileFiles {
    pub credentials: PathBuf,
    pub config: PathBuf,
}

impl ProfileFiles {
    /// Resolve file locations from the environment, falling back to ~/.aws
    pub fn from_env() -> Result<Self> {
        let credentials = match env::var("AWS_SHARED_CREDENTIALS_FILE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => aws_config_dir()?.join("credentials"),
        };
        let config = match env::var("AWS_CONFIG_FILE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => aws_config_dir()?.join("config"),
        };
        Ok(Self {
            credentials,
            config,
        })
    }

    fn read_sections(path: &Path) -> Option<Sections> {
        fs::read_to_string(path)
            .ok()
            .map(|content| parse_ini_file(&content))
    }

    /// Load credentials for a profile from the credentials file, then the config file
    pub fn load_credentials(&self, profile: &str) -> Result<Credentials> {
        for path in [&self.credentials, &self.config] {
            let Some(sections) = Self::read_sections(path) else {
                debug!("Could not read {:?}", path);
                continue;
            };
            let Some(section) = sections.get(profile) else {
                continue;
            };
            if let Some(creds) = credentials_from_section(profile, section)? {
                debug!("Loaded credentials for profile '{}' from {:?}", profile, path);
                return Ok(creds);
            }
        }

        Err(anyhow!(
            "No credentials found for profile '{}'. Run 'aws configure' or set AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY",
            profile
        ))
    }

    /// The `region` configured for a profile in the config file
    pub fn profile_region(&self, profile: &str) -> Option<String> {
        Self::read_sections(&self.config)?
            .get(profile)?
            .get("region")
            .cloned()
    }
}

/// Load credentials for a given profile
pub fn load_credentials(profile: &str) -> Result<Credentials> {
    // Environment variables only stand in for the default profile
    if profile == "default" {
        if let Some(creds) = load_from_env() {
            debug!("Loaded credentials from environment variables");
            return Ok(creds);
        }
    }

    ProfileFiles::from_env()?.load_credentials(profile)
}

/// Resolve the region for a profile: AWS_REGION, AWS_DEFAULT_REGION, then the config file
pub fn resolve_region(profile: &str) -> Option<String> {
    env::var("AWS_REGION")
        .or_else(|_| env::var("AWS_DEFAULT_REGION"))
        .ok()
        .filter(|r| !r.is_empty())
        .or_else(|| ProfileFiles::from_env().ok()?.profile_region(profile))
}

fn load_from_env() -> Option<Credentials> {
    let access_key_id = env::var("AWS_ACCESS_KEY_ID").ok()?;
    let secret_access_key = env::var("AWS_SECRET_ACCESS_KEY").ok()?;
    Some(Credentials {
        access_key_id,
        secret_access_key,
        session_token: env::var("AWS_SESSION_TOKEN").ok(),
    })
}

/// Get AWS config directory
pub fn aws_config_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|h| h.join(".aws"))
        .ok_or_else(|| anyhow!("Could not find home directory"))
}

/// Parse an INI-style file into sections, stripping the `profile ` prefix used by ~/.aws/config
fn parse_ini_file(content: &str) -> Sections {
    let mut sections: Sections = HashMap::new();
    let mut current_section = String::new();

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            let name = line[1..line.len() - 1].trim();
            current_section = name.strip_prefix("profile ").unwrap_or(name).trim().to_string();
            sections.entry(current_section.clone()).or_default();
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            if !current_section.is_empty() {
                sections
                    .entry(current_section.clone())
                    .or_default()
                    .insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }

    sections
}

/// Static keys or `credential_process` from one profile section
fn credentials_from_section(
    profile: &str,
    section: &HashMap<String, String>,
) -> Result<Option<Credentials>> {
    if let Some(command) = section.get("credential_process") {
        debug!("Found credential_process for profile '{}'", profile);
        return execute_credential_process(command).map(Some);
    }

    match (
        section.get("aws_access_key_id"),
        section.get("aws_secret_access_key"),
    ) {
        (Some(access_key), Some(secret_key)) => Ok(Some(Credentials {
            access_key_id: access_key.clone(),
            secret_access_key: secret_key.clone(),
            session_token: section.get("aws_session_token").cloned(),
        })),
        _ => Ok(None),
    }
}

/// JSON printed by a `credential_process` command
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProcessOutput {
    #[serde(default)]
    version: Option<i64>,
    access_key_id: String,
    secret_access_key: String,
    #[serde(default)]
    session_token: Option<String>,
}

fn execute_credential_process(command: &str) -> Result<Credentials> {
    debug!("Executing credential_process: {}", command);

    #[cfg(not(windows))]
    let output = Command::new("sh").arg("-c").arg(command).output();
    #[cfg(windows)]
    let output = Command::new("cmd").arg("/C").arg(command).output();

    let output = output.context("Failed to execute credential_process")?;

    if !output.status.success() {
        return Err(anyhow!(
            "credential_process failed with status {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        ));
    }

    let parsed: ProcessOutput = serde_json::from_slice(&output.stdout)
        .context("Failed to parse credential_process output")?;

    if let Some(version) = parsed.version.filter(|v| *v != 1) {
        return Err(anyhow!(
            "Unsupported credential_process version: {}",
            version
        ));
    }

    Ok(Credentials {
        access_key_id: parsed.access_key_id,
        secret_access_key: parsed.secret_access_key,
        session_token: parsed.session_token,
    })
}
