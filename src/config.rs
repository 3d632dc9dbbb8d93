// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::ConfigError;
use crate::models::{BaselineKind, DATE, TOTAL, UNLISTED, UnlistedPolicy};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmtpSettings {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    #[serde(default = "default_true")]
    pub secure: bool,
    pub from: String,
    #[serde(default)]
    pub from_name: Option<String>,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_true() -> bool {
    true
}

fn default_subject_prefix() -> String {
    "Daily Cash Dash".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./out")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Ordered category whitelist; also the column order of every table.
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub baseline: BaselineKind,
    #[serde(default)]
    pub unlisted: UnlistedPolicy,
    /// Skip the run unless the last upstream load completed.
    #[serde(default)]
    pub require_ready: bool,
    #[serde(default)]
    pub recipients: Vec<String>,
    #[serde(default)]
    pub bcc: Vec<String>,
    #[serde(default)]
    pub failure_recipients: Vec<String>,
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub smtp: Option<SmtpSettings>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            baseline: BaselineKind::default(),
            unlisted: UnlistedPolicy::default(),
            require_ready: false,
            recipients: Vec::new(),
            bcc: Vec::new(),
            failure_recipients: Vec::new(),
            subject_prefix: default_subject_prefix(),
            output_dir: default_output_dir(),
            smtp: None,
        }
    }
}

/// Split a comma-separated category list, keeping order.
pub fn parse_category_list(s: &str) -> Result<Vec<String>, ConfigError> {
    let mut out: Vec<String> = Vec::new();
    for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if name == DATE || name == TOTAL {
            return Err(ConfigError::ReservedCategory(name.to_string()));
        }
        if out.iter().any(|c| c == name) {
            return Err(ConfigError::DuplicateCategory(name.to_string()));
        }
        out.push(name.to_string());
    }
    if out.is_empty() {
        return Err(ConfigError::NoCategories);
    }
    Ok(out)
}

fn parse_address_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

impl ReportConfig {
    /// Read the JSON config at `path`, or the default location when `path`
    /// is `None`. A missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (crate::db::config_path()?, false),
        };
        if !path.exists() {
            if required {
                anyhow::bail!("Config file {} not found", path.display());
            }
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Read config {}", path.display()))?;
        let cfg: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Parse config {}", path.display()))?;
        Ok(cfg)
    }

    /// Apply `CASHDASH_*` overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("CASHDASH_CATEGORIES") {
            self.categories = parse_category_list(&v)?;
        }
        if let Some(v) = get("CASHDASH_BASELINE") {
            self.baseline = v.parse().map_err(|e: anyhow::Error| ConfigError::Invalid {
                key: "CASHDASH_BASELINE",
                reason: e.to_string(),
            })?;
        }
        if let Some(v) = get("CASHDASH_RECIPIENTS") {
            self.recipients = parse_address_list(&v);
        }
        if let Some(v) = get("CASHDASH_BCC") {
            self.bcc = parse_address_list(&v);
        }
        if let Some(v) = get("CASHDASH_FAILURE_RECIPIENTS") {
            self.failure_recipients = parse_address_list(&v);
        }
        if let Some(v) = get("CASHDASH_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }

        if let Some(host) = get("CASHDASH_SMTP_HOST") {
            let from = get("CASHDASH_EMAIL_FROM")
                .or_else(|| self.smtp.as_ref().map(|s| s.from.clone()))
                .ok_or(ConfigError::Invalid {
                    key: "CASHDASH_EMAIL_FROM",
                    reason: "required when CASHDASH_SMTP_HOST is set".into(),
                })?;
            let prev = self.smtp.take();
            self.smtp = Some(SmtpSettings {
                host,
                port: prev.as_ref().map(|s| s.port).unwrap_or_else(default_smtp_port),
                username: prev.as_ref().and_then(|s| s.username.clone()),
                password: prev.as_ref().and_then(|s| s.password.clone()),
                secure: prev.as_ref().map(|s| s.secure).unwrap_or(true),
                from,
                from_name: prev.and_then(|s| s.from_name),
            });
        }
        if let Some(smtp) = self.smtp.as_mut() {
            if let Some(port) = get("CASHDASH_SMTP_PORT") {
                smtp.port = port.parse().map_err(|_| ConfigError::Invalid {
                    key: "CASHDASH_SMTP_PORT",
                    reason: format!("'{}' is not a port number", port),
                })?;
            }
            if let Some(u) = get("CASHDASH_SMTP_USERNAME") {
                smtp.username = Some(u);
            }
            if let Some(p) = get("CASHDASH_SMTP_PASSWORD") {
                smtp.password = Some(p);
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }
        for (i, c) in self.categories.iter().enumerate() {
            let reserved = c == DATE
                || c == TOTAL
                || (c == UNLISTED && self.unlisted == UnlistedPolicy::Column);
            if reserved {
                return Err(ConfigError::ReservedCategory(c.clone()));
            }
            if self.categories[..i].contains(c) {
                return Err(ConfigError::DuplicateCategory(c.clone()));
            }
        }
        Ok(())
    }

    /// Failure notices go to `failure_recipients`, falling back to `recipients`.
    pub fn failure_to(&self) -> &[String] {
        if self.failure_recipients.is_empty() {
            &self.recipients
        } else {
            &self.failure_recipients
        }
    }
}
