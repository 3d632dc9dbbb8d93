// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Report and failure mail: composition plus delivery over SMTP.

use crate::config::{ReportConfig, SmtpSettings};
use crate::error::{ConfigError, MailError};
use crate::pipeline::{Artifact, ArtifactKind, Report};
use crate::render::render_template;
use anyhow::Result;
use chrono::NaiveDate;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MailAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub html: String,
    pub attachments: Vec<Attachment>,
}

pub trait Mailer {
    fn send(&self, email: &Email) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    settings: SmtpSettings,
}

impl SmtpMailer {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    pub fn from_config(cfg: &ReportConfig) -> Result<Self, ConfigError> {
        cfg.smtp.clone().map(Self::new).ok_or(ConfigError::NoSmtp)
    }
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.trim().parse::<Mailbox>().map_err(|e| MailError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// Build the MIME message: HTML body plus attachments.
pub fn build_message(email: &Email, from: Mailbox) -> Result<Message, MailError> {
    let mut builder = Message::builder()
        .from(from.clone())
        .reply_to(from)
        .subject(email.subject.as_str());
    for to in &email.to {
        builder = builder.to(mailbox(to)?);
    }
    for b in &email.bcc {
        builder = builder.bcc(mailbox(b)?);
    }
    let mut parts = MultiPart::mixed().singlepart(SinglePart::html(email.html.clone()));
    for a in &email.attachments {
        let ct = ContentType::parse(&a.content_type)
            .map_err(|e| MailError::Build(format!("{}: {}", a.content_type, e)))?;
        parts = parts.singlepart(MailAttachment::new(a.filename.clone()).body(a.body.clone(), ct));
    }
    builder
        .multipart(parts)
        .map_err(|e| MailError::Build(e.to_string()))
}

impl Mailer for SmtpMailer {
    fn send(&self, email: &Email) -> Result<(), MailError> {
        let s = &self.settings;
        let from = Mailbox::new(
            s.from_name.clone(),
            s.from.trim().parse().map_err(|e: lettre::address::AddressError| {
                MailError::Address {
                    address: s.from.clone(),
                    reason: e.to_string(),
                }
            })?,
        );
        let message = build_message(email, from)?;

        let mut builder = if s.secure {
            SmtpTransport::relay(&s.host).map_err(|e| MailError::Transport(e.to_string()))?
        } else {
            SmtpTransport::builder_dangerous(&s.host)
        };
        builder = builder.port(s.port);
        if let (Some(u), Some(p)) = (&s.username, &s.password) {
            builder = builder.credentials(Credentials::new(u.clone(), p.clone()));
        }
        builder
            .build()
            .send(&message)
            .map_err(|e| MailError::Transport(e.to_string()))?;
        info!(subject = %email.subject, recipients = email.to.len() + email.bcc.len(), "email sent");
        Ok(())
    }
}

/// Writes the message into a directory instead of sending it.
pub struct DryRunMailer {
    dir: PathBuf,
}

impl DryRunMailer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Mailer for DryRunMailer {
    fn send(&self, email: &Email) -> Result<(), MailError> {
        fs::create_dir_all(&self.dir)?;
        let header = format!(
            "<!-- To: {} | Bcc: {} | Subject: {} -->\n",
            email.to.join(", "),
            email.bcc.join(", "),
            email.subject
        );
        let path = self.dir.join("email.html");
        fs::write(&path, format!("{}{}", header, email.html))?;
        for a in &email.attachments {
            fs::write(self.dir.join(&a.filename), &a.body)?;
        }
        info!(path = %path.display(), subject = %email.subject, "dry run: email written");
        Ok(())
    }
}

pub fn report_subject(cfg: &ReportConfig, date: NaiveDate) -> String {
    format!("{} - {}", cfg.subject_prefix, date.format("%m-%d-%Y"))
}

const REPORT_BODY: &str = r#"<html><body style="font-family: Century Gothic, sans-serif;">
<p>Good morning!  Here is today's update:</p>
<p>Data through {{through}}.</p>
{{#each sections}}{{#if table}}{{{table}}}<br>
{{else}}<p><b>{{caption}}</b> (attached: {{file_name}})</p>
{{/if}}{{/each}}<p>Have a great day!</p>
</body></html>
"#;

const FAILURE_BODY: &str = r#"<html><body>
<p>The {{prefix}} run failed.</p>
<pre>{{error}}</pre>
</body></html>
"#;

/// Report mail: greeting, then every artifact in order. Tables go inline,
/// charts are attached and referenced by file name.
pub fn compose_report(
    cfg: &ReportConfig,
    report: &Report,
    artifacts: &[Artifact],
    sent_on: NaiveDate,
) -> Result<Email> {
    if cfg.recipients.is_empty() && cfg.bcc.is_empty() {
        return Err(ConfigError::NoRecipients("the report").into());
    }
    let mut sections = Vec::with_capacity(artifacts.len());
    let mut attachments = Vec::new();
    for a in artifacts {
        match a.kind {
            ArtifactKind::Table => sections.push(json!({ "table": a.content })),
            ArtifactKind::Chart => {
                sections.push(json!({ "caption": a.caption, "file_name": a.file_name }));
                attachments.push(Attachment {
                    filename: a.file_name.clone(),
                    content_type: "image/svg+xml".to_string(),
                    body: a.content.clone().into_bytes(),
                });
            }
        }
    }
    let html = render_template(
        REPORT_BODY,
        &json!({
            "through": report.window.report_date.format("%Y-%m-%d").to_string(),
            "sections": sections,
        }),
    )?;
    Ok(Email {
        to: cfg.recipients.clone(),
        bcc: cfg.bcc.clone(),
        subject: report_subject(cfg, sent_on),
        html,
        attachments,
    })
}

/// Failure notice carrying the error chain and, when readable, the run log.
pub fn compose_failure(
    cfg: &ReportConfig,
    err: &anyhow::Error,
    log_path: Option<&Path>,
) -> Result<Email> {
    let to = cfg.failure_to();
    if to.is_empty() {
        return Err(ConfigError::NoRecipients("failure notices").into());
    }
    let html = render_template(
        FAILURE_BODY,
        &json!({ "prefix": cfg.subject_prefix, "error": format!("{:#}", err) }),
    )?;
    let mut attachments = Vec::new();
    if let Some(p) = log_path {
        match fs::read(p) {
            Ok(body) => attachments.push(Attachment {
                filename: p
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "cashdash.log".to_string()),
                content_type: "text/plain; charset=utf-8".to_string(),
                body,
            }),
            Err(e) => warn!(path = %p.display(), error = %e, "run log not attached"),
        }
    }
    Ok(Email {
        to: to.to_vec(),
        bcc: Vec::new(),
        subject: format!("Error - {}", cfg.subject_prefix),
        html,
        attachments,
    })
}
