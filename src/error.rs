// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("category list is empty")]
    NoCategories,

    #[error("category '{0}' is listed more than once")]
    DuplicateCategory(String),

    #[error("category '{0}' collides with a table header")]
    ReservedCategory(String),

    #[error("no recipients configured for {0}")]
    NoRecipients(&'static str),

    #[error("SMTP is not configured (set smtp.host or CASHDASH_SMTP_HOST)")]
    NoSmtp,

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address '{address}': {reason}")]
    Address { address: String, reason: String },

    #[error("could not build message: {0}")]
    Build(String),

    #[error("SMTP delivery failed: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
#[error("template render failed: {0}")]
pub struct TemplateError(pub String);
