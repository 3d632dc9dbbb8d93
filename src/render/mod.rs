// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod chart;
pub mod console;
pub mod html;

use crate::error::TemplateError;
use handlebars::Handlebars;

/// Render a handlebars template. `{{x}}` is HTML-escaped, `{{{x}}}` is not.
pub fn render_template(template: &str, data: &serde_json::Value) -> Result<String, TemplateError> {
    Handlebars::new()
        .render_template(template, data)
        .map_err(|e| TemplateError(e.to_string()))
}
