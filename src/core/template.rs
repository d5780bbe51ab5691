//! Message templates with `{KEY}` placeholders.
//!
//! `{{` and `}}` are literal braces. A brace that does not form a placeholder
//! is copied through unchanged.

use crate::domain::model::NAME_COLUMN;
use crate::utils::error::{LinkGenError, Result};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{|\}\}|\{([^{}]+)\}").expect("placeholder pattern"));

/// Decides when a template goes through substitution at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutionTrigger {
    /// Substitute only when the literal `{NOMBRE}` marker is present;
    /// otherwise the template is sent verbatim.
    NombreMarker,
    /// Substitute whenever the template contains any marker.
    #[default]
    AnyPlaceholder,
}

impl FromStr for SubstitutionTrigger {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "nombre_marker" => Ok(SubstitutionTrigger::NombreMarker),
            "any_placeholder" => Ok(SubstitutionTrigger::AnyPlaceholder),
            other => Err(format!(
                "unknown substitution trigger '{}', expected nombre-marker or any-placeholder",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub trigger: SubstitutionTrigger,
    /// Turn the two characters `\n` into a real line break.
    pub insert_newlines: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            trigger: SubstitutionTrigger::default(),
            insert_newlines: true,
        }
    }
}

/// Substitutes every placeholder, failing on the first name missing from `vars`.
pub fn render(template: &str, vars: &HashMap<String, String>) -> Result<String> {
    let mut output = String::with_capacity(template.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        output.push_str(&template[last..whole.start()]);
        output.push_str(&expand(&caps, vars)?);
        last = whole.end();
    }
    output.push_str(&template[last..]);

    Ok(output)
}

fn expand(caps: &Captures<'_>, vars: &HashMap<String, String>) -> Result<String> {
    match caps.get(1) {
        Some(name) => vars
            .get(name.as_str())
            .cloned()
            .ok_or_else(|| LinkGenError::MissingTemplateVariable {
                name: name.as_str().to_string(),
                row: None,
            }),
        None => Ok(caps[0][..1].to_string()),
    }
}

/// Applies the substitution trigger, then optional newline insertion.
pub fn render_with(
    template: &str,
    vars: &HashMap<String, String>,
    options: &RenderOptions,
) -> Result<String> {
    let substituted = if substitutes(template, options) {
        render(template, vars)?
    } else {
        template.to_string()
    };

    if options.insert_newlines {
        Ok(substituted.replace("\\n", "\n"))
    } else {
        Ok(substituted)
    }
}

/// Whether `options` put this template through substitution at all.
pub fn substitutes(template: &str, options: &RenderOptions) -> bool {
    match options.trigger {
        SubstitutionTrigger::NombreMarker => template.contains(&format!("{{{}}}", NAME_COLUMN)),
        SubstitutionTrigger::AnyPlaceholder => true,
    }
}

/// Placeholders the template would substitute that `headers` cannot supply.
/// Empty when the trigger leaves the template untouched.
pub fn missing_placeholders(
    template: &str,
    headers: &[String],
    options: &RenderOptions,
) -> Vec<String> {
    if !substitutes(template, options) {
        return Vec::new();
    }
    placeholders(template)
        .into_iter()
        .filter(|name| !headers.iter().any(|h| h == name))
        .collect()
}

/// Placeholder names in order of first appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(template) {
        if let Some(name) = caps.get(1) {
            if !names.iter().any(|n| n == name.as_str()) {
                names.push(name.as_str().to_string());
            }
        }
    }
    names
}
