//! `{{placeholder}}` rendering for prompt templates.
//!
//! Templates are plain text with `{{name}}` slots (optional inner
//! whitespace, names are `[A-Za-z_][A-Za-z0-9_]*`). Rendering substitutes
//! every slot whose name is present in the variable map; unknown slots are
//! left intact so a half-filled template is visible in the output instead of
//! silently collapsing.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Variable map for one render. Values are plain strings; callers format
/// numbers/dates before inserting.
pub type TemplateVars = HashMap<&'static str, String>;

/// Regex pattern matching `{{placeholder}}` slots in prompt templates.
pub const SLOT_PATTERN: &str = r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}";

/// Compiled regex for `{{placeholder}}` extraction. Compiled once, reused forever.
static SLOT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(SLOT_PATTERN).expect("valid regex"));

/// Render a template with the given variables.
pub fn render(template: &str, vars: &TemplateVars) -> String {
    SLOT_RE
        .replace_all(template, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            match vars.get(name) {
                Some(value) => value.clone(),
                // Unknown slot: keep the literal `{{name}}` text.
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Distinct placeholder names appearing in a template, in first-seen order.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in SLOT_RE.captures_iter(template) {
        let name = caps[1].to_string();
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}
