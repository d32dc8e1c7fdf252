//! Path template interpolation
//!
//! Handles `{placeholder}` substitution in stream paths such as
//! `/campaigns/{campaign_id}/metrics`. Values come from the [`Context`]
//! derived from the parent record.

use crate::error::{Error, Result};
use crate::stream::Context;
use crate::types::scalar_to_string;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Regex for matching path placeholders: {name}
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").unwrap());

/// Render a path template with the given context
///
/// Every placeholder must resolve to a scalar context value; undefined
/// placeholders are collected and reported together.
pub fn render(template: &str, ctx: &Context) -> Result<String> {
    let mut errors = Vec::new();

    let rendered = PLACEHOLDER_REGEX.replace_all(template, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        match ctx.get(name).and_then(scalar_to_string) {
            Some(value) => value,
            None => {
                errors.push(name.to_string());
                String::new()
            }
        }
    });

    if errors.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::undefined_var(errors.join(", ")))
    }
}

/// Extract all placeholder names from a template, in order of appearance
pub fn extract_variables(template: &str) -> Vec<String> {
    PLACEHOLDER_REGEX
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Placeholder names as a set, for comparing against context keys
pub fn variable_set(template: &str) -> BTreeSet<String> {
    extract_variables(template).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simple_substitution() {
        let ctx = Context::new().with_value("campaign_id", json!(7));
        let result = render("/campaigns/{campaign_id}/metrics", &ctx).unwrap();
        assert_eq!(result, "/campaigns/7/metrics");
    }

    #[test]
    fn test_string_value_has_no_quotes() {
        let ctx = Context::new().with_value("newsletter_id", json!("abc"));
        let result = render("/newsletters/{newsletter_id}/metrics", &ctx).unwrap();
        assert_eq!(result, "/newsletters/abc/metrics");
    }

    #[test]
    fn test_multiple_substitutions() {
        let ctx = Context::new()
            .with_value("campaign_id", json!(1))
            .with_value("action_id", json!(2));
        let result = render("/campaigns/{campaign_id}/actions/{action_id}", &ctx).unwrap();
        assert_eq!(result, "/campaigns/1/actions/2");
    }

    #[test]
    fn test_undefined_variable() {
        let ctx = Context::new();
        let err = render("/campaigns/{campaign_id}/metrics", &ctx).unwrap_err();
        assert!(err.to_string().contains("campaign_id"));
    }

    #[test]
    fn test_null_value_is_undefined() {
        let ctx = Context::new().with_value("campaign_id", json!(null));
        assert!(render("/campaigns/{campaign_id}", &ctx).is_err());
    }

    #[test]
    fn test_no_placeholders() {
        let ctx = Context::new();
        assert_eq!(render("/segments", &ctx).unwrap(), "/segments");
    }

    #[test]
    fn test_extract_variables() {
        let vars = extract_variables("/a/{first}/b/{second}");
        assert_eq!(vars, vec!["first", "second"]);
        assert_eq!(
            variable_set("/a/{x}/b/{x}"),
            BTreeSet::from(["x".to_string()])
        );
    }
}
