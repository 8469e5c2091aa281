use regex::{Captures, Regex};
use std::sync::LazyLock;
use tera::{Context, Tera};
use thiserror::Error;

use crate::types::InboundPayload;

const TEMPLATE_NAME: &str = "text";

// Whole `{{ ... }}` / `{% ... %}` tags
static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(\{\{|\{%)(.*?)(\}\}|%\})").expect("Invalid tag regex")
});

// A quoted string literal (left untouched), or a leading-dot field reference
// inside a tag: `.issue.key` but not `a.b` or `1.5`
static DOT_REF_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"("[^"]*"|'[^']*'|`[^`]*`)|(^|[\s(\[,|!=<>+*/~-])\.([A-Za-z_])"#)
        .expect("Invalid field reference regex")
});

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("invalid message template: {}", error_chain(.0))]
    Compile(#[source] tera::Error),
    #[error("failed to render message: {}", error_chain(.0))]
    Render(#[source] tera::Error),
}

/// A message template compiled once at startup and rendered per request.
///
/// Holds no mutable state, so a single instance can be shared behind an
/// `Arc` and rendered from any number of requests at once.
pub struct MessageTemplate {
    tera: Tera,
}

impl MessageTemplate {
    pub fn compile(source: &str) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        // Plain text output, never HTML-escaped
        tera.autoescape_on(vec![]);
        tera.add_raw_template(TEMPLATE_NAME, &normalize_field_refs(source))
            .map_err(TemplateError::Compile)?;
        Ok(Self { tera })
    }

    /// Renders the template against one inbound payload. Missing fields and
    /// shape mismatches (indexing into a scalar) are errors, not empty output.
    pub fn render(&self, data: &InboundPayload) -> Result<String, TemplateError> {
        let context = Context::from_serialize(data).map_err(TemplateError::Render)?;
        self.tera
            .render(TEMPLATE_NAME, &context)
            .map_err(TemplateError::Render)
    }
}

/// Rewrites Go-style `{{.issue.key}}` references into `{{issue.key}}` so
/// templates written for the old relay keep working.
fn normalize_field_refs(source: &str) -> String {
    TAG_REGEX
        .replace_all(source, |caps: &Captures| {
            let inner = DOT_REF_REGEX.replace_all(&caps[2], |part: &Captures| {
                match part.get(1) {
                    Some(literal) => literal.as_str().to_string(),
                    None => format!("{}{}", &part[2], &part[3]),
                }
            });
            format!("{}{}{}", &caps[1], inner, &caps[3])
        })
        .into_owned()
}

fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn payload(value: Value) -> InboundPayload {
        match value {
            Value::Object(map) => map,
            other => panic!("test payload must be an object, got {}", other),
        }
    }

    fn render(source: &str, value: Value) -> Result<String, TemplateError> {
        MessageTemplate::compile(source)
            .expect("template should compile")
            .render(&payload(value))
    }

    #[test]
    fn substitutes_top_level_strings_verbatim() {
        let text = render(
            "{{.user}} moved {{.key}} to <{{.status}}> & done",
            json!({ "user": "Ada <ada@example.com>", "key": "OPS-7", "status": "Done & \"dusted\"" }),
        )
        .unwrap();
        assert_eq!(
            text,
            "Ada <ada@example.com> moved OPS-7 to <Done & \"dusted\"> & done"
        );
    }

    #[test]
    fn tera_style_references_render_the_same() {
        let value = json!({ "issue": { "key": "OPS-1" } });
        assert_eq!(
            render("{{ issue.key }}", value.clone()).unwrap(),
            render("{{.issue.key}}", value).unwrap()
        );
    }

    #[test]
    fn walks_nested_maps_and_arrays() {
        let text = render(
            "{{.issue.fields.summary}} [{{ .issue.fields.labels.1 }}]",
            json!({
                "issue": { "fields": { "summary": "Disk full", "labels": ["infra", "urgent"] } }
            }),
        )
        .unwrap();
        assert_eq!(text, "Disk full [urgent]");
    }

    #[test]
    fn stringifies_numbers_and_booleans() {
        let text = render(
            "{{.count}} {{.ratio}} {{.open}}",
            json!({ "count": 3, "ratio": 1.5, "open": true }),
        )
        .unwrap();
        assert_eq!(text, "3 1.5 true");
    }

    #[test]
    fn control_blocks_accept_dot_references() {
        let source = "{% if .assignee %}{{.assignee.name}}{% else %}nobody{% endif %}";
        assert_eq!(
            render(source, json!({ "assignee": { "name": "Lin" } })).unwrap(),
            "Lin"
        );
        assert_eq!(render(source, json!({ "assignee": null })).unwrap(), "nobody");
    }

    #[test]
    fn missing_field_is_a_render_error() {
        let err = render("{{.missing}}", json!({})).unwrap_err();
        assert!(matches!(err, TemplateError::Render(_)));
        assert!(err.to_string().contains("missing"), "got: {}", err);
    }

    #[test]
    fn indexing_into_a_scalar_is_a_render_error() {
        let err = render("{{.issue.key}}", json!({ "issue": "OPS-1" })).unwrap_err();
        assert!(matches!(err, TemplateError::Render(_)));
    }

    #[test]
    fn invalid_syntax_fails_to_compile() {
        for source in ["{{ .summary", "{% if .x %}open", "{{.}}", "{% frobnicate %}"] {
            let result = MessageTemplate::compile(source);
            assert!(
                matches!(result, Err(TemplateError::Compile(_))),
                "expected compile error for {:?}",
                source
            );
        }
    }

    #[test]
    fn literal_decimals_are_left_alone() {
        assert_eq!(normalize_field_refs("{{ 1.5 + .n }}"), "{{ 1.5 + n }}");
        assert_eq!(normalize_field_refs("a.b {{.a.b}}"), "a.b {{a.b}}");
    }

    #[test]
    fn string_literals_inside_tags_are_left_alone() {
        assert_eq!(
            normalize_field_refs(r#"{{ "see .foo" }} {{ .a ~ ' .b' ~ .c }}"#),
            r#"{{ "see .foo" }} {{ a ~ ' .b' ~ c }}"#
        );
        assert_eq!(render(r#"{{ "see .foo" }}"#, json!({})).unwrap(), "see .foo");
    }

    #[test]
    fn compiled_template_is_shareable_across_tasks() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MessageTemplate>();
    }
}
