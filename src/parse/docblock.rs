//! @acp:module "DocBlock Interpreter"
//! @acp:summary "Turns a raw documentation comment into summary, description and tags"
//! @acp:domain parsing
//! @acp:layer service
//!
//! Interpretation is lossy and never fails: a tag whose sub-fields cannot be
//! recognised keeps its name and description and simply omits the rest.

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::Documented;
use crate::ir::{DocBlock, Tag};

/// Tag line: `@name rest...`
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^@([A-Za-z][\w\\:-]*)(?:\s+(.*))?$").unwrap());

/// Inline tag start inside a one-line docblock
static INLINE_TAG_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s@[A-Za-z]").unwrap());

/// Version token as used by `@since`, `@version` and `@deprecated`
static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(\d[^\s]*)(?:\s+(.*))?$").unwrap());

/// @acp:summary "Parser for an element's doc block"
#[derive(Debug, Clone, Copy, Default)]
pub struct DocBlockParser;

impl DocBlockParser {
    pub fn new() -> Self {
        Self
    }

    /// @acp:summary "Interpret the docblock attached to an element"
    /// Elements without a docblock yield the empty record.
    pub fn parse(&self, element: &dyn Documented) -> DocBlock {
        element
            .doc_comment()
            .map(|raw| self.interpret(raw))
            .unwrap_or_default()
    }

    /// @acp:summary "Interpret raw `/** ... */` text"
    pub fn interpret(&self, raw: &str) -> DocBlock {
        let lines = clean_lines(raw);
        let (body, tag_blocks) = split_tags(&lines);
        let (summary, description) = split_summary(&body);

        DocBlock {
            summary,
            description,
            tags: tag_blocks.iter().filter_map(|block| parse_tag(block)).collect(),
        }
    }
}

/// Remove the comment delimiters and the leading `*` of every line.
fn clean_lines(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    let inner = trimmed.strip_prefix("/**").unwrap_or(trimmed);
    let inner = inner.strip_suffix("*/").unwrap_or(inner);

    let mut lines: Vec<String> = inner
        .lines()
        .map(|line| {
            let line = line.trim_start();
            let line = match line.strip_prefix('*') {
                Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
                None => line,
            };
            line.trim_end().to_string()
        })
        .collect();

    while lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    // `/** Summary. @tag value */` keeps tags on the same line
    if lines.len() == 1 {
        let line = lines[0].clone();
        let starts: Vec<usize> = INLINE_TAG_START
            .find_iter(&line)
            .map(|m| m.end() - 2)
            .collect();
        if !starts.is_empty() {
            let mut pieces = Vec::new();
            let mut from = 0;
            for start in starts {
                pieces.push(line[from..start].trim().to_string());
                from = start;
            }
            pieces.push(line[from..].trim().to_string());
            lines = pieces.into_iter().filter(|p| !p.is_empty()).collect();
        }
    }

    lines
}

/// Separate the free text from the tag section. Each tag block is the tag
/// line plus its continuation lines.
fn split_tags(lines: &[String]) -> (Vec<String>, Vec<String>) {
    let mut body = Vec::new();
    let mut tags: Vec<String> = Vec::new();

    for line in lines {
        let starts_tag = line.starts_with('@')
            && line[1..].chars().next().is_some_and(|c| c.is_ascii_alphabetic());

        if starts_tag {
            tags.push(line.clone());
        } else if let Some(current) = tags.last_mut() {
            current.push('\n');
            current.push_str(line.trim());
        } else {
            body.push(line.clone());
        }
    }

    (body, tags)
}

/// The summary ends at a line ending in `.` or at the first blank line.
fn split_summary(body: &[String]) -> (String, String) {
    let mut summary = Vec::new();
    let mut rest = body.iter();

    for line in rest.by_ref() {
        if line.trim().is_empty() {
            if summary.is_empty() {
                continue;
            }
            break;
        }
        summary.push(line.trim());
        if line.trim_end().ends_with('.') {
            break;
        }
    }

    let description = rest.cloned().collect::<Vec<_>>().join("\n");
    (summary.join("\n"), description.trim().to_string())
}

fn parse_tag(block: &str) -> Option<Tag> {
    let caps = TAG_PATTERN.captures(block.trim())?;
    let name = caps.get(1)?.as_str().to_string();
    let content = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");

    let mut tag = Tag::new(name.clone(), content);

    match name.as_str() {
        "return" | "throws" => {
            let (types, description) = next_token(content);
            tag.types = Some(split_types(types));
            tag.description = description.to_string();
        }
        "param" | "var" | "property" | "property-read" | "property-write" => {
            let (first, after_first) = next_token(content);
            if is_variable(first) {
                tag.types = Some(Vec::new());
                tag.variable = Some(variable_name(first));
                tag.description = after_first.to_string();
            } else {
                tag.types = Some(split_types(first));
                let (second, after_second) = next_token(after_first);
                if is_variable(second) {
                    tag.variable = Some(variable_name(second));
                    tag.description = after_second.to_string();
                } else {
                    tag.description = after_first.to_string();
                }
            }
        }
        "link" => {
            let (link, description) = next_token(content);
            if !link.is_empty() {
                tag.link = Some(link.to_string());
                tag.description = description.to_string();
            }
        }
        "see" | "uses" | "used-by" => {
            let (refers, description) = next_token(content);
            if !refers.is_empty() {
                tag.refers = Some(refers.to_string());
                tag.description = description.to_string();
            }
        }
        "version" | "since" | "deprecated" => {
            if let Some(caps) = VERSION_PATTERN.captures(content) {
                tag.version = caps.get(1).map(|m| m.as_str().to_string());
                tag.description = caps
                    .get(2)
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default();
            }
        }
        _ => {}
    }

    Some(tag)
}

fn next_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(idx) => (&s[..idx], s[idx..].trim()),
        None => (s, ""),
    }
}

fn split_types(types: &str) -> Vec<String> {
    types
        .split('|')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

fn is_variable(token: &str) -> bool {
    token
        .trim_start_matches('&')
        .trim_start_matches("...")
        .starts_with('$')
}

fn variable_name(token: &str) -> String {
    token
        .trim_start_matches('&')
        .trim_start_matches("...")
        .trim_start_matches('$')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn interpret(raw: &str) -> DocBlock {
        DocBlockParser::new().interpret(raw)
    }

    #[test]
    fn test_summary_description_and_tags() {
        let doc = interpret(
            r#"/**
     * Method to load a row from the database.
     *
     * Loads the row by primary key and binds the fields
     * to the table instance.
     *
     * @param   mixed    $keys   An optional primary key value to load the row by.
     * @param   boolean  $reset  True to reset the default values before loading.
     *
     * @return  boolean|null  True if successful.
     *
     * @since   1.7.0
     * @link    https://docs.joomla.org/Table  Table docs
     * @see     Table::bind()
     */"#,
        );

        assert_eq!(doc.summary, "Method to load a row from the database.");
        assert_eq!(
            doc.description,
            "Loads the row by primary key and binds the fields\nto the table instance."
        );
        assert_eq!(doc.tags.len(), 6);

        let keys = &doc.tags[0];
        assert_eq!(keys.name, "param");
        assert_eq!(keys.variable.as_deref(), Some("keys"));
        assert_eq!(keys.types, Some(vec!["mixed".to_string()]));
        assert_eq!(keys.description, "An optional primary key value to load the row by.");

        let ret = &doc.tags[2];
        assert_eq!(ret.types, Some(vec!["boolean".to_string(), "null".to_string()]));
        assert_eq!(ret.description, "True if successful.");
        assert_eq!(ret.variable, None);

        assert_eq!(doc.tags[3].version.as_deref(), Some("1.7.0"));
        assert_eq!(doc.tags[3].description, "");
        assert_eq!(doc.tags[4].link.as_deref(), Some("https://docs.joomla.org/Table"));
        assert_eq!(doc.tags[4].description, "Table docs");
        assert_eq!(doc.tags[5].refers.as_deref(), Some("Table::bind()"));
    }

    #[test]
    fn test_single_line_with_tag() {
        let doc = interpret("/** Does a thing. @deprecated 5.0 Use Bar instead. */");
        assert_eq!(doc.summary, "Does a thing.");
        assert_eq!(doc.description, "");
        assert_eq!(doc.tags.len(), 1);
        assert_eq!(doc.tags[0].name, "deprecated");
        assert_eq!(doc.tags[0].version.as_deref(), Some("5.0"));
        assert_eq!(doc.tags[0].description, "Use Bar instead.");
    }

    #[test]
    fn test_single_line_with_unicode_space_before_tag() {
        let doc = interpret("/** Does a thing.\u{a0}@deprecated 5.0 Use Bar instead. */");
        assert_eq!(doc.summary, "Does a thing.");
        assert_eq!(doc.tags.len(), 1);
        assert_eq!(doc.tags[0].name, "deprecated");
        assert_eq!(doc.tags[0].version.as_deref(), Some("5.0"));
    }

    #[test]
    fn test_deprecated_without_version() {
        let doc = interpret("/**\n * @deprecated  Use the new router\n */");
        assert_eq!(doc.summary, "");
        assert_eq!(doc.tags[0].version, None);
        assert_eq!(doc.tags[0].description, "Use the new router");
    }

    #[test]
    fn test_summary_ends_at_blank_line() {
        let doc = interpret("/**\n * Summary without a period\n * on two lines\n *\n * Body.\n */");
        assert_eq!(doc.summary, "Summary without a period\non two lines");
        assert_eq!(doc.description, "Body.");
    }

    #[test]
    fn test_malformed_tags_keep_base_fields() {
        let doc = interpret("/**\n * @param\n * @return\n * @custom anything goes\n */");
        assert_eq!(doc.tags[0].name, "param");
        assert_eq!(doc.tags[0].variable, None);
        assert_eq!(doc.tags[1].types, Some(Vec::new()));
        assert_eq!(doc.tags[2].description, "anything goes");
        assert_eq!(doc.tags[2].types, None);
    }

    #[test]
    fn test_param_continuation_and_variants() {
        let doc = interpret(
            "/**\n * @param  array  &$options  Options for\n *                   the call.\n * @param  $plain\n */",
        );
        assert_eq!(doc.tags[0].variable.as_deref(), Some("options"));
        assert_eq!(doc.tags[0].description, "Options for\nthe call.");
        assert_eq!(doc.tags[1].variable.as_deref(), Some("plain"));
        assert_eq!(doc.tags[1].types, Some(Vec::new()));
    }

    #[test]
    fn test_missing_docblock_is_empty() {
        let constant = crate::ast::ConstantReflection {
            name: "JVERSION".into(),
            doc_comment: None,
        };
        assert!(DocBlockParser::new().parse(&constant).is_empty());
    }
}
