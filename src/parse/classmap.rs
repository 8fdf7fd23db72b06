//! @acp:module "Classmap Parser"
//! @acp:summary "Extracts legacy class aliases from a release's classmap file"
//! @acp:domain parsing
//! @acp:layer service
//!
//! Best-effort, line oriented: every line mentioning `JLoader::registerAlias`
//! is parsed on its own as a PHP statement. Lines that are not exactly a
//! two- or three-argument static call with literal arguments are skipped.

use std::path::Path;

use tracing::debug;
use tree_sitter::{Node, Parser};

use crate::ast::php::{parse_source, php_parser, unquote};
use crate::error::Result;
use crate::ir::AliasNode;

const REGISTRATION_MARKER: &str = "jloader::registeralias";

/// Deprecation version assumed when a registration omits it
pub const DEFAULT_ALIAS_VERSION: &str = "4.0";

/// @acp:summary "Parser for a classmap file"
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassmapParser;

impl ClassmapParser {
    pub fn new() -> Self {
        Self
    }

    /// @acp:summary "Parse a classmap file from disk"
    pub fn parse<P: AsRef<Path>>(&self, path: P) -> Result<Vec<AliasNode>> {
        let bytes = std::fs::read(path.as_ref())?;
        self.parse_source(&String::from_utf8_lossy(&bytes))
    }

    /// @acp:summary "Scan classmap source line by line"
    pub fn parse_source(&self, source: &str) -> Result<Vec<AliasNode>> {
        let mut parser = php_parser()?;
        let mut aliases = Vec::new();

        for (index, line) in source.lines().enumerate() {
            if !line.to_ascii_lowercase().contains(REGISTRATION_MARKER) {
                continue;
            }

            match parse_line(&mut parser, line)? {
                Some(alias) if !alias.alias.is_empty() && !alias.original.is_empty() => {
                    aliases.push(alias)
                }
                _ => debug!("Skipping classmap line {}: {}", index + 1, line.trim()),
            }
        }

        Ok(aliases)
    }
}

/// `Ok(None)` when the line does not have the expected shape.
fn parse_line(parser: &mut Parser, line: &str) -> Result<Option<AliasNode>> {
    let source = format!("<?php {}", line);
    let tree = parse_source(parser, &source)?;
    let root = tree.root_node();
    if root.has_error() {
        return Ok(None);
    }

    let text = |node: Node| node.utf8_text(source.as_bytes()).unwrap_or("").to_string();

    let mut cursor = root.walk();
    let Some(statement) = root
        .named_children(&mut cursor)
        .find(|n| !matches!(n.kind(), "php_tag" | "comment"))
    else {
        return Ok(None);
    };
    if statement.kind() != "expression_statement" {
        return Ok(None);
    }

    let mut cursor = statement.walk();
    let Some(call) = statement.named_children(&mut cursor).next() else {
        return Ok(None);
    };
    if call.kind() != "scoped_call_expression" {
        return Ok(None);
    }

    let scope = call.child_by_field_name("scope").map(text).unwrap_or_default();
    let first_segment = scope.trim_start_matches('\\').split('\\').next().unwrap_or("");
    let name = call.child_by_field_name("name").map(text).unwrap_or_default();
    if first_segment != "JLoader" || name != "registerAlias" {
        return Ok(None);
    }

    let Some(arguments) = call.child_by_field_name("arguments") else {
        return Ok(None);
    };
    let mut cursor = arguments.walk();
    let values: Vec<Option<String>> = arguments
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "argument")
        .map(|argument| literal_value(argument, &source))
        .collect();

    if values.len() < 2 || values.len() > 3 {
        return Ok(None);
    }
    let values: Option<Vec<String>> = values.into_iter().collect();
    let Some(values) = values else {
        return Ok(None);
    };

    Ok(Some(AliasNode {
        alias: values[0].trim_start_matches('\\').to_string(),
        original: values[1].trim_start_matches('\\').to_string(),
        version: values
            .get(2)
            .cloned()
            .unwrap_or_else(|| DEFAULT_ALIAS_VERSION.to_string()),
    }))
}

fn literal_value(argument: Node, source: &str) -> Option<String> {
    let mut cursor = argument.walk();
    let value = argument.named_children(&mut cursor).last()?;
    let raw = value.utf8_text(source.as_bytes()).ok()?;

    match value.kind() {
        "string" | "encapsed_string" => Some(unquote(raw)),
        "integer" | "float" => Some(raw.to_string()),
        _ => None,
    }
}
