//! @acp:module "PHP Reflection"
//! @acp:summary "Builds the reflection view of a PHP file from a tree-sitter-php syntax tree"
//! @acp:domain parsing
//! @acp:layer service
//!
//! Tracks namespace and `use` import state while walking top-level statements
//! so that `extends`/`implements` names come out fully qualified. Traits,
//! enums and anything inside function bodies are ignored.

use std::collections::BTreeMap;
use std::path::Path;

use tree_sitter::{Node, Parser, Tree};

use super::{
    ArgumentReflection, ClassReflection, ConstantReflection, FileReflection, FunctionReflection,
    InterfaceReflection, MethodReflection, PropertyReflection, Visibility,
};
use crate::error::{ApidocError, Result};

const BUILTIN_TYPES: &[&str] = &[
    "array", "bool", "boolean", "callable", "false", "float", "double", "int", "integer",
    "iterable", "mixed", "never", "null", "object", "parent", "self", "static", "string",
    "true", "void",
];

/// A tree-sitter parser loaded with the PHP grammar.
pub fn php_parser() -> Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_php::LANGUAGE_PHP.into())
        .map_err(|e| ApidocError::Other(format!("Failed to load PHP grammar: {}", e)))?;
    Ok(parser)
}

/// Parse PHP source into a syntax tree.
pub fn parse_source(parser: &mut Parser, source: &str) -> Result<Tree> {
    parser
        .parse(source, None)
        .ok_or_else(|| ApidocError::Other("PHP parser returned no tree".to_string()))
}

/// @acp:summary "Reflect one PHP file"
/// @acp:summary "Fails with ParseFailure when the source contains syntax errors"
pub fn reflect_file(path: &Path, source: &str) -> Result<FileReflection> {
    let tree = parse_source(&mut php_parser()?, source)?;
    let root = tree.root_node();

    if let Some(bad) = first_error(root) {
        let snippet = node_text(bad, source.as_bytes())
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(40)
            .collect::<String>();
        let message = if bad.is_missing() {
            format!("syntax error, missing `{}`", bad.kind())
        } else if snippet.is_empty() {
            "syntax error".to_string()
        } else {
            format!("syntax error, unexpected `{}`", snippet)
        };
        return Err(ApidocError::parse_failure(
            path,
            Some(bad.start_position().row + 1),
            message,
        ));
    }

    let mut reflector = Reflector {
        source: source.as_bytes(),
        namespace: None,
        aliases: BTreeMap::new(),
        file: FileReflection {
            path: path.to_path_buf(),
            ..Default::default()
        },
    };
    reflector.file.doc_comment = reflector.file_doc_comment(root);
    reflector.walk_statements(root);

    Ok(reflector.file)
}

struct Reflector<'s> {
    source: &'s [u8],
    namespace: Option<String>,
    aliases: BTreeMap<String, String>,
    file: FileReflection,
}

impl<'s> Reflector<'s> {
    fn text(&self, node: Node) -> String {
        node_text(node, self.source).to_string()
    }

    fn walk_statements(&mut self, parent: Node) {
        for node in children(parent) {
            match node.kind() {
                "namespace_definition" => self.enter_namespace(node),
                "namespace_use_declaration" => self.record_use(node),
                "class_declaration" => {
                    if let Some(class) = self.reflect_class(node) {
                        self.file.classes.push(class);
                    }
                }
                "interface_declaration" => {
                    if let Some(interface) = self.reflect_interface(node) {
                        self.file.interfaces.push(interface);
                    }
                }
                "function_definition" => {
                    if let Some(function) = self.reflect_function(node) {
                        self.file.functions.push(function);
                    }
                }
                "const_declaration" => {
                    let constants = self.reflect_constants(node);
                    self.file.constants.extend(constants);
                }
                "expression_statement" => {
                    if let Some(constant) = self.reflect_define(node) {
                        self.file.constants.push(constant);
                    }
                }
                // Conditional declarations such as `if (!class_exists(...)) { class ... }`
                "compound_statement" | "if_statement" | "else_clause" | "else_if_clause"
                | "colon_block" | "declare_statement" => self.walk_statements(node),
                _ => {}
            }
        }
    }

    fn enter_namespace(&mut self, node: Node) {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).trim_start_matches('\\').to_string())
            .filter(|n| !n.is_empty());

        self.aliases.clear();
        match node.child_by_field_name("body") {
            Some(body) => {
                self.namespace = name;
                self.walk_statements(body);
                self.namespace = None;
                self.aliases.clear();
            }
            None => self.namespace = name,
        }
    }

    fn record_use(&mut self, node: Node) {
        let parts = children(node);

        // `use function` / `use const` do not import class names
        if parts.iter().any(|c| matches!(c.kind(), "function" | "const")) {
            return;
        }

        let prefix = parts
            .iter()
            .find(|c| c.kind() == "namespace_name")
            .map(|c| self.text(*c).trim_start_matches('\\').to_string());

        for part in &parts {
            match part.kind() {
                "namespace_use_clause" => self.record_use_clause(*part, None),
                "namespace_use_group" => {
                    for clause in children(*part) {
                        if matches!(clause.kind(), "namespace_use_clause" | "namespace_use_group_clause") {
                            self.record_use_clause(clause, prefix.as_deref());
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn record_use_clause(&mut self, clause: Node, prefix: Option<&str>) {
        let names: Vec<Node> = children(clause)
            .into_iter()
            .filter(|c| matches!(c.kind(), "name" | "qualified_name" | "namespace_name"))
            .collect();
        let Some(target) = names.first() else {
            return;
        };

        let mut imported = self.text(*target).trim_start_matches('\\').to_string();
        if let Some(prefix) = prefix {
            imported = format!("{}\\{}", prefix, imported);
        }

        let alias = clause
            .child_by_field_name("alias")
            .or_else(|| {
                find_child(clause, "namespace_aliasing_clause").and_then(|c| find_child(c, "name"))
            })
            .or_else(|| names.get(1).copied())
            .map(|n| self.text(n))
            .unwrap_or_else(|| last_segment(&imported).to_string());

        self.aliases.insert(alias, imported);
    }

    /// Resolve a class reference against the current namespace and imports.
    fn resolve(&self, raw: &str) -> String {
        let raw = raw.trim();
        if let Some(qualified) = raw.strip_prefix('\\') {
            return qualified.to_string();
        }
        if let Some(rest) = raw.strip_prefix("namespace\\") {
            return self.qualify(rest);
        }

        let (head, tail) = match raw.split_once('\\') {
            Some((head, tail)) => (head, Some(tail)),
            None => (raw, None),
        };
        let imported = self
            .aliases
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(head))
            .map(|(_, target)| target);

        match (imported, tail) {
            (Some(target), Some(tail)) => format!("{}\\{}", target, tail),
            (Some(target), None) => target.clone(),
            (None, _) => self.qualify(raw),
        }
    }

    fn qualify(&self, name: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{}\\{}", ns, name),
            None => name.to_string(),
        }
    }

    fn resolve_type(&self, raw: &str) -> String {
        let bare = raw.trim_start_matches('?');
        let is_simple = !bare.is_empty()
            && bare
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '\\');

        if !is_simple || BUILTIN_TYPES.contains(&bare.to_ascii_lowercase().as_str()) {
            return raw.to_string();
        }

        let resolved = self.resolve(bare);
        if raw.starts_with('?') {
            format!("?{}", resolved)
        } else {
            resolved
        }
    }

    fn names_in(&self, clause: Node) -> Vec<String> {
        children(clause)
            .into_iter()
            .filter(|c| matches!(c.kind(), "name" | "qualified_name"))
            .map(|c| self.resolve(&self.text(c)))
            .collect()
    }

    fn reflect_class(&self, node: Node) -> Option<ClassReflection> {
        let short_name = self.text(node.child_by_field_name("name")?);
        let mut class = ClassReflection {
            short_name,
            namespace: self.namespace.clone(),
            doc_comment: doc_comment_for(node, self.source),
            line: node.start_position().row + 1,
            ..Default::default()
        };

        for child in children(node) {
            match child.kind() {
                "abstract_modifier" => class.is_abstract = true,
                "final_modifier" => class.is_final = true,
                "base_clause" => class.extends = self.names_in(child).into_iter().next(),
                "class_interface_clause" => class.implements = self.names_in(child),
                _ => {}
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            for member in children(body) {
                match member.kind() {
                    "const_declaration" => class.constants.extend(self.reflect_constants(member)),
                    "property_declaration" => class.properties.extend(self.reflect_properties(member)),
                    "method_declaration" => {
                        if let Some(method) = self.reflect_method(member) {
                            class.methods.push(method);
                        }
                    }
                    _ => {}
                }
            }
        }

        Some(class)
    }

    fn reflect_interface(&self, node: Node) -> Option<InterfaceReflection> {
        let short_name = self.text(node.child_by_field_name("name")?);
        let mut interface = InterfaceReflection {
            short_name,
            namespace: self.namespace.clone(),
            doc_comment: doc_comment_for(node, self.source),
            line: node.start_position().row + 1,
            ..Default::default()
        };

        for child in children(node) {
            if child.kind() == "base_clause" {
                interface.extends = self.names_in(child);
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            for member in children(body) {
                match member.kind() {
                    "const_declaration" => interface.constants.extend(self.reflect_constants(member)),
                    "property_declaration" => {
                        interface.properties.extend(self.reflect_properties(member))
                    }
                    "method_declaration" => {
                        if let Some(method) = self.reflect_method(member) {
                            interface.methods.push(method);
                        }
                    }
                    _ => {}
                }
            }
        }

        Some(interface)
    }

    fn reflect_method(&self, node: Node) -> Option<MethodReflection> {
        let name = self.text(node.child_by_field_name("name")?);
        let mut method = MethodReflection {
            name,
            namespace_aliases: self.aliases.clone(),
            doc_comment: doc_comment_for(node, self.source),
            ..Default::default()
        };

        for child in children(node) {
            match child.kind() {
                "visibility_modifier" => method.visibility = Visibility::from_keyword(&self.text(child)),
                "static_modifier" => method.is_static = true,
                "abstract_modifier" => method.is_abstract = true,
                "final_modifier" => method.is_final = true,
                _ => {}
            }
        }

        if let Some(parameters) = node.child_by_field_name("parameters") {
            method.arguments = self.reflect_arguments(parameters);
        }

        Some(method)
    }

    fn reflect_properties(&self, node: Node) -> Vec<PropertyReflection> {
        let doc_comment = doc_comment_for(node, self.source);
        let mut visibility = Visibility::Public;
        let mut is_static = false;
        let mut names = Vec::new();

        for child in children(node) {
            match child.kind() {
                "visibility_modifier" => visibility = Visibility::from_keyword(&self.text(child)),
                "static_modifier" => is_static = true,
                "property_element" => {
                    let variable = child
                        .child_by_field_name("name")
                        .or_else(|| find_child(child, "variable_name"));
                    if let Some(variable) = variable {
                        names.push(self.text(variable).trim_start_matches('$').to_string());
                    }
                }
                _ => {}
            }
        }

        names
            .into_iter()
            .map(|name| PropertyReflection {
                name,
                visibility,
                is_static,
                doc_comment: doc_comment.clone(),
            })
            .collect()
    }

    fn reflect_constants(&self, node: Node) -> Vec<ConstantReflection> {
        let doc_comment = doc_comment_for(node, self.source);

        children(node)
            .into_iter()
            .filter(|c| c.kind() == "const_element")
            .filter_map(|element| find_child(element, "name"))
            .map(|name| ConstantReflection {
                name: self.text(name),
                doc_comment: doc_comment.clone(),
            })
            .collect()
    }

    /// `define('NAME', value);` at statement level
    fn reflect_define(&self, statement: Node) -> Option<ConstantReflection> {
        let call = find_child(statement, "function_call_expression")?;
        let callee = call.child_by_field_name("function")?;
        if !self.text(callee).trim_start_matches('\\').eq_ignore_ascii_case("define") {
            return None;
        }

        let arguments = call.child_by_field_name("arguments")?;
        let first = children(arguments)
            .into_iter()
            .find(|c| c.kind() == "argument")?;
        let literal = children(first)
            .into_iter()
            .find(|c| matches!(c.kind(), "string" | "encapsed_string"))?;

        Some(ConstantReflection {
            name: unquote(&self.text(literal)),
            doc_comment: doc_comment_for(statement, self.source),
        })
    }

    fn reflect_function(&self, node: Node) -> Option<FunctionReflection> {
        let short_name = self.text(node.child_by_field_name("name")?);
        let arguments = node
            .child_by_field_name("parameters")
            .map(|p| self.reflect_arguments(p))
            .unwrap_or_default();

        Some(FunctionReflection {
            short_name,
            namespace: self.namespace.clone(),
            namespace_aliases: self.aliases.clone(),
            arguments,
            doc_comment: doc_comment_for(node, self.source),
        })
    }

    fn reflect_arguments(&self, parameters: Node) -> Vec<ArgumentReflection> {
        children(parameters)
            .into_iter()
            .filter(|p| {
                matches!(
                    p.kind(),
                    "simple_parameter" | "variadic_parameter" | "property_promotion_parameter"
                )
            })
            .filter_map(|p| {
                let name = p
                    .child_by_field_name("name")
                    .or_else(|| find_child(p, "variable_name"))?;
                Some(ArgumentReflection {
                    name: self.text(name).trim_start_matches('$').to_string(),
                    type_hint: p
                        .child_by_field_name("type")
                        .map(|t| self.resolve_type(&self.text(t))),
                    default: p
                        .child_by_field_name("default_value")
                        .map(|d| self.text(d)),
                })
            })
            .collect()
    }

    /// The first docblock of the file, unless it documents the declaration right after it.
    fn file_doc_comment(&self, root: Node) -> Option<String> {
        let mut nodes = children(root).into_iter();
        let first_doc = nodes.by_ref().find(|n| is_doc_comment(*n, self.source))?;

        let mut next = first_doc.next_sibling();
        while let Some(sibling) = next {
            if sibling.kind() != "comment" {
                break;
            }
            if is_doc_comment(sibling, self.source) {
                return Some(self.text(first_doc));
            }
            next = sibling.next_sibling();
        }

        match next.map(|n| n.kind()) {
            Some(
                "class_declaration" | "interface_declaration" | "trait_declaration"
                | "enum_declaration" | "function_definition" | "const_declaration",
            ) => None,
            _ => Some(self.text(first_doc)),
        }
    }
}

fn children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn find_child<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    children(node).into_iter().find(|c| c.kind() == kind)
}

fn node_text<'s>(node: Node, source: &'s [u8]) -> &'s str {
    node.utf8_text(source).unwrap_or("")
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    children(node).into_iter().find_map(first_error)
}

fn is_doc_comment(node: Node, source: &[u8]) -> bool {
    node.kind() == "comment" && node_text(node, source).starts_with("/**")
}

/// Doc comment directly preceding a declaration; plain comments in between are skipped.
fn doc_comment_for(node: Node, source: &[u8]) -> Option<String> {
    let mut prev = node.prev_sibling();
    while let Some(sibling) = prev {
        if sibling.kind() != "comment" {
            return None;
        }
        if is_doc_comment(sibling, source) {
            return Some(node_text(sibling, source).to_string());
        }
        prev = sibling.prev_sibling();
    }
    None
}

fn last_segment(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

/// Strip quotes from a PHP string literal and undo the simple escapes.
pub(crate) fn unquote(literal: &str) -> String {
    let literal = literal.trim();
    let inner = if literal.len() >= 2
        && ((literal.starts_with('\'') && literal.ends_with('\''))
            || (literal.starts_with('"') && literal.ends_with('"')))
    {
        &literal[1..literal.len() - 1]
    } else {
        literal
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if matches!(next, '\\' | '\'' | '"') {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}
