//! @acp:module "Class Parser"
//! @acp:summary "Converts a reflected class into a class node"
//! @acp:domain parsing
//! @acp:layer service
//!
//! `extends`/`implements` stay plain names here; they are matched against
//! persisted classes and interfaces only at import time.

use super::argument::ArgumentParser;
use super::constant::ConstantParser;
use super::member::{MethodOwner, MethodParser, PropertyParser};
use super::namespace_or_global;
use crate::ast::ClassReflection;
use crate::ir::ClassNode;
use crate::parse::docblock::DocBlockParser;

/// @acp:summary "Parser for a class element"
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassParser {
    constants: ConstantParser,
    properties: PropertyParser,
    methods: MethodParser,
    docblock: DocBlockParser,
}

impl ClassParser {
    pub fn new(arguments: ArgumentParser, constants: ConstantParser, docblock: DocBlockParser) -> Self {
        Self {
            constants,
            properties: PropertyParser::new(docblock),
            methods: MethodParser::new(arguments, docblock),
            docblock,
        }
    }

    /// @acp:summary "Parse the class element"
    pub fn parse(&self, reflection: &ClassReflection) -> ClassNode {
        ClassNode {
            name: reflection.short_name.clone(),
            namespace: namespace_or_global(reflection.namespace.as_deref()),
            r#final: reflection.is_final,
            r#abstract: reflection.is_abstract,
            extends: reflection.extends.clone().unwrap_or_default(),
            implements: reflection.implements.clone(),
            constants: self.constants.parse_all(&reflection.constants),
            properties: self.properties.parse_all(&reflection.properties),
            methods: self.methods.parse_all(&reflection.methods, MethodOwner::Class),
            docblock: self.docblock.parse(reflection),
        }
    }
}
