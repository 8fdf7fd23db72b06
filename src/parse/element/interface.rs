//! @acp:module "Interface Parser"
//! @acp:summary "Converts a reflected interface into an interface node"
//! @acp:domain parsing
//! @acp:layer service

use super::argument::ArgumentParser;
use super::constant::ConstantParser;
use super::member::{MethodOwner, MethodParser, PropertyParser};
use super::namespace_or_global;
use crate::ast::InterfaceReflection;
use crate::ir::InterfaceNode;
use crate::parse::docblock::DocBlockParser;

/// @acp:summary "Parser for an interface element"
#[derive(Debug, Clone, Copy, Default)]
pub struct InterfaceParser {
    constants: ConstantParser,
    properties: PropertyParser,
    methods: MethodParser,
    docblock: DocBlockParser,
}

impl InterfaceParser {
    pub fn new(arguments: ArgumentParser, constants: ConstantParser, docblock: DocBlockParser) -> Self {
        Self {
            constants,
            properties: PropertyParser::new(docblock),
            methods: MethodParser::new(arguments, docblock),
            docblock,
        }
    }

    pub fn parse(&self, reflection: &InterfaceReflection) -> InterfaceNode {
        InterfaceNode {
            name: reflection.short_name.clone(),
            namespace: namespace_or_global(reflection.namespace.as_deref()),
            extends: reflection.extends.clone(),
            constants: self.constants.parse_all(&reflection.constants),
            properties: self.properties.parse_all(&reflection.properties),
            methods: self.methods.parse_all(&reflection.methods, MethodOwner::Interface),
            docblock: self.docblock.parse(reflection),
        }
    }
}
