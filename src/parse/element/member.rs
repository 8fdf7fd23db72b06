//! @acp:module "Member Parsers"
//! @acp:summary "Method and property helpers shared by the class and interface parsers"
//! @acp:domain parsing
//! @acp:layer service

use super::argument::ArgumentParser;
use crate::ast::{MethodReflection, PropertyReflection};
use crate::ir::{MethodNode, PropertyNode};
use crate::parse::docblock::DocBlockParser;

/// Which kind of element declares the method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodOwner {
    Class,
    Interface,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MethodParser {
    arguments: ArgumentParser,
    docblock: DocBlockParser,
}

impl MethodParser {
    pub fn new(arguments: ArgumentParser, docblock: DocBlockParser) -> Self {
        Self {
            arguments,
            docblock,
        }
    }

    /// Class methods additionally report their `final`/`abstract` flags.
    pub fn parse(&self, reflection: &MethodReflection, owner: MethodOwner) -> MethodNode {
        let (r#final, r#abstract) = match owner {
            MethodOwner::Class => (Some(reflection.is_final), Some(reflection.is_abstract)),
            MethodOwner::Interface => (None, None),
        };

        MethodNode {
            name: reflection.name.clone(),
            aliases: reflection.namespace_aliases.clone(),
            r#final,
            r#abstract,
            r#static: reflection.is_static,
            visibility: reflection.visibility.as_str().to_string(),
            arguments: self.arguments.parse_all(&reflection.arguments),
            docblock: self.docblock.parse(reflection),
        }
    }

    pub fn parse_all(&self, methods: &[MethodReflection], owner: MethodOwner) -> Vec<MethodNode> {
        methods.iter().map(|m| self.parse(m, owner)).collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyParser {
    docblock: DocBlockParser,
}

impl PropertyParser {
    pub fn new(docblock: DocBlockParser) -> Self {
        Self { docblock }
    }

    pub fn parse(&self, reflection: &PropertyReflection) -> PropertyNode {
        PropertyNode {
            name: reflection.name.clone(),
            r#static: reflection.is_static,
            visibility: reflection.visibility.as_str().to_string(),
            docblock: self.docblock.parse(reflection),
        }
    }

    pub fn parse_all(&self, properties: &[PropertyReflection]) -> Vec<PropertyNode> {
        properties.iter().map(|p| self.parse(p)).collect()
    }
}
