//! @acp:module "Constant Parser"
//! @acp:summary "Converts a reflected constant into a constant node"
//! @acp:domain parsing
//! @acp:layer service

use crate::ast::ConstantReflection;
use crate::ir::ConstantNode;
use crate::parse::docblock::DocBlockParser;

/// @acp:summary "Parser for a constant element"
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantParser {
    docblock: DocBlockParser,
}

impl ConstantParser {
    pub fn new(docblock: DocBlockParser) -> Self {
        Self { docblock }
    }

    pub fn parse(&self, reflection: &ConstantReflection) -> ConstantNode {
        ConstantNode {
            name: reflection.name.clone(),
            docblock: self.docblock.parse(reflection),
        }
    }

    pub fn parse_all(&self, constants: &[ConstantReflection]) -> Vec<ConstantNode> {
        constants.iter().map(|c| self.parse(c)).collect()
    }
}
