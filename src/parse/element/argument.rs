//! @acp:module "Argument Parser"
//! @acp:summary "Converts a reflected parameter into an argument node"
//! @acp:domain parsing
//! @acp:layer service

use crate::ast::ArgumentReflection;
use crate::ir::ArgumentNode;

/// @acp:summary "Parser for an argument element"
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgumentParser;

impl ArgumentParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, reflection: &ArgumentReflection) -> ArgumentNode {
        ArgumentNode {
            name: reflection.name.clone(),
            default: reflection.default.clone(),
            r#type: reflection.type_hint.clone().unwrap_or_default(),
        }
    }

    /// Arguments in declaration order
    pub fn parse_all(&self, arguments: &[ArgumentReflection]) -> Vec<ArgumentNode> {
        arguments.iter().map(|a| self.parse(a)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untyped_argument_has_empty_type() {
        let node = ArgumentParser::new().parse(&ArgumentReflection {
            name: "options".into(),
            type_hint: None,
            default: Some("array()".into()),
        });
        assert_eq!(node.r#type, "");
        assert_eq!(node.default.as_deref(), Some("array()"));
    }
}
