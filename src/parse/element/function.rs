//! @acp:module "Function Parser"
//! @acp:summary "Converts a reflected top-level function into a function node"
//! @acp:domain parsing
//! @acp:layer service

use super::argument::ArgumentParser;
use super::namespace_or_global;
use crate::ast::FunctionReflection;
use crate::ir::FunctionNode;
use crate::parse::docblock::DocBlockParser;

/// @acp:summary "Parser for a function element"
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionParser {
    arguments: ArgumentParser,
    docblock: DocBlockParser,
}

impl FunctionParser {
    pub fn new(arguments: ArgumentParser, docblock: DocBlockParser) -> Self {
        Self {
            arguments,
            docblock,
        }
    }

    pub fn parse(&self, reflection: &FunctionReflection) -> FunctionNode {
        FunctionNode {
            name: reflection.short_name.clone(),
            namespace: namespace_or_global(reflection.namespace.as_deref()),
            aliases: reflection.namespace_aliases.clone(),
            arguments: self.arguments.parse_all(&reflection.arguments),
            docblock: self.docblock.parse(reflection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ArgumentReflection;

    #[test]
    fn test_global_function() {
        let reflection = FunctionReflection {
            short_name: "jimport".into(),
            namespace: None,
            arguments: vec![
                ArgumentReflection {
                    name: "path".into(),
                    type_hint: None,
                    default: None,
                },
                ArgumentReflection {
                    name: "base".into(),
                    type_hint: Some("string".into()),
                    default: Some("null".into()),
                },
            ],
            doc_comment: Some("/**\n * Import a library.\n * @param  string  $path  Dot path.\n */".into()),
            ..Default::default()
        };

        let node = FunctionParser::default().parse(&reflection);
        assert_eq!(node.name, "jimport");
        assert_eq!(node.namespace, "global");
        let names: Vec<_> = node.arguments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["path", "base"]);
        assert_eq!(node.arguments[1].r#type, "string");
        assert_eq!(node.docblock.summary, "Import a library.");
    }
}
