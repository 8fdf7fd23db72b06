//! @acp:module "File Parser"
//! @acp:summary "Reflects one source file and aggregates its declarations into a file node"
//! @acp:domain parsing
//! @acp:layer service

use std::path::Path;

use tracing::debug;

use super::docblock::DocBlockParser;
use super::element::{ArgumentParser, ClassParser, ConstantParser, FunctionParser, InterfaceParser};
use crate::ast;
use crate::error::{ApidocError, Result};
use crate::ir::FileNode;

/// @acp:summary "Parser for a single file"
/// Failures are returned to the caller untouched; recovery is the caller's decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileParser {
    classes: ClassParser,
    interfaces: InterfaceParser,
    functions: FunctionParser,
    constants: ConstantParser,
    docblock: DocBlockParser,
}

impl FileParser {
    pub fn new() -> Self {
        let docblock = DocBlockParser::new();
        let arguments = ArgumentParser::new();
        let constants = ConstantParser::new(docblock);

        Self {
            classes: ClassParser::new(arguments, constants, docblock),
            interfaces: InterfaceParser::new(arguments, constants, docblock),
            functions: FunctionParser::new(arguments, docblock),
            constants,
            docblock,
        }
    }

    /// @acp:summary "Parse a file from disk"
    pub fn parse<P: AsRef<Path>>(&self, path: P) -> Result<FileNode> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| ApidocError::parse_failure(path, None, format!("unreadable: {}", e)))?;
        let source = String::from_utf8_lossy(&bytes);

        self.parse_source(path, &source)
    }

    /// @acp:summary "Parse already loaded source"
    pub fn parse_source(&self, path: &Path, source: &str) -> Result<FileNode> {
        let reflection = ast::reflect_file(path, source)?;
        debug!(
            "Parsed {}: {} classes, {} interfaces, {} functions",
            path.display(),
            reflection.classes.len(),
            reflection.interfaces.len(),
            reflection.functions.len()
        );

        Ok(FileNode {
            docblock: self.docblock.parse(&reflection),
            constants: self.constants.parse_all(&reflection.constants),
            functions: reflection.functions.iter().map(|f| self.functions.parse(f)).collect(),
            classes: reflection.classes.iter().map(|c| self.classes.parse(c)).collect(),
            interfaces: reflection.interfaces.iter().map(|i| self.interfaces.parse(i)).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_file_end_to_end() {
        let mut file = NamedTempFile::with_suffix(".php").unwrap();
        write!(
            file,
            r#"<?php
namespace Foo;

/** Does a thing. @deprecated 5.0 Use Bar instead. */
class Baz extends Qux
{{
    /**
     * Greets.
     *
     * @param   string  $name  Who to greet.
     *
     * @return  string
     */
    public function greet(int $name)
    {{
    }}
}}
"#
        )
        .unwrap();

        let node = FileParser::new().parse(file.path()).unwrap();
        assert_eq!(node.classes.len(), 1);

        let class = &node.classes[0];
        assert_eq!(class.name, "Baz");
        assert_eq!(class.namespace, "Foo");
        assert_eq!(class.extends, "Foo\\Qux");
        assert_eq!(class.docblock.summary, "Does a thing.");
        assert_eq!(class.docblock.tags[0].version.as_deref(), Some("5.0"));

        let greet = &class.methods[0];
        assert_eq!(greet.arguments[0].r#type, "int");
        assert_eq!(greet.docblock.tags[0].variable.as_deref(), Some("name"));
        assert_eq!(greet.docblock.tags[1].types, Some(vec!["string".to_string()]));
    }

    #[test]
    fn test_unicode_space_in_one_line_docblock() {
        let source = "<?php\n/** Loads.\u{a0}@deprecated 4.0 */\nfunction load() {}\n";
        let node = FileParser::new()
            .parse_source(Path::new("load.php"), source)
            .unwrap();
        assert_eq!(node.functions[0].docblock.summary, "Loads.");
        assert_eq!(node.functions[0].docblock.tags[0].name, "deprecated");
    }

    #[test]
    fn test_parse_failure_propagates() {
        let mut file = NamedTempFile::with_suffix(".php").unwrap();
        write!(file, "<?php\nfunction broken( {{\n").unwrap();

        let err = FileParser::new().parse(file.path()).unwrap_err();
        assert!(matches!(err, ApidocError::ParseFailure { .. }));
    }

    #[test]
    fn test_missing_file_is_parse_failure() {
        let err = FileParser::new().parse("/nonexistent/apidoc/file.php").unwrap_err();
        assert!(matches!(err, ApidocError::ParseFailure { line: None, .. }));
    }
}
