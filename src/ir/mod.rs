//! @acp:module "Intermediate Representation"
//! @acp:summary "Data structures of the parsed-data document (data.json)"
//! @acp:domain parsing
//! @acp:layer model
//!
//! These types serialize directly to/from the document written by
//! `parse-files` and read by `import-data`. Element names are short names;
//! the global namespace is spelled [`GLOBAL_NAMESPACE`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::Result;

/// Namespace value of elements declared outside any namespace
pub const GLOBAL_NAMESPACE: &str = "global";

/// @acp:summary "Complete parsed-data document"
/// @acp:lock normal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportData {
    /// Per-file documents keyed by path relative to the scanned checkout
    #[serde(default)]
    pub files: BTreeMap<String, FileNode>,
    /// Legacy class aliases from the classmap file
    #[serde(default)]
    pub aliases: Vec<AliasNode>,
}

impl ImportData {
    /// @acp:summary "Load a document from a JSON file"
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let data = serde_json::from_reader(reader)?;
        Ok(data)
    }

    /// @acp:summary "Write the document to a JSON file"
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassNode> {
        self.files.values().flat_map(|f| f.classes.iter())
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &InterfaceNode> {
        self.files.values().flat_map(|f| f.interfaces.iter())
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionNode> {
        self.files.values().flat_map(|f| f.functions.iter())
    }
}

/// @acp:summary "Everything declared in one file"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileNode {
    #[serde(default)]
    pub docblock: DocBlock,
    #[serde(default)]
    pub constants: Vec<ConstantNode>,
    #[serde(default)]
    pub functions: Vec<FunctionNode>,
    #[serde(default)]
    pub classes: Vec<ClassNode>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassNode {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub r#final: bool,
    #[serde(default)]
    pub r#abstract: bool,
    /// Qualified parent name, empty when the class has no parent
    #[serde(default)]
    pub extends: String,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub constants: Vec<ConstantNode>,
    #[serde(default)]
    pub properties: Vec<PropertyNode>,
    #[serde(default)]
    pub methods: Vec<MethodNode>,
    #[serde(default)]
    pub docblock: DocBlock,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceNode {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub constants: Vec<ConstantNode>,
    #[serde(default)]
    pub properties: Vec<PropertyNode>,
    #[serde(default)]
    pub methods: Vec<MethodNode>,
    #[serde(default)]
    pub docblock: DocBlock,
}

/// Class or interface method. `final`/`abstract` only exist for class methods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodNode {
    pub name: String,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#final: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#abstract: Option<bool>,
    #[serde(default)]
    pub r#static: bool,
    #[serde(default = "default_visibility")]
    pub visibility: String,
    #[serde(default)]
    pub arguments: Vec<ArgumentNode>,
    #[serde(default)]
    pub docblock: DocBlock,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyNode {
    pub name: String,
    #[serde(default)]
    pub r#static: bool,
    #[serde(default = "default_visibility")]
    pub visibility: String,
    #[serde(default)]
    pub docblock: DocBlock,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstantNode {
    pub name: String,
    #[serde(default)]
    pub docblock: DocBlock,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionNode {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    #[serde(default)]
    pub arguments: Vec<ArgumentNode>,
    #[serde(default)]
    pub docblock: DocBlock,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentNode {
    pub name: String,
    #[serde(default)]
    pub default: Option<String>,
    /// Declared type, empty when untyped
    #[serde(default)]
    pub r#type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasNode {
    pub alias: String,
    pub original: String,
    pub version: String,
}

/// @acp:summary "Interpreted documentation comment"
///
/// An element without a docblock carries the empty record, serialized as `{}`.
/// Documents written by older tooling spell the empty record `[]`; both are
/// accepted on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DocBlockRepr")]
pub struct DocBlock {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl DocBlock {
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty() && self.description.is_empty() && self.tags.is_empty()
    }

    pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Tag> + 'a {
        self.tags.iter().filter(move |t| t.name == name)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DocBlockRepr {
    Record {
        #[serde(default)]
        summary: Option<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        tags: Vec<Tag>,
    },
    Empty(Vec<serde_json::Value>),
}

impl From<DocBlockRepr> for DocBlock {
    fn from(repr: DocBlockRepr) -> Self {
        match repr {
            DocBlockRepr::Record {
                summary,
                description,
                tags,
            } => DocBlock {
                summary: summary.unwrap_or_default(),
                description: description.unwrap_or_default(),
                tags,
            },
            DocBlockRepr::Empty(_) => DocBlock::default(),
        }
    }
}

/// One `@tag` line. Sub-fields are only present for the tag kinds that carry them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Documented parameter, without the leading `$`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refers: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Tag {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }
}

fn default_visibility() -> String {
    "public".to_string()
}
