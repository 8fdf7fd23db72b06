//! @acp:module "Reflection"
//! @acp:summary "Self-owned reflection view of a PHP source file"
//! @acp:domain parsing
//! @acp:layer model
//!
//! The element parsers only see these types. [`php`] builds them from a
//! tree-sitter syntax tree; nothing else in the crate touches the grammar
//! except the classmap scanner, which reuses [`php::parse_source`].

pub mod php;

use std::collections::BTreeMap;
use std::path::PathBuf;

pub use php::reflect_file;

/// Anything that may carry a raw `/** ... */` documentation comment.
pub trait Documented {
    fn doc_comment(&self) -> Option<&str>;
}

/// Member visibility as declared (`public` when omitted)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }

    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.to_ascii_lowercase().as_str() {
            "protected" => Visibility::Protected,
            "private" => Visibility::Private,
            _ => Visibility::Public,
        }
    }
}

/// @acp:summary "Everything declared in one file"
#[derive(Debug, Clone, Default)]
pub struct FileReflection {
    pub path: PathBuf,
    pub doc_comment: Option<String>,
    pub constants: Vec<ConstantReflection>,
    pub functions: Vec<FunctionReflection>,
    pub classes: Vec<ClassReflection>,
    pub interfaces: Vec<InterfaceReflection>,
}

#[derive(Debug, Clone, Default)]
pub struct ClassReflection {
    pub short_name: String,
    /// `None` for the global namespace
    pub namespace: Option<String>,
    pub is_final: bool,
    pub is_abstract: bool,
    /// Fully qualified parent name, no leading separator
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub constants: Vec<ConstantReflection>,
    pub properties: Vec<PropertyReflection>,
    pub methods: Vec<MethodReflection>,
    pub doc_comment: Option<String>,
    pub line: usize,
}

#[derive(Debug, Clone, Default)]
pub struct InterfaceReflection {
    pub short_name: String,
    pub namespace: Option<String>,
    pub extends: Vec<String>,
    pub constants: Vec<ConstantReflection>,
    pub properties: Vec<PropertyReflection>,
    pub methods: Vec<MethodReflection>,
    pub doc_comment: Option<String>,
    pub line: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MethodReflection {
    pub name: String,
    /// `use` imports in effect where the method is declared
    pub namespace_aliases: BTreeMap<String, String>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub arguments: Vec<ArgumentReflection>,
    pub doc_comment: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PropertyReflection {
    /// Without the leading `$`
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub doc_comment: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ConstantReflection {
    pub name: String,
    pub doc_comment: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FunctionReflection {
    pub short_name: String,
    pub namespace: Option<String>,
    pub namespace_aliases: BTreeMap<String, String>,
    pub arguments: Vec<ArgumentReflection>,
    pub doc_comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentReflection {
    /// Without the leading `$`
    pub name: String,
    pub type_hint: Option<String>,
    /// Default value expression as written
    pub default: Option<String>,
}

macro_rules! impl_documented {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Documented for $ty {
                fn doc_comment(&self) -> Option<&str> {
                    self.doc_comment.as_deref()
                }
            }
        )+
    };
}

impl_documented!(
    FileReflection,
    ClassReflection,
    InterfaceReflection,
    MethodReflection,
    PropertyReflection,
    ConstantReflection,
    FunctionReflection,
);
