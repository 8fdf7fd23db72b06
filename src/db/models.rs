//! @acp:module "Models"
//! @acp:summary "Row types of the documentation store and polymorphic owner references"
//! @acp:domain storage
//! @acp:layer model
//!
//! JSON list columns (`types`, `return_types`) decode leniently: a malformed
//! value reads back as an empty list.

use rusqlite::Row;
use tracing::warn;

/// Owner of an argument row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Argumented {
    ClassMethod(i64),
    InterfaceMethod(i64),
    Function(i64),
}

impl Argumented {
    pub fn kind(&self) -> &'static str {
        match self {
            Argumented::ClassMethod(_) => "class_method",
            Argumented::InterfaceMethod(_) => "interface_method",
            Argumented::Function(_) => "function",
        }
    }

    pub fn id(&self) -> i64 {
        match *self {
            Argumented::ClassMethod(id) | Argumented::InterfaceMethod(id) | Argumented::Function(id) => id,
        }
    }

    pub fn from_parts(kind: &str, id: i64) -> Option<Self> {
        match kind {
            "class_method" => Some(Argumented::ClassMethod(id)),
            "interface_method" => Some(Argumented::InterfaceMethod(id)),
            "function" => Some(Argumented::Function(id)),
            _ => None,
        }
    }
}

/// Owner of a deprecation row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Deprecatable {
    Class(i64),
    Interface(i64),
    ClassMethod(i64),
    InterfaceMethod(i64),
    ClassProperty(i64),
    Function(i64),
}

impl Deprecatable {
    pub fn kind(&self) -> &'static str {
        match self {
            Deprecatable::Class(_) => "class",
            Deprecatable::Interface(_) => "interface",
            Deprecatable::ClassMethod(_) => "class_method",
            Deprecatable::InterfaceMethod(_) => "interface_method",
            Deprecatable::ClassProperty(_) => "class_property",
            Deprecatable::Function(_) => "function",
        }
    }

    pub fn id(&self) -> i64 {
        match *self {
            Deprecatable::Class(id)
            | Deprecatable::Interface(id)
            | Deprecatable::ClassMethod(id)
            | Deprecatable::InterfaceMethod(id)
            | Deprecatable::ClassProperty(id)
            | Deprecatable::Function(id) => id,
        }
    }

    pub fn from_parts(kind: &str, id: i64) -> Option<Self> {
        match kind {
            "class" => Some(Deprecatable::Class(id)),
            "interface" => Some(Deprecatable::Interface(id)),
            "class_method" => Some(Deprecatable::ClassMethod(id)),
            "interface_method" => Some(Deprecatable::InterfaceMethod(id)),
            "class_property" => Some(Deprecatable::ClassProperty(id)),
            "function" => Some(Deprecatable::Function(id)),
            _ => None,
        }
    }
}

impl From<Argumented> for Deprecatable {
    fn from(owner: Argumented) -> Self {
        match owner {
            Argumented::ClassMethod(id) => Deprecatable::ClassMethod(id),
            Argumented::InterfaceMethod(id) => Deprecatable::InterfaceMethod(id),
            Argumented::Function(id) => Deprecatable::Function(id),
        }
    }
}

/// Decode a JSON list column. A corrupt value reads as empty and is logged.
fn json_list(raw: String) -> Vec<String> {
    match serde_json::from_str(&raw) {
        Ok(list) => list,
        Err(e) => {
            warn!("Ignoring malformed type list {:?}: {}", raw, e);
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Software {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl Software {
    pub const COLUMNS: &'static str = "id, name, slug";

    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            slug: row.get(2)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub id: i64,
    pub software_id: i64,
    pub version: String,
    pub display_name: String,
}

impl Version {
    pub const COLUMNS: &'static str = "id, software_id, version, display_name";

    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            software_id: row.get(1)?,
            version: row.get(2)?,
            display_name: row.get(3)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRecord {
    pub id: i64,
    /// Qualified name
    pub name: String,
    /// `None` for the global namespace
    pub namespace: Option<String>,
    pub shortname: String,
    pub summary: String,
    pub description: String,
    pub r#final: bool,
    pub r#abstract: bool,
    pub parent_id: Option<i64>,
    pub version_id: i64,
}

impl ClassRecord {
    pub const COLUMNS: &'static str =
        "id, name, namespace, shortname, summary, description, final, abstract, parent_id, version_id";

    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            namespace: row.get(2)?,
            shortname: row.get(3)?,
            summary: row.get(4)?,
            description: row.get(5)?,
            r#final: row.get(6)?,
            r#abstract: row.get(7)?,
            parent_id: row.get(8)?,
            version_id: row.get(9)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceRecord {
    pub id: i64,
    pub name: String,
    pub namespace: Option<String>,
    pub shortname: String,
    pub summary: String,
    pub description: String,
    pub version_id: i64,
}

impl InterfaceRecord {
    pub const COLUMNS: &'static str =
        "id, name, namespace, shortname, summary, description, version_id";

    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            namespace: row.get(2)?,
            shortname: row.get(3)?,
            summary: row.get(4)?,
            description: row.get(5)?,
            version_id: row.get(6)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMethodRecord {
    pub id: i64,
    pub name: String,
    pub summary: String,
    pub description: String,
    pub r#final: bool,
    pub r#abstract: bool,
    pub r#static: bool,
    pub visibility: String,
    pub return_types: Vec<String>,
    pub return_description: String,
    pub parent_id: i64,
}

impl ClassMethodRecord {
    pub const COLUMNS: &'static str = "id, name, summary, description, final, abstract, static, \
        visibility, return_types, return_description, parent_id";

    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            summary: row.get(2)?,
            description: row.get(3)?,
            r#final: row.get(4)?,
            r#abstract: row.get(5)?,
            r#static: row.get(6)?,
            visibility: row.get(7)?,
            return_types: json_list(row.get(8)?),
            return_description: row.get(9)?,
            parent_id: row.get(10)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceMethodRecord {
    pub id: i64,
    pub name: String,
    pub summary: String,
    pub description: String,
    pub r#static: bool,
    pub visibility: String,
    pub return_types: Vec<String>,
    pub return_description: String,
    pub parent_id: i64,
}

impl InterfaceMethodRecord {
    pub const COLUMNS: &'static str = "id, name, summary, description, static, visibility, \
        return_types, return_description, parent_id";

    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            summary: row.get(2)?,
            description: row.get(3)?,
            r#static: row.get(4)?,
            visibility: row.get(5)?,
            return_types: json_list(row.get(6)?),
            return_description: row.get(7)?,
            parent_id: row.get(8)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassPropertyRecord {
    pub id: i64,
    pub name: String,
    pub summary: String,
    pub description: String,
    pub r#static: bool,
    pub visibility: String,
    pub parent_id: i64,
}

impl ClassPropertyRecord {
    pub const COLUMNS: &'static str =
        "id, name, summary, description, static, visibility, parent_id";

    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            summary: row.get(2)?,
            description: row.get(3)?,
            r#static: row.get(4)?,
            visibility: row.get(5)?,
            parent_id: row.get(6)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRecord {
    pub id: i64,
    pub name: String,
    pub namespace: Option<String>,
    pub shortname: String,
    pub summary: String,
    pub description: String,
    pub return_types: Vec<String>,
    pub return_description: String,
    pub version_id: i64,
}

impl FunctionRecord {
    pub const COLUMNS: &'static str = "id, name, namespace, shortname, summary, description, \
        return_types, return_description, version_id";

    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            namespace: row.get(2)?,
            shortname: row.get(3)?,
            summary: row.get(4)?,
            description: row.get(5)?,
            return_types: json_list(row.get(6)?),
            return_description: row.get(7)?,
            version_id: row.get(8)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentRecord {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub types: Vec<String>,
    pub default_value: Option<String>,
    pub argumented_id: i64,
    pub argumented_type: String,
}

impl ArgumentRecord {
    pub const COLUMNS: &'static str =
        "id, name, description, types, default_value, argumented_id, argumented_type";

    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            types: json_list(row.get(3)?),
            default_value: row.get(4)?,
            argumented_id: row.get(5)?,
            argumented_type: row.get(6)?,
        })
    }

    pub fn owner(&self) -> Option<Argumented> {
        Argumented::from_parts(&self.argumented_type, self.argumented_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationRecord {
    pub id: i64,
    pub description: String,
    pub removal_version: Option<String>,
    pub deprecatable_id: i64,
    pub deprecatable_type: String,
}

impl DeprecationRecord {
    pub const COLUMNS: &'static str =
        "id, description, removal_version, deprecatable_id, deprecatable_type";

    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            description: row.get(1)?,
            removal_version: row.get(2)?,
            deprecatable_id: row.get(3)?,
            deprecatable_type: row.get(4)?,
        })
    }

    pub fn owner(&self) -> Option<Deprecatable> {
        Deprecatable::from_parts(&self.deprecatable_type, self.deprecatable_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassAliasRecord {
    pub id: i64,
    pub old_class: String,
    pub new_class: String,
    pub deprecation_version: String,
    pub version_id: i64,
}

impl ClassAliasRecord {
    pub const COLUMNS: &'static str = "id, old_class, new_class, deprecation_version, version_id";

    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            old_class: row.get(1)?,
            new_class: row.get(2)?,
            deprecation_version: row.get(3)?,
            version_id: row.get(4)?,
        })
    }
}
