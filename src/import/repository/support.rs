//! @acp:module "Reconciliation Support"
//! @acp:summary "Shared sub-record synchronisation for deprecations and arguments"
//! @acp:domain import
//! @acp:layer data

use std::collections::HashSet;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::db::{Argumented, Deprecatable};
use crate::error::{ApidocError, Result};
use crate::ir::{ArgumentNode, DocBlock, GLOBAL_NAMESPACE};

/// Namespace as stored: the global sentinel (or nothing at all) becomes NULL.
pub fn stored_namespace(namespace: &str) -> Option<&str> {
    match namespace {
        "" | GLOBAL_NAMESPACE => None,
        ns => Some(ns.trim_matches('\\')),
    }
}

/// `Namespace\Short`, or just `Short` in the global namespace.
pub fn qualified_name(namespace: Option<&str>, short_name: &str) -> String {
    match namespace {
        Some(ns) => format!("{}\\{}", ns, short_name),
        None => short_name.to_string(),
    }
}

/// Fail with `OwnerAssociation` unless `owner_id` exists in `table`.
pub(crate) fn ensure_owner(
    conn: &Connection,
    table: &'static str,
    owner_id: i64,
    kind: &'static str,
    name: &str,
) -> Result<()> {
    let found: Option<i64> = conn
        .query_row(
            &format!("SELECT id FROM {} WHERE id = ?1", table),
            [owner_id],
            |row| row.get(0),
        )
        .optional()?;

    match found {
        Some(_) => Ok(()),
        None => Err(ApidocError::OwnerAssociation {
            kind,
            name: name.to_string(),
            owner: table,
            owner_id,
        }),
    }
}

/// Return types and description from the `@return` tag, or empty values.
pub(crate) fn return_info(docblock: &DocBlock) -> (Vec<String>, String) {
    docblock
        .tags_named("return")
        .last()
        .map(|tag| (tag.types.clone().unwrap_or_default(), tag.description.clone()))
        .unwrap_or_default()
}

pub(crate) fn to_json(values: &[String]) -> Result<String> {
    Ok(serde_json::to_string(values)?)
}

/// Keep the single deprecation row of `owner` in step with its docblock.
///
/// Several `@deprecated` tags collapse onto the one row, the last one wins.
/// An owner whose docblock no longer carries the tag loses its row.
pub(crate) fn sync_deprecation(conn: &Connection, owner: Deprecatable, docblock: &DocBlock) -> Result<()> {
    let Some(tag) = docblock.tags_named("deprecated").last() else {
        conn.execute(
            "DELETE FROM deprecations WHERE deprecatable_type = ?1 AND deprecatable_id = ?2",
            params![owner.kind(), owner.id()],
        )?;
        return Ok(());
    };

    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM deprecations WHERE deprecatable_type = ?1 AND deprecatable_id = ?2",
            params![owner.kind(), owner.id()],
            |row| row.get(0),
        )
        .optional()?;

    match existing {
        Some(id) => {
            conn.execute(
                "UPDATE deprecations SET description = ?1, removal_version = ?2 WHERE id = ?3",
                params![tag.description, tag.version, id],
            )?;
        }
        None => {
            conn.execute(
                "INSERT INTO deprecations (description, removal_version, deprecatable_id, deprecatable_type)
                 VALUES (?1, ?2, ?3, ?4)",
                params![tag.description, tag.version, owner.id(), owner.kind()],
            )?;
        }
    }
    Ok(())
}

/// Types and description of an argument, enriched from its `@param` tag.
///
/// Tag types come first; the declared type is appended when missing. The
/// first tag documenting the argument wins. Without a tag both are empty.
pub(crate) fn argument_docs(argument: &ArgumentNode, docblock: &DocBlock) -> (Vec<String>, String) {
    let declared = (!argument.r#type.is_empty()).then(|| argument.r#type.clone());

    for tag in docblock.tags_named("param") {
        if tag.variable.as_deref() != Some(argument.name.as_str()) {
            continue;
        }

        let mut types = tag.types.clone().unwrap_or_default();
        if let Some(declared) = &declared {
            if !types.contains(declared) {
                types.push(declared.clone());
            }
        }
        return (types, tag.description.clone());
    }

    (Vec::new(), String::new())
}

/// Upsert one argument row per declared argument and drop rows for
/// arguments that are no longer declared.
pub(crate) fn sync_arguments(
    conn: &Connection,
    owner: Argumented,
    arguments: &[ArgumentNode],
    docblock: &DocBlock,
) -> Result<()> {
    for argument in arguments {
        let (types, description) = argument_docs(argument, docblock);
        let types = to_json(&types)?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM arguments
                 WHERE argumented_type = ?1 AND argumented_id = ?2 AND name = ?3",
                params![owner.kind(), owner.id(), argument.name],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(id) => {
                conn.execute(
                    "UPDATE arguments SET description = ?1, types = ?2, default_value = ?3 WHERE id = ?4",
                    params![description, types, argument.default, id],
                )?;
            }
            None => {
                conn.execute(
                    "INSERT INTO arguments (name, description, types, default_value, argumented_id, argumented_type)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![argument.name, description, types, argument.default, owner.id(), owner.kind()],
                )?;
            }
        }
    }

    let declared: HashSet<&str> = arguments.iter().map(|a| a.name.as_str()).collect();
    let mut stmt = conn.prepare(
        "SELECT id, name FROM arguments WHERE argumented_type = ?1 AND argumented_id = ?2",
    )?;
    let stale: Vec<(i64, String)> = stmt
        .query_map(params![owner.kind(), owner.id()], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?
        .into_iter()
        .filter(|(_, name)| !declared.contains(name.as_str()))
        .collect();

    for (id, name) in stale {
        debug!("Removing stale argument {} of {} #{}", name, owner.kind(), owner.id());
        conn.execute("DELETE FROM arguments WHERE id = ?1", [id])?;
    }
    Ok(())
}
