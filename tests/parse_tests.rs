//! Parse phase tests
//!
//! Build a small release checkout on disk, run the release parser over it and
//! inspect the resulting IR document.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use apidoc::config::{BranchConfig, Config, ErrorHandling, Strictness};
use apidoc::ir::ImportData;
use apidoc::{ApidocError, Parser};

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn checkout() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(
        root,
        "libraries/src/Table/Table.php",
        r#"<?php
/**
 * @package     Joomla.Platform
 */

namespace Joomla\CMS\Table;

use Joomla\CMS\Object\CMSObject as BaseObject;

/**
 * Abstract Table class.
 *
 * Parent class to all tables.
 *
 * @since  1.7.0
 */
abstract class Table extends BaseObject implements TableInterface
{
    /**
     * Name of the database table to model.
     *
     * @var    string
     */
    protected $_tbl = '';

    /**
     * Method to load a row from the database.
     *
     * @param   mixed    $keys   An optional primary key value to load the row by.
     * @param   boolean  $reset  True to reset the default values before loading.
     *
     * @return  boolean  True if successful.
     *
     * @deprecated  5.0  Use find() instead.
     */
    public function load($keys = null, bool $reset = true)
    {
    }
}
"#,
    );
    write(
        root,
        "libraries/src/Table/TableInterface.php",
        r#"<?php
namespace Joomla\CMS\Table;

interface TableInterface extends \Countable
{
    public function check();
}
"#,
    );
    write(root, "libraries/src/.phpstorm.meta.php", "<?php\nclass Hidden {}\n");
    write(root, "libraries/src/README.md", "# not php");
    write(
        root,
        "libraries/import.legacy.php",
        "<?php\n/** Import a library. */\nfunction jimport($path)\n{\n}\ndefine('JPATH_PLATFORM', __DIR__);\n",
    );
    write(
        root,
        "libraries/classmap.php",
        r#"<?php
defined('JPATH_PLATFORM') or die;

JLoader::registerAlias('JTable', '\\Joomla\\CMS\\Table\\Table', '5.0');
JLoader::registerAlias('JTableInterface', '\\Joomla\\CMS\\Table\\TableInterface');
JLoader::registerAlias('JBroken');
"#,
    );
    dir
}

fn config() -> Config {
    let mut config = Config::default();
    config.branches.insert(
        "4".into(),
        BranchConfig {
            paths: vec!["libraries/src".into()],
            files: vec!["libraries/import.legacy.php".into()],
            classmap: Some("libraries/classmap.php".into()),
        },
    );
    config
}

// =============================================================================
// Release parsing
// =============================================================================

mod release {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_release_document() {
        let dir = checkout();
        let config = config();
        let report = Parser::new(&config).unwrap().parse_release(dir.path(), "4.0.0").unwrap();
        let data = report.data;

        let keys: Vec<_> = data.files.keys().cloned().collect();
        assert_eq!(
            keys,
            vec![
                "libraries/import.legacy.php",
                "libraries/src/Table/Table.php",
                "libraries/src/Table/TableInterface.php",
            ]
        );
        assert!(report.skipped.is_empty());
        assert!(report.missing_paths.is_empty());

        let table = data.classes().next().unwrap();
        assert_eq!(table.name, "Table");
        assert_eq!(table.namespace, "Joomla\\CMS\\Table");
        assert!(table.r#abstract);
        assert_eq!(table.extends, "Joomla\\CMS\\Object\\CMSObject");
        assert_eq!(table.implements, vec!["Joomla\\CMS\\Table\\TableInterface".to_string()]);
        assert_eq!(table.docblock.summary, "Abstract Table class.");
        assert_eq!(table.docblock.description, "Parent class to all tables.");
        assert_eq!(table.properties[0].name, "_tbl");
        assert_eq!(table.properties[0].visibility, "protected");

        let load = &table.methods[0];
        assert_eq!(load.name, "load");
        assert_eq!(load.arguments.len(), 2);
        assert_eq!(load.arguments[1].r#type, "bool");
        assert_eq!(load.arguments[1].default.as_deref(), Some("true"));
        let deprecated = load.docblock.tags_named("deprecated").next().unwrap();
        assert_eq!(deprecated.version.as_deref(), Some("5.0"));
        assert_eq!(deprecated.description, "Use find() instead.");

        let interface = data.interfaces().next().unwrap();
        assert_eq!(interface.extends, vec!["Countable".to_string()]);
        assert_eq!(interface.methods[0].r#final, None);

        let legacy = &data.files["libraries/import.legacy.php"];
        assert_eq!(legacy.functions[0].name, "jimport");
        assert_eq!(legacy.functions[0].namespace, "global");
        assert_eq!(legacy.constants[0].name, "JPATH_PLATFORM");

        assert_eq!(data.aliases.len(), 2);
        assert_eq!(data.aliases[0].original, "Joomla\\CMS\\Table\\Table");
        assert_eq!(data.aliases[1].version, "4.0");
    }

    #[test]
    fn test_document_survives_data_file() {
        let dir = checkout();
        let config = config();
        let report = Parser::new(&config).unwrap().parse_release(dir.path(), "4.0.0").unwrap();

        let out = TempDir::new().unwrap();
        let path = out.path().join("data.json");
        report.data.write_json(&path).unwrap();

        assert_eq!(ImportData::from_json(&path).unwrap(), report.data);
    }

    #[test]
    fn test_unconfigured_branch() {
        let dir = checkout();
        let err = Parser::new(&config()).unwrap().parse_release(dir.path(), "3.9.8").unwrap_err();
        assert_eq!(
            err.to_string(),
            "There is no configuration for version '3.9.8' (branch '3')"
        );
    }
}

// =============================================================================
// Error policy
// =============================================================================

mod error_policy {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strict_reports_file_and_line() {
        let dir = checkout();
        write(dir.path(), "libraries/src/Broken.php", "<?php\n\nclass Broken {\n    public function (\n}\n");

        let err = Parser::new(&config()).unwrap().parse_release(dir.path(), "4.0.0").unwrap_err();
        match err {
            ApidocError::ParseFailure { path, line, .. } => {
                assert!(path.ends_with("Broken.php"));
                assert!(line.is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_permissive_keeps_going() {
        let dir = checkout();
        write(dir.path(), "libraries/src/Broken.php", "<?php\nclass {\n");

        let mut config = config();
        config.error_handling = ErrorHandling {
            strictness: Strictness::Permissive,
            max_errors: 10,
        };
        let report = Parser::new(&config).unwrap().parse_release(dir.path(), "4.0.0").unwrap();

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, "libraries/src/Broken.php");
        assert_eq!(report.data.files.len(), 3);
    }
}
