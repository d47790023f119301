//! Integration tests for loading schema declarations from disk

use editkit_schema::{Error, SchemaLoader, SchemaRegistry, SourceExpression};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn write_schema(dir: &TempDir, file: &str, yaml: &str) {
    fs::write(dir.path().join(file), yaml).expect("write schema file");
}

#[test]
fn test_load_chain_from_search_path() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_schema(
        &dir,
        "BaseEditor.yaml",
        "name: BaseEditor\nattributes:\n  - name\n  - name: description\n    from: related\n",
    );
    write_schema(
        &dir,
        "contacteditor.yml",
        "name: ContactEditor\nextends: BaseEditor\nattributes:\n  \
         - name: description\n    from: ~\n  - phone\n",
    );

    let loader = SchemaLoader::new(vec![dir.path().to_path_buf()]);
    let schema = loader.load("ContactEditor")?;

    assert_eq!(schema.names(), vec!["name", "description", "phone"]);
    assert_eq!(
        schema.get("description").unwrap().source(),
        &SourceExpression::Nothing
    );
    assert!(loader.registry().contains("BaseEditor"));
    assert!(loader.registry().contains("ContactEditor"));
    Ok(())
}

#[test]
fn test_cached_schema_is_shared() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_schema(&dir, "Minimal.yaml", "name: Minimal\nattributes: [name]\n");

    let loader = SchemaLoader::new(vec![dir.path().to_path_buf()]);
    let first = loader.load("Minimal")?;
    fs::remove_file(dir.path().join("Minimal.yaml"))?;
    let second = loader.load("Minimal")?;

    assert!(Arc::ptr_eq(&first, &second));
    Ok(())
}

#[test]
fn test_circular_inheritance_is_rejected() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_schema(&dir, "A.yaml", "name: A\nextends: B\n");
    write_schema(&dir, "B.yaml", "name: B\nextends: A\n");

    let loader = SchemaLoader::new(vec![dir.path().to_path_buf()]);
    let err = loader.load("A").unwrap_err();

    assert!(matches!(err, Error::Inheritance(_)));
    assert!(err.to_string().contains("Circular dependency"));
    Ok(())
}

#[test]
fn test_not_found() {
    let loader = SchemaLoader::new(vec![]);
    assert!(matches!(loader.load("Nope"), Err(Error::NotFound(_))));
}

#[test]
fn test_shared_registry() -> anyhow::Result<()> {
    let registry = Arc::new(SchemaRegistry::new());
    let loader = SchemaLoader::with_registry(Arc::clone(&registry), vec![]);
    loader.load_from_yaml("name: Shared\nattributes: [name]\n")?;

    assert_eq!(registry.get("Shared").unwrap().names(), vec!["name"]);
    Ok(())
}
