use std::io::Write;

use ruletree::{decode, CatalogConfig, InputKind, RegistryError, TypeRegistry};
use tempfile::NamedTempFile;

const CATALOG: &str = r#"{
  "ruleTypes": [
    {
      "label": "Programme",
      "value": "programme",
      "comparators": [
        { "label": "Is", "value": "is" },
        { "label": "Is Not", "value": "is_not" }
      ],
      "inputField": {
        "type": "select",
        "options": [
          { "label": "Science", "value": "science" },
          { "label": "Arts", "value": "arts" }
        ]
      }
    },
    {
      "label": "Tuition",
      "value": "tuition",
      "comparators": [{ "label": "Less Than", "value": "less_than" }],
      "inputField": {
        "type": "currency",
        "currency": "€",
        "validation": { "pattern": "^\\d+(\\.\\d{2})?$", "maxLength": 9 }
      }
    }
  ]
}"#;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn load_catalog_from_file() {
    let file = write_temp(CATALOG);
    let registry = TypeRegistry::new();
    registry
        .load_from_source(file.path().to_str().unwrap())
        .unwrap();

    let catalog = registry.snapshot();
    assert_eq!(catalog.len(), 2);
    let tuition = catalog.get("tuition").unwrap();
    let field = tuition.input_field.as_ref().unwrap();
    assert_eq!(field.kind, InputKind::Currency);
    assert_eq!(field.currency_symbol(), Some("€"));
    assert_eq!(field.validation.as_ref().unwrap().max_length, Some(9));

    let tree = decode(
        r#"<group logic="AND"><tuition comparator="less_than">1200.00</tuition></group>"#,
        &catalog,
    )
    .unwrap();
    assert_eq!(tree.children()[0].as_rule().unwrap().rule_type.value, "tuition");
}

#[test]
fn missing_file_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let registry = TypeRegistry::new();
    let before = registry.snapshot();

    let err = registry
        .load_from_source(path.to_str().unwrap())
        .unwrap_err();
    assert!(matches!(err, RegistryError::SourceUnavailable { .. }));
    assert_eq!(*registry.snapshot(), *before);
}

#[test]
fn invalid_file_keeps_catalog() {
    let registry = TypeRegistry::new();
    let before = registry.snapshot();

    for contents in [
        "{ not json",
        r#"{ "ruleTypes": [] }"#,
        r#"{ "ruleTypes": [{ "label": "X", "value": "x", "comparators": [] }] }"#,
        r#"{ "ruleTypes": [{ "label": "X", "value": "group", "comparators": [{ "label": "a", "value": "a" }] }] }"#,
    ] {
        let file = write_temp(contents);
        let err = registry
            .load_from_source(file.path().to_str().unwrap())
            .unwrap_err();
        assert!(
            matches!(err, RegistryError::InvalidConfig(_)),
            "{contents}: {err}"
        );
        assert_eq!(*registry.snapshot(), *before);
    }
}

#[test]
fn config_document_roundtrips_through_serde() {
    let config = CatalogConfig::from_json(CATALOG).unwrap();
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains(r#""inputField""#));
    assert!(json.contains(r#""maxLength":9"#));
    assert_eq!(CatalogConfig::from_json(&json).unwrap(), config);

    let registry = TypeRegistry::new();
    registry.load_from_config(config).unwrap();
    assert!(registry.snapshot().contains("programme"));
}

#[cfg(not(feature = "http-source"))]
#[test]
fn http_source_needs_feature() {
    let registry = TypeRegistry::new();
    let err = registry
        .load_from_source("http://localhost:1/catalog.json")
        .unwrap_err();
    assert!(err.to_string().contains("http-source"));
}
