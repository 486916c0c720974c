use querysh::manifest::FunctionKind;
use querysh::{
    parse_manifest, parse_manifest_file, Manifest, ManifestError, ManifestKind, ManifestParser,
    Operation,
};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_datastore_fixture_parses() {
    let manifest =
        parse_manifest_file(ManifestKind::DataStore, fixture("mongo_datastore.xml")).unwrap();
    assert_eq!(manifest.kind(), ManifestKind::DataStore);
    assert_eq!(manifest.name(), "Mongo");
    assert_eq!(manifest.version(), "3.0.0");

    let Manifest::DataStore(ds) = manifest else {
        panic!("expected a datastore manifest");
    };
    assert_eq!(ds.required_properties[0].name, "Hosts");
    assert_eq!(ds.optional_properties[0].name, "Port");
    assert_eq!(ds.behaviors, vec!["UPSERT_ON_INSERT"]);
}

#[test]
fn test_connector_fixture_parses() {
    let parser = ManifestParser::new(ManifestKind::Connector).unwrap();
    let manifest = parser.parse_file(fixture("mongo_connector.xml")).unwrap();

    let Manifest::Connector(connector) = manifest else {
        panic!("expected a connector manifest");
    };
    assert_eq!(connector.name, "MongoConnector");
    assert_eq!(connector.data_stores, vec!["Mongo"]);
    assert!(!connector.native);
    assert_eq!(connector.supported_operations.len(), 7);
    assert!(connector.supports(Operation::FilterPkEq));
    assert!(!connector.supports(Operation::SelectInnerJoin));
    assert_eq!(connector.functions[0].kind, FunctionKind::Aggregation);
    assert_eq!(
        connector.functions[0].description.as_deref(),
        Some("Counts the rows of a table")
    );
}

#[test]
fn test_parser_is_reusable() {
    let parser = ManifestParser::new(ManifestKind::DataStore).unwrap();
    for _ in 0..3 {
        let manifest = parser.parse_file(fixture("mongo_datastore.xml")).unwrap();
        assert_eq!(manifest.name(), "Mongo");
    }
}

#[test]
fn test_unknown_operation_is_rejected() {
    let err = parse_manifest_file(
        ManifestKind::Connector,
        fixture("connector_unknown_operation.xml"),
    )
    .unwrap_err();

    assert!(err.is_validation());
    let message = err.to_string();
    assert!(message.contains("SELECT_EVERYTHING"), "{message}");
    assert!(message.contains("/Connector/SupportedOperations/operation[2]"), "{message}");
}

#[test]
fn test_missing_required_element_is_rejected() {
    let err = parse_manifest_file(
        ManifestKind::DataStore,
        fixture("datastore_missing_version.xml"),
    )
    .unwrap_err();

    match err {
        ManifestError::Validation { schema, message } => {
            assert_eq!(schema, "querysh/manifest/DataStoreDefinition.xsd");
            assert!(message.contains("missing required element <Version>"), "{message}");
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn test_connector_against_datastore_schema() {
    let err =
        parse_manifest_file(ManifestKind::DataStore, fixture("mongo_connector.xml")).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_missing_file() {
    let err =
        parse_manifest_file(ManifestKind::Connector, fixture("no_such_manifest.xml")).unwrap_err();
    assert!(matches!(err, ManifestError::FileNotFound(_)));
}

#[test]
fn test_undeclared_attribute_is_rejected() {
    let doc = r#"<DataStore id="7"><Name>Mongo</Name><Version>1</Version></DataStore>"#;
    let err = parse_manifest(ManifestKind::DataStore, doc.as_bytes()).unwrap_err();
    assert!(err.is_validation());
}
