mod error;
mod parser;
mod schema;
mod types;
mod xml;

pub use error::ManifestError;
pub use parser::{
    parse_manifest, parse_manifest_file, ManifestParser, CONNECTOR_SCHEMA_PATH,
    DATASTORE_SCHEMA_PATH,
};
pub use schema::Schema;
pub use types::{
    ConnectorManifest, DataStoreManifest, FunctionDef, FunctionKind, Manifest, ManifestKind,
    Operation, PropertyDef,
};
