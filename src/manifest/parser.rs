use super::error::ManifestError;
use super::schema::Schema;
use super::types::{
    ConnectorManifest, DataStoreManifest, FunctionDef, FunctionKind, Manifest, ManifestKind,
    Operation, PropertyDef,
};
use super::xml::{parse_document, Element};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;
use tracing::debug;

pub const DATASTORE_SCHEMA_PATH: &str = "querysh/manifest/DataStoreDefinition.xsd";
pub const CONNECTOR_SCHEMA_PATH: &str = "querysh/manifest/ConnectorDefinition.xsd";

const DATASTORE_SCHEMA: &str = include_str!("schemas/DataStoreDefinition.xsd");
const CONNECTOR_SCHEMA: &str = include_str!("schemas/ConnectorDefinition.xsd");

impl ManifestKind {
    pub fn schema_path(&self) -> &'static str {
        match self {
            ManifestKind::DataStore => DATASTORE_SCHEMA_PATH,
            ManifestKind::Connector => CONNECTOR_SCHEMA_PATH,
        }
    }

    fn schema_source(&self) -> &'static str {
        match self {
            ManifestKind::DataStore => DATASTORE_SCHEMA,
            ManifestKind::Connector => CONNECTOR_SCHEMA,
        }
    }
}

/// Validates manifest documents of one kind against its embedded schema and binds
/// them to typed values. The schema is compiled once per parser.
#[derive(Debug, Clone)]
pub struct ManifestParser {
    kind: ManifestKind,
    schema: Schema,
}

impl ManifestParser {
    pub fn new(kind: ManifestKind) -> Result<Self, ManifestError> {
        let schema = Schema::compile(kind.schema_path(), kind.schema_source())?;
        Ok(Self { kind, schema })
    }

    pub fn kind(&self) -> ManifestKind {
        self.kind
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn parse(&self, mut source: impl Read) -> Result<Manifest, ManifestError> {
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes)?;
        let text = String::from_utf8(bytes)
            .map_err(|e| self.schema.violation(format!("document is not valid UTF-8: {}", e)))?;
        self.parse_str(&text)
    }

    pub fn parse_str(&self, text: &str) -> Result<Manifest, ManifestError> {
        let document = parse_document(text)
            .map_err(|msg| self.schema.violation(format!("malformed document: {}", msg)))?;
        self.schema.validate(&document)?;

        let manifest = match self.kind {
            ManifestKind::DataStore => Manifest::DataStore(self.bind_datastore(&document)?),
            ManifestKind::Connector => Manifest::Connector(self.bind_connector(&document)?),
        };
        debug!(
            kind = %self.kind,
            name = %manifest.name(),
            version = %manifest.version(),
            "Manifest parsed"
        );
        Ok(manifest)
    }

    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Manifest, ManifestError> {
        let file = open_manifest(path.as_ref())?;
        self.parse(BufReader::new(file))
    }

    fn bind_datastore(&self, root: &Element) -> Result<DataStoreManifest, ManifestError> {
        Ok(DataStoreManifest {
            name: self.required_token(root, "Name")?,
            version: self.required_token(root, "Version")?,
            required_properties: self.properties(root, "RequiredProperties")?,
            optional_properties: self.properties(root, "OptionalProperties")?,
            behaviors: list_text(root, "Behaviors", "Behavior"),
            functions: self.functions(root)?,
        })
    }

    fn bind_connector(&self, root: &Element) -> Result<ConnectorManifest, ManifestError> {
        let supported_operations = root
            .child("SupportedOperations")
            .into_iter()
            .flat_map(|ops| ops.children_named("operation"))
            .map(|op| collapse_whitespace(&op.text).parse::<Operation>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|msg| self.schema.violation(msg))?;

        let native = match optional_token(root, "Native").as_deref() {
            None | Some("false") | Some("0") => false,
            Some("true") | Some("1") => true,
            Some(other) => {
                return Err(self
                    .schema
                    .violation(format!("invalid value '{}' for Native", other)))
            }
        };

        Ok(ConnectorManifest {
            name: self.required_token(root, "ConnectorName")?,
            data_stores: list_text(root, "DataStores", "DataStoreName"),
            version: self.required_token(root, "Version")?,
            native,
            required_properties: self.properties(root, "RequiredProperties")?,
            optional_properties: self.properties(root, "OptionalProperties")?,
            supported_operations,
            functions: self.functions(root)?,
        })
    }

    fn properties(&self, root: &Element, list: &str) -> Result<Vec<PropertyDef>, ManifestError> {
        root.child(list)
            .into_iter()
            .flat_map(|props| props.children_named("Property"))
            .map(|prop| {
                Ok(PropertyDef {
                    name: self.required_token(prop, "PropertyName")?,
                    description: self.required_text(prop, "Description")?,
                })
            })
            .collect()
    }

    fn functions(&self, root: &Element) -> Result<Vec<FunctionDef>, ManifestError> {
        root.child("Functions")
            .into_iter()
            .flat_map(|funcs| funcs.children_named("Function"))
            .map(|func| {
                let kind: FunctionKind = self
                    .required_token(func, "FunctionType")?
                    .parse()
                    .map_err(|msg: String| self.schema.violation(msg))?;
                Ok(FunctionDef {
                    name: self.required_token(func, "FunctionName")?,
                    signature: self.required_text(func, "Signature")?,
                    kind,
                    description: optional_text(func, "Description"),
                })
            })
            .collect()
    }

    fn required_text(&self, parent: &Element, name: &str) -> Result<String, ManifestError> {
        optional_text(parent, name).ok_or_else(|| self.missing(parent, name))
    }

    fn required_token(&self, parent: &Element, name: &str) -> Result<String, ManifestError> {
        optional_token(parent, name).ok_or_else(|| self.missing(parent, name))
    }

    fn missing(&self, parent: &Element, name: &str) -> ManifestError {
        self.schema
            .violation(format!("missing required element <{}> in <{}>", name, parent.name))
    }
}

fn optional_text(parent: &Element, name: &str) -> Option<String> {
    parent.child(name).map(|c| c.text.trim().to_string())
}

/// `xs:token` values bind the same way the validator sees them.
fn optional_token(parent: &Element, name: &str) -> Option<String> {
    parent.child(name).map(|c| collapse_whitespace(&c.text))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn list_text(parent: &Element, list: &str, item: &str) -> Vec<String> {
    parent
        .child(list)
        .into_iter()
        .flat_map(|l| l.children_named(item))
        .map(|i| collapse_whitespace(&i.text))
        .collect()
}

fn open_manifest(path: &Path) -> Result<File, ManifestError> {
    File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ManifestError::FileNotFound(path.to_path_buf()),
        _ => ManifestError::Io(e),
    })
}

/// Compiles the schema for `kind` and parses one document from `source`.
pub fn parse_manifest(kind: ManifestKind, source: impl Read) -> Result<Manifest, ManifestError> {
    ManifestParser::new(kind)?.parse(source)
}

/// Opens `path` and parses it as a manifest of `kind`. A missing file is reported as
/// [`ManifestError::FileNotFound`] before any validation happens.
pub fn parse_manifest_file(
    kind: ManifestKind,
    path: impl AsRef<Path>,
) -> Result<Manifest, ManifestError> {
    let file = open_manifest(path.as_ref())?;
    parse_manifest(kind, BufReader::new(file))
}
