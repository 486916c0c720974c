use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestKind {
    DataStore,
    Connector,
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestKind::DataStore => write!(f, "datastore"),
            ManifestKind::Connector => write!(f, "connector"),
        }
    }
}

impl FromStr for ManifestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "datastore" | "data_store" | "data-store" => Ok(ManifestKind::DataStore),
            "connector" => Ok(ManifestKind::Connector),
            other => Err(format!(
                "unknown manifest kind '{}', expected 'datastore' or 'connector'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Manifest {
    DataStore(DataStoreManifest),
    Connector(ConnectorManifest),
}

impl Manifest {
    pub fn kind(&self) -> ManifestKind {
        match self {
            Manifest::DataStore(_) => ManifestKind::DataStore,
            Manifest::Connector(_) => ManifestKind::Connector,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Manifest::DataStore(m) => &m.name,
            Manifest::Connector(m) => &m.name,
        }
    }

    pub fn version(&self) -> &str {
        match self {
            Manifest::DataStore(m) => &m.version,
            Manifest::Connector(m) => &m.version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataStoreManifest {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_properties: Vec<PropertyDef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub optional_properties: Vec<PropertyDef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub behaviors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorManifest {
    pub name: String,
    pub data_stores: Vec<String>,
    pub version: String,
    pub native: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_properties: Vec<PropertyDef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub optional_properties: Vec<PropertyDef>,
    pub supported_operations: Vec<Operation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionDef>,
}

impl ConnectorManifest {
    pub fn supports(&self, operation: Operation) -> bool {
        self.supported_operations.contains(&operation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyDef {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    Simple,
    Aggregation,
}

impl FromStr for FunctionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(FunctionKind::Simple),
            "aggregation" => Ok(FunctionKind::Aggregation),
            other => Err(format!("unknown function type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDef {
    pub name: String,
    pub signature: String,
    pub kind: FunctionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

macro_rules! operations {
    ($($variant:ident => $wire:literal,)+) => {
        /// Operations a connector can declare in `SupportedOperations`.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Operation {
            $($variant,)+
        }

        impl Operation {
            pub const ALL: &'static [Operation] = &[$(Operation::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Operation::$variant => $wire,)+
                }
            }
        }

        impl FromStr for Operation {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Operation::$variant),)+
                    other => Err(format!("unknown operation '{}'", other)),
                }
            }
        }
    };
}

operations! {
    CreateCatalog => "CREATE_CATALOG",
    AlterCatalog => "ALTER_CATALOG",
    DropCatalog => "DROP_CATALOG",
    CreateTable => "CREATE_TABLE",
    AlterTable => "ALTER_TABLE",
    DropTable => "DROP_TABLE",
    RegisterTable => "REGISTER_TABLE",
    UnregisterTable => "UNREGISTER_TABLE",
    TruncateTable => "TRUNCATE_TABLE",
    CreateIndex => "CREATE_INDEX",
    DropIndex => "DROP_INDEX",
    Insert => "INSERT",
    InsertIfNotExists => "INSERT_IF_NOT_EXISTS",
    UpdatePkEq => "UPDATE_PK_EQ",
    DeletePkEq => "DELETE_PK_EQ",
    Project => "PROJECT",
    SelectOperator => "SELECT_OPERATOR",
    SelectWindow => "SELECT_WINDOW",
    SelectLimit => "SELECT_LIMIT",
    SelectInnerJoin => "SELECT_INNER_JOIN",
    SelectOrderBy => "SELECT_ORDER_BY",
    SelectGroupBy => "SELECT_GROUP_BY",
    SelectFunctions => "SELECT_FUNCTIONS",
    FilterPkEq => "FILTER_PK_EQ",
    FilterPkIn => "FILTER_PK_IN",
    FilterIndexedEq => "FILTER_INDEXED_EQ",
    FilterNonIndexedEq => "FILTER_NON_INDEXED_EQ",
    FilterNonIndexedGt => "FILTER_NON_INDEXED_GT",
    FilterNonIndexedLt => "FILTER_NON_INDEXED_LT",
    FilterFunction => "FILTER_FUNCTION",
    FilterDisjunction => "FILTER_DISJUNCTION",
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
