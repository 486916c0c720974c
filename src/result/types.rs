use super::result_set::ResultSet;
use std::fmt;

/// Outcome of a single console command, as handed back by the execution layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    Query(QueryResult),
    Command(CommandResult),
    Connect(ConnectResult),
    Metadata(MetadataResult),
    Storage(StorageResult),
    Error(ErrorResult),
    /// Acknowledgement of an asynchronous query that has not produced rows yet.
    InProgress(InProgressResult),
}

impl ExecutionResult {
    pub fn query(result_set: ResultSet, last_result_set: bool) -> Self {
        Self::Query(QueryResult::new(result_set, last_result_set))
    }

    pub fn command(result: impl Into<String>) -> Self {
        Self::Command(CommandResult {
            result: result.into(),
        })
    }

    pub fn connect(session_id: impl Into<String>) -> Self {
        Self::Connect(ConnectResult {
            session_id: session_id.into(),
        })
    }

    pub fn error(error_type: ErrorType, message: impl Into<String>) -> Self {
        Self::Error(ErrorResult {
            error_type,
            message: message.into(),
        })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub query_id: Option<String>,
    pub result_set: ResultSet,
    pub result_page: u32,
    pub last_result_set: bool,
}

impl QueryResult {
    pub fn new(result_set: ResultSet, last_result_set: bool) -> Self {
        Self {
            query_id: None,
            result_set,
            result_page: 0,
            last_result_set,
        }
    }

    pub fn with_query_id(mut self, query_id: impl Into<String>) -> Self {
        self.query_id = Some(query_id.into());
        self
    }

    pub fn with_page(mut self, result_page: u32) -> Self {
        self.result_page = result_page;
        self
    }

    /// More pages of the same query will follow this one.
    pub fn is_partial(&self) -> bool {
        !self.last_result_set
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    pub result: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectResult {
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InProgressResult {
    pub query_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    Parsing,
    Validation,
    Execution,
    NotSupported,
    Connection,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorType::Parsing => "PARSING",
            ErrorType::Validation => "VALIDATION",
            ErrorType::Execution => "EXECUTION",
            ErrorType::NotSupported => "NOT_SUPPORTED",
            ErrorType::Connection => "CONNECTION",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResult {
    pub error_type: ErrorType,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataOperation {
    CreateCatalog,
    CreateTable,
    CreateIndex,
    AlterCatalog,
    AlterTable,
    DropCatalog,
    DropTable,
    DropIndex,
    ListCatalogs,
    ListTables,
    ListColumns,
}

impl MetadataOperation {
    fn subject(&self) -> &'static str {
        match self {
            Self::CreateCatalog | Self::AlterCatalog | Self::DropCatalog => "CATALOG",
            Self::CreateTable | Self::AlterTable | Self::DropTable => "TABLE",
            Self::CreateIndex | Self::DropIndex => "INDEX",
            Self::ListCatalogs => "CATALOGS",
            Self::ListTables => "TABLES",
            Self::ListColumns => "COLUMNS",
        }
    }

    fn is_listing(&self) -> bool {
        matches!(
            self,
            Self::ListCatalogs | Self::ListTables | Self::ListColumns
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataResult {
    pub operation: MetadataOperation,
    pub listing: Vec<String>,
}

impl MetadataResult {
    pub fn new(operation: MetadataOperation) -> Self {
        Self {
            operation,
            listing: Vec::new(),
        }
    }

    pub fn with_listing(mut self, listing: Vec<String>) -> Self {
        self.listing = listing;
        self
    }
}

impl fmt::Display for MetadataResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subject = self.operation.subject();
        if self.operation.is_listing() {
            if self.listing.is_empty() {
                return write!(f, "No {} found", subject);
            }
            return write!(f, "{}", self.listing.join(crate::LINE_SEPARATOR));
        }

        let verb = match self.operation {
            MetadataOperation::CreateCatalog
            | MetadataOperation::CreateTable
            | MetadataOperation::CreateIndex => "created",
            MetadataOperation::AlterCatalog | MetadataOperation::AlterTable => "altered",
            _ => "dropped",
        };
        write!(f, "{} {} successfully", subject, verb)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageResult {
    pub message: String,
}

impl StorageResult {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for StorageResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
