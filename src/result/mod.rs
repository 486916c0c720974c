mod render;
mod result_set;
mod types;

pub use render::{column_widths, render, render_query, rule_width};
pub use result_set::{Cell, CellValue, ColumnMetadata, ResultSet, Row};
pub use types::{
    CommandResult, ConnectResult, ErrorResult, ErrorType, ExecutionResult, InProgressResult,
    MetadataOperation, MetadataResult, QueryResult, StorageResult,
};
