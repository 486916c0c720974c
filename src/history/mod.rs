mod store;

pub use store::{
    load_history, parse_timestamp, save_history, HistoryStore, DEFAULT_DATE_FORMAT,
    DEFAULT_HISTORY_DIR, DEFAULT_HISTORY_FILE, DEFAULT_RETENTION_DAYS,
};
