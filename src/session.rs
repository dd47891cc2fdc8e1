use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, SystemTime};

use lazy_static::lazy_static;
use uuid::Uuid;

use crate::error::DatasetError;
use crate::mining::{AssociationRule, FrequentItemset};
use crate::table::DataTable;

/// Name of the browser cookie carrying the session identifier
pub const SESSION_COOKIE: &str = "session";

// Sessions live for 24 hours
const SESSION_DURATION: u64 = 24 * 60 * 60;

/// Everything stored for one browser session
///
/// Created on a successful upload and replaced wholesale by the next one.
/// The table is held serialized so the dataset view round-trips exactly what
/// was parsed; the mined results are scoped here too, so concurrent sessions
/// never see each other's data.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// The cleaned transaction table, serialized with [`DataTable::to_json`]
    pub table_json: String,

    /// Original (sanitized) name of the uploaded file
    pub file_name: String,

    /// Frequent itemsets mined from this session's upload
    pub itemsets: Vec<FrequentItemset>,

    /// Association rules mined from this session's upload
    pub rules: Vec<AssociationRule>,

    /// Time when the record expires
    pub expires_at: SystemTime,
}

impl SessionRecord {
    /// Deserialize the stored table
    pub fn table(&self) -> Result<DataTable, DatasetError> {
        DataTable::from_json(&self.table_json)
    }
}

/// Global session storage
///
/// Stores all active sessions in a thread-safe map keyed by session id.
lazy_static! {
    static ref SESSIONS: RwLock<HashMap<String, SessionRecord>> = RwLock::new(HashMap::new());
}

/// Store a session's dataset and mined results
///
/// Reuses `session_id` when the caller already has one, otherwise mints a new
/// UUIDv4 identifier. Any previous record under that id is replaced.
///
/// # Arguments
/// * `session_id` - Existing session id from the cookie, if any
/// * `table` - The parsed transaction table
/// * `file_name` - Sanitized upload filename
/// * `itemsets` - Mined frequent itemsets
/// * `rules` - Mined association rules
///
/// # Returns
/// * `Result<String, DatasetError>` - The session id the record lives under
pub fn store_dataset(
    session_id: Option<&str>,
    table: &DataTable,
    file_name: &str,
    itemsets: Vec<FrequentItemset>,
    rules: Vec<AssociationRule>,
) -> Result<String, DatasetError> {
    let id = match session_id {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => Uuid::new_v4().to_string(),
    };

    let record = SessionRecord {
        table_json: table.to_json()?,
        file_name: file_name.to_string(),
        itemsets,
        rules,
        expires_at: SystemTime::now() + Duration::from_secs(SESSION_DURATION),
    };

    let mut sessions = SESSIONS.write().unwrap();
    sessions.insert(id.clone(), record);

    Ok(id)
}

/// Fetch a session's record, dropping it if expired
///
/// # Arguments
/// * `session_id` - The session id from the cookie
///
/// # Returns
/// * `Option<SessionRecord>` - The record if present and still live
pub fn get_record(session_id: &str) -> Option<SessionRecord> {
    {
        let sessions = SESSIONS.read().unwrap();
        if let Some(record) = sessions.get(session_id) {
            if record.expires_at > SystemTime::now() {
                return Some(record.clone());
            }
        } else {
            return None;
        }
    }

    // Expired: purge under the write lock
    let mut sessions = SESSIONS.write().unwrap();
    sessions.remove(session_id);
    None
}

/// Remove a session's record
pub fn destroy(session_id: &str) {
    let mut sessions = SESSIONS.write().unwrap();
    sessions.remove(session_id);
}
