//! JSON-file backed data service.
//!
//! The data file holds a JSON array of records. Each record is an object
//! with an `id`, an optional `children` array of nested records, and any
//! other fields. A missing file reads as an empty collection and is
//! created on first write.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::debug;

use adminkit_core::{DataService, ItemId, ListPage, ListQuery, Record, ServiceError, TreeService};

/// Keys consulted, in order, for a record's human-readable name.
const NAME_KEYS: [&str; 4] = ["name", "title", "label", "code"];

// ── Record ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRecord {
    pub id: ItemId,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<JsonRecord>,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record for JsonRecord {
    fn id(&self) -> &ItemId {
        &self.id
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn display_name(&self) -> String {
        NAME_KEYS
            .iter()
            .find_map(|key| self.fields.get(*key).and_then(Value::as_str))
            .map_or_else(|| self.id.to_string(), str::to_owned)
    }
}

impl JsonRecord {
    /// Case-insensitive match of `term` against the display name and every
    /// string field of this record or any descendant.
    fn matches(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let needle = term.to_lowercase();
        let own = self.display_name().to_lowercase().contains(&needle)
            || self
                .fields
                .values()
                .filter_map(Value::as_str)
                .any(|v| v.to_lowercase().contains(&needle));
        own || self.children.iter().any(|c| c.matches(term))
    }
}

fn find_mut<'a>(nodes: &'a mut [JsonRecord], id: &ItemId) -> Option<&'a mut JsonRecord> {
    for node in nodes {
        if &node.id == id {
            return Some(node);
        }
        if let Some(found) = find_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

fn remove(nodes: &mut Vec<JsonRecord>, id: &ItemId) -> bool {
    if let Some(pos) = nodes.iter().position(|n| &n.id == id) {
        nodes.remove(pos);
        return true;
    }
    nodes.iter_mut().any(|n| remove(&mut n.children, id))
}

fn contains(nodes: &[JsonRecord], id: &ItemId) -> bool {
    nodes
        .iter()
        .any(|n| &n.id == id || contains(&n.children, id))
}

// ── Service ─────────────────────────────────────────────────────────

/// Record fields for `create`. An `id` may be supplied; otherwise a UUID
/// is assigned. A `parent` key nests the new record under that id.
pub type NewRecord = Map<String, Value>;

/// Partial record for `update`; keys replace existing fields, `null`
/// removes them. `id` and `children` cannot be changed.
pub type RecordPatch = Map<String, Value>;

#[derive(Debug)]
pub struct JsonFileService {
    path: PathBuf,
    /// Serializes read-modify-write cycles on the file.
    write_lock: Mutex<()>,
}

impl JsonFileService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Vec<JsonRecord>, ServiceError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(storage(&self.path, &e)),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|e| {
            ServiceError::Storage(format!("{} is not a record array: {e}", self.path.display()))
        })
    }

    async fn write(&self, records: &[JsonRecord]) -> Result<(), ServiceError> {
        let body = serde_json::to_string_pretty(records)
            .map_err(|e| ServiceError::Storage(format!("failed to encode records: {e}")))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage(parent, &e))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| storage(&tmp, &e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| storage(&self.path, &e))?;
        debug!(path = %self.path.display(), roots = records.len(), "data file written");
        Ok(())
    }
}

fn storage(path: &Path, err: &std::io::Error) -> ServiceError {
    ServiceError::Storage(format!("{}: {err}", path.display()))
}

impl DataService for JsonFileService {
    type Item = JsonRecord;
    type Create = NewRecord;
    type Update = RecordPatch;

    async fn list(&self, query: ListQuery) -> Result<ListPage<JsonRecord>, ServiceError> {
        let roots = self.read().await?;
        let matching: Vec<JsonRecord> = roots
            .into_iter()
            .filter(|r| r.matches(&query.search))
            .collect();
        let items_count = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let take = usize::try_from(query.page_size).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(query.offset())
            .take(take)
            .collect();
        Ok(ListPage { items, items_count })
    }

    async fn create(&self, mut data: NewRecord) -> Result<JsonRecord, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut roots = self.read().await?;

        let id = match data.remove("id") {
            None | Some(Value::Null) => ItemId::new(uuid::Uuid::new_v4().to_string()),
            Some(Value::String(s)) if !s.is_empty() => ItemId::new(s),
            Some(Value::Number(n)) => ItemId::new(n.to_string()),
            Some(_) => {
                return Err(ServiceError::Validation {
                    field: "id".into(),
                    message: "must be a non-empty string or a number".into(),
                });
            }
        };
        if contains(&roots, &id) {
            return Err(ServiceError::Rejected {
                message: format!("a record with id {id} already exists"),
            });
        }

        let parent = match data.remove("parent") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(ItemId::new(s)),
            Some(_) => {
                return Err(ServiceError::Validation {
                    field: "parent".into(),
                    message: "must be a record id".into(),
                });
            }
        };
        data.remove("children");

        let record = JsonRecord {
            id,
            children: Vec::new(),
            fields: data,
        };
        match parent {
            None => roots.push(record.clone()),
            Some(parent) => find_mut(&mut roots, &parent)
                .ok_or(ServiceError::NotFound { id: parent })?
                .children
                .push(record.clone()),
        }
        self.write(&roots).await?;
        Ok(record)
    }

    async fn update(&self, id: &ItemId, patch: RecordPatch) -> Result<JsonRecord, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut roots = self.read().await?;
        let target = find_mut(&mut roots, id).ok_or_else(|| ServiceError::NotFound { id: id.clone() })?;

        for (key, value) in patch {
            if key == "id" || key == "children" {
                continue;
            }
            if value.is_null() {
                target.fields.remove(&key);
            } else {
                target.fields.insert(key, value);
            }
        }
        let updated = target.clone();
        self.write(&roots).await?;
        Ok(updated)
    }

    async fn delete(&self, id: &ItemId) -> Result<(), ServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut roots = self.read().await?;
        if !remove(&mut roots, id) {
            return Err(ServiceError::NotFound { id: id.clone() });
        }
        self.write(&roots).await
    }
}

impl TreeService for JsonFileService {}
