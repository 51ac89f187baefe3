use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::Serialize;

/// One indexed file. `width`/`height` are `0` when the header could not be read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    pub id: i64,
    pub path: String,
    pub filename: String,
    pub dirpath: String,
    pub size: u64,
    pub width: u32,
    pub height: u32,
    pub mtime: f64,
    pub file_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Image {
    pub(crate) const COLUMNS: &'static str = "id, path, filename, dirpath, size, width, height, \
        mtime, file_hash, created_at, updated_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            path: row.get(1)?,
            filename: row.get(2)?,
            dirpath: row.get(3)?,
            size: row.get::<_, i64>(4)? as u64,
            width: row.get(5)?,
            height: row.get(6)?,
            mtime: row.get(7)?,
            file_hash: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }
}

/// Image row before the catalog has assigned it an id.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub path: String,
    pub filename: String,
    pub dirpath: String,
    pub size: u64,
    pub width: u32,
    pub height: u32,
    pub mtime: f64,
    pub file_hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: Option<String>,
    pub description: Option<String>,
}

impl Tag {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            color: row.get(2)?,
            description: row.get(3)?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TagWithCount {
    #[serde(flatten)]
    pub tag: Tag,
    pub image_count: u64,
}

/// Filters for listing images. Unknown tag names are ignored.
#[derive(Debug, Clone, Default)]
pub struct ImageFilter {
    /// Substring match on the filename.
    pub query: Option<String>,
    /// Images must carry every one of these tags.
    pub tags: Vec<String>,
    /// Images must carry none of these tags.
    pub exclude_tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CatalogSummary {
    pub images: u64,
    pub tags: u64,
    pub total_bytes: u64,
}
