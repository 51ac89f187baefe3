use std::fs;
use std::path::Path;

use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Transaction};
use tracing::{debug, info};

use crate::database::models::{
    CatalogSummary, Image, ImageFilter, NewImage, Page, Tag, TagWithCount,
};
use crate::database::schema::{DROP_ALL, SCHEMA};
use crate::error::{Result, VaultError};
use crate::utils::paths::resolve_under_root;

pub const SETTING_ROOT_DIR: &str = "root_dir";
pub const SETTING_LAST_SCAN: &str = "last_scan";

const DEFAULT_TAGS: &[(&str, &str)] = &[
    ("Needs Inpainting", "#ffb703"),
    ("Ready For i2v", "#06d6a0"),
    ("Ready for Upscale", "#8ecae6"),
    ("SFW", "#4ade80"),
    ("NSFW", "#f87171"),
    ("Posted", "#4ade80"),
    ("i2v done", "#06d6a0"),
];

/// The catalog operations the scan engine relies on.
///
/// Implemented for [`Connection`], so a [`Transaction`] (which derefs to one)
/// can be handed to the engine and every mutation of a scan commits together.
pub trait CatalogStore {
    fn find_image_by_path(&self, path: &str) -> Result<Option<Image>>;

    /// Inserts the row, or refreshes size/mtime/dimensions/hash of the row
    /// already stored under the same path. `created_at` is kept on update.
    fn upsert_image(&self, image: &NewImage) -> Result<Image>;

    fn delete_image(&self, image: &Image) -> Result<()>;

    fn find_or_create_tag(&self, name: &str) -> Result<Tag>;

    fn link_exists(&self, image_id: i64, tag_id: i64) -> Result<bool>;

    fn create_link(&self, image_id: i64, tag_id: i64) -> Result<()>;

    fn all_images(&self) -> Result<Vec<Image>>;
}

impl CatalogStore for Connection {
    fn find_image_by_path(&self, path: &str) -> Result<Option<Image>> {
        let mut stmt = self.prepare_cached(&format!(
            "SELECT {} FROM images WHERE path = ?1",
            Image::COLUMNS
        ))?;
        let image = stmt.query_row(params![path], Image::from_row).optional()?;
        Ok(image)
    }

    fn upsert_image(&self, image: &NewImage) -> Result<Image> {
        let now = Utc::now();
        let mut stmt = self.prepare_cached(&format!(
            "INSERT INTO images
                (path, filename, dirpath, size, width, height, mtime, file_hash,
                 created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
             ON CONFLICT(path) DO UPDATE SET
                size = excluded.size,
                width = excluded.width,
                height = excluded.height,
                mtime = excluded.mtime,
                file_hash = excluded.file_hash,
                updated_at = excluded.updated_at
             RETURNING {}",
            Image::COLUMNS
        ))?;
        let stored = stmt.query_row(
            params![
                image.path,
                image.filename,
                image.dirpath,
                image.size as i64,
                image.width,
                image.height,
                image.mtime,
                image.file_hash,
                now,
            ],
            Image::from_row,
        )?;
        Ok(stored)
    }

    fn delete_image(&self, image: &Image) -> Result<()> {
        self.execute("DELETE FROM image_tags WHERE image_id = ?1", params![image.id])?;
        self.execute("DELETE FROM images WHERE id = ?1", params![image.id])?;
        Ok(())
    }

    fn find_or_create_tag(&self, name: &str) -> Result<Tag> {
        self.prepare_cached("INSERT OR IGNORE INTO tags (name) VALUES (?1)")?
            .execute(params![name])?;
        let tag = self
            .prepare_cached("SELECT id, name, color, description FROM tags WHERE name = ?1")?
            .query_row(params![name], Tag::from_row)?;
        Ok(tag)
    }

    fn link_exists(&self, image_id: i64, tag_id: i64) -> Result<bool> {
        let exists = self
            .prepare_cached("SELECT 1 FROM image_tags WHERE image_id = ?1 AND tag_id = ?2")?
            .exists(params![image_id, tag_id])?;
        Ok(exists)
    }

    fn create_link(&self, image_id: i64, tag_id: i64) -> Result<()> {
        self.prepare_cached("INSERT OR IGNORE INTO image_tags (image_id, tag_id) VALUES (?1, ?2)")?
            .execute(params![image_id, tag_id])?;
        Ok(())
    }

    fn all_images(&self) -> Result<Vec<Image>> {
        let mut stmt = self.prepare(&format!("SELECT {} FROM images", Image::COLUMNS))?;
        let rows = stmt.query_map([], Image::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

/// Handle over the SQLite catalog. Owns the connection; nothing is global.
pub struct Catalog {
    conn: Connection,
}

impl Catalog {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        info!("Catalog opened at {:?}", path);
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.execute_batch(SCHEMA)?;
        let catalog = Self { conn };
        catalog.seed_default_tags()?;
        Ok(catalog)
    }

    fn seed_default_tags(&self) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare("INSERT OR IGNORE INTO tags (name, color) VALUES (?1, ?2)")?;
        for (name, color) in DEFAULT_TAGS {
            stmt.execute(params![name, color])?;
        }
        Ok(())
    }

    /// Read access to the store contract outside of a scan.
    pub fn store(&self) -> &Connection {
        &self.conn
    }

    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }

    /// Drops every table and recreates an empty, seeded catalog.
    pub fn reset(&mut self) -> Result<()> {
        self.conn.execute_batch(DROP_ALL)?;
        self.conn.execute_batch(SCHEMA)?;
        self.seed_default_tags()?;
        info!("Catalog reset");
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM settings WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn list_tags(&self) -> Result<Vec<TagWithCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.name, t.color, t.description, COUNT(it.image_id)
             FROM tags t LEFT JOIN image_tags it ON it.tag_id = t.id
             GROUP BY t.id
             ORDER BY t.name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(TagWithCount {
                tag: Tag::from_row(row)?,
                image_count: row.get::<_, i64>(4)? as u64,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn find_tag(&self, name: &str) -> Result<Option<Tag>> {
        let tag = self
            .conn
            .query_row(
                "SELECT id, name, color, description FROM tags WHERE name = ?1",
                params![name],
                Tag::from_row,
            )
            .optional()?;
        Ok(tag)
    }

    /// Creating a tag whose name already exists returns the existing tag untouched.
    pub fn create_tag(
        &self,
        name: &str,
        color: Option<&str>,
        description: Option<&str>,
    ) -> Result<Tag> {
        let name = clean_tag_name(name)?;
        if let Some(existing) = self.find_tag(name)? {
            return Ok(existing);
        }
        self.conn.execute(
            "INSERT INTO tags (name, color, description) VALUES (?1, ?2, ?3)",
            params![name, non_empty(color), non_empty(description)],
        )?;
        Ok(Tag {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            color: non_empty(color).map(str::to_string),
            description: non_empty(description).map(str::to_string),
        })
    }

    pub fn update_tag(
        &self,
        tag_id: i64,
        name: &str,
        color: Option<&str>,
        description: Option<&str>,
    ) -> Result<Tag> {
        let name = clean_tag_name(name)?;
        if let Some(existing) = self.find_tag(name)? {
            if existing.id != tag_id {
                return Err(VaultError::TagNameTaken(name.to_string()));
            }
        }
        let changed = self.conn.execute(
            "UPDATE tags SET name = ?1, color = ?2, description = ?3 WHERE id = ?4",
            params![name, non_empty(color), non_empty(description), tag_id],
        )?;
        if changed == 0 {
            return Err(VaultError::TagNotFound(tag_id.to_string()));
        }
        Ok(Tag {
            id: tag_id,
            name: name.to_string(),
            color: non_empty(color).map(str::to_string),
            description: non_empty(description).map(str::to_string),
        })
    }

    /// Removes the tag and every association to it.
    pub fn delete_tag(&mut self, tag_id: i64) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM image_tags WHERE tag_id = ?1", params![tag_id])?;
        let removed = tx.execute("DELETE FROM tags WHERE id = ?1", params![tag_id])?;
        if removed == 0 {
            return Err(VaultError::TagNotFound(tag_id.to_string()));
        }
        tx.commit()?;
        Ok(())
    }

    pub fn get_image(&self, image_id: i64) -> Result<Option<Image>> {
        let image = self
            .conn
            .query_row(
                &format!("SELECT {} FROM images WHERE id = ?1", Image::COLUMNS),
                params![image_id],
                Image::from_row,
            )
            .optional()?;
        Ok(image)
    }

    pub fn image_tags(&self, image_id: i64) -> Result<Vec<Tag>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.name, t.color, t.description
             FROM tags t JOIN image_tags it ON it.tag_id = t.id
             WHERE it.image_id = ?1
             ORDER BY t.name",
        )?;
        let rows = stmt.query_map(params![image_id], Tag::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Lists images, most recently updated first. `page` is 1-based.
    pub fn list_images(
        &self,
        filter: &ImageFilter,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Image>> {
        let page = page.max(1);
        let page_size = page_size.max(1);

        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(query) = filter.query.as_deref().filter(|q| !q.is_empty()) {
            clauses.push("filename LIKE '%' || ? || '%'".to_string());
            values.push(Value::Text(query.to_string()));
        }

        let required = self.resolve_tag_ids(&filter.tags)?;
        if !required.is_empty() {
            let marks = vec!["?"; required.len()].join(", ");
            clauses.push(format!(
                "id IN (SELECT image_id FROM image_tags WHERE tag_id IN ({marks})
                        GROUP BY image_id HAVING COUNT(tag_id) = {})",
                required.len()
            ));
            values.extend(required.into_iter().map(Value::Integer));
        }

        for tag_id in self.resolve_tag_ids(&filter.exclude_tags)? {
            clauses.push(
                "id NOT IN (SELECT image_id FROM image_tags WHERE tag_id = ?)".to_string(),
            );
            values.push(Value::Integer(tag_id));
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM images{where_sql}"),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )?;

        let offset = i64::from(page - 1) * i64::from(page_size);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM images{where_sql}
             ORDER BY updated_at DESC, id DESC
             LIMIT {page_size} OFFSET {offset}",
            Image::COLUMNS
        ))?;
        let items = stmt
            .query_map(params_from_iter(values.iter()), Image::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Page {
            total: total as u64,
            page,
            page_size,
            items,
        })
    }

    fn resolve_tag_ids(&self, names: &[String]) -> Result<Vec<i64>> {
        let mut ids = Vec::new();
        for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            if let Some(tag) = self.find_tag(name)? {
                if !ids.contains(&tag.id) {
                    ids.push(tag.id);
                }
            }
        }
        Ok(ids)
    }

    /// Attaches a tag by name, creating the tag when needed. Idempotent.
    pub fn assign_tag(&self, image_id: i64, name: &str) -> Result<Tag> {
        let name = clean_tag_name(name)?;
        if self.get_image(image_id)?.is_none() {
            return Err(VaultError::ImageNotFound(image_id));
        }
        let tag = self.conn.find_or_create_tag(name)?;
        if !self.conn.link_exists(image_id, tag.id)? {
            self.conn.create_link(image_id, tag.id)?;
        }
        Ok(tag)
    }

    /// Returns whether an association was removed.
    pub fn remove_tag(&self, image_id: i64, tag_id: i64) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM image_tags WHERE image_id = ?1 AND tag_id = ?2",
            params![image_id, tag_id],
        )?;
        Ok(removed > 0)
    }

    /// Deletes catalog rows and, when `root` is given, their backing files.
    ///
    /// Every existing file is checked against `root` before anything is
    /// unlinked, so one escaping path aborts the whole batch. Unknown ids are
    /// skipped. If unlinking a file fails, rows of the files already removed
    /// are still committed and the error is returned. Returns the number of
    /// rows removed.
    pub fn delete_images(&mut self, image_ids: &[i64], root: Option<&Path>) -> Result<usize> {
        let mut doomed = Vec::new();
        for &id in image_ids {
            if let Some(image) = self.get_image(id)? {
                let file = match root {
                    Some(root) if Path::new(&image.path).exists() => {
                        Some(resolve_under_root(root, Path::new(&image.path))?)
                    }
                    _ => None,
                };
                doomed.push((image, file));
            }
        }

        let mut tx = self.conn.transaction()?;
        let mut removed = 0;
        let mut failure = None;
        for (image, file) in &doomed {
            // a failed unlink rolls back only this image's row
            let sp = tx.savepoint()?;
            sp.delete_image(image)?;
            if let Some(file) = file {
                if let Err(e) = fs::remove_file(file) {
                    failure = Some(e);
                    break;
                }
                debug!("Removed {:?} from disk", file);
            }
            sp.commit()?;
            removed += 1;
        }
        tx.commit()?;

        match failure {
            Some(e) => Err(e.into()),
            None => Ok(removed),
        }
    }

    pub fn summary(&self) -> Result<CatalogSummary> {
        let (images, total_bytes): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(size), 0) FROM images",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let tags: i64 = self.conn.query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))?;
        Ok(CatalogSummary {
            images: images as u64,
            tags: tags as u64,
            total_bytes: total_bytes as u64,
        })
    }
}

fn clean_tag_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(VaultError::EmptyTagName);
    }
    Ok(name)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_image(path: &str, size: u64) -> NewImage {
        let p = Path::new(path);
        NewImage {
            path: path.to_string(),
            filename: p.file_name().unwrap().to_string_lossy().into_owned(),
            dirpath: p.parent().unwrap().to_string_lossy().into_owned(),
            size,
            width: 10,
            height: 20,
            mtime: 1_700_000_000.25,
            file_hash: Some("abc".to_string()),
        }
    }

    #[test]
    fn test_upsert_keeps_identity_and_created_at() -> Result<()> {
        let catalog = Catalog::open_in_memory()?;
        let store = catalog.store();

        let first = store.upsert_image(&new_image("/vault/a.jpg", 100))?;
        let mut changed = new_image("/vault/a.jpg", 200);
        changed.file_hash = Some("def".to_string());
        let second = store.upsert_image(&changed)?;

        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(second.size, 200);
        assert_eq!(second.file_hash.as_deref(), Some("def"));
        assert_eq!(store.all_images()?.len(), 1);

        let found = store.find_image_by_path("/vault/a.jpg")?.unwrap();
        assert_eq!(found, second);
        assert!(store.find_image_by_path("/vault/missing.jpg")?.is_none());
        Ok(())
    }

    #[test]
    fn test_links_are_idempotent() -> Result<()> {
        let catalog = Catalog::open_in_memory()?;
        let store = catalog.store();
        let image = store.upsert_image(&new_image("/vault/Home/a.jpg", 1))?;

        let tag = store.find_or_create_tag("Home")?;
        let again = store.find_or_create_tag("Home")?;
        assert_eq!(tag.id, again.id);

        assert!(!store.link_exists(image.id, tag.id)?);
        store.create_link(image.id, tag.id)?;
        store.create_link(image.id, tag.id)?;
        assert!(store.link_exists(image.id, tag.id)?);
        assert_eq!(catalog.image_tags(image.id)?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_default_tags_seeded_once() -> Result<()> {
        let mut catalog = Catalog::open_in_memory()?;
        assert_eq!(catalog.list_tags()?.len(), DEFAULT_TAGS.len());
        catalog.seed_default_tags()?;
        catalog.reset()?;
        assert_eq!(catalog.list_tags()?.len(), DEFAULT_TAGS.len());
        assert!(catalog.find_tag("NSFW")?.is_some());
        Ok(())
    }

    #[test]
    fn test_settings_upsert() -> Result<()> {
        let catalog = Catalog::open_in_memory()?;
        assert_eq!(catalog.get_setting(SETTING_ROOT_DIR)?, None);
        catalog.set_setting(SETTING_ROOT_DIR, "/one")?;
        catalog.set_setting(SETTING_ROOT_DIR, "/two")?;
        assert_eq!(catalog.get_setting(SETTING_ROOT_DIR)?.as_deref(), Some("/two"));
        Ok(())
    }

    #[test]
    fn test_tag_management() -> Result<()> {
        let mut catalog = Catalog::open_in_memory()?;
        let tag = catalog.create_tag("  Portraits ", Some("#fff"), Some(""))?;
        assert_eq!(tag.name, "Portraits");
        assert_eq!(tag.description, None);

        let same = catalog.create_tag("Portraits", None, None)?;
        assert_eq!(same.id, tag.id);
        assert_eq!(same.color.as_deref(), Some("#fff"));

        assert!(matches!(catalog.create_tag("   ", None, None), Err(VaultError::EmptyTagName)));
        assert!(matches!(
            catalog.update_tag(tag.id, "NSFW", None, None),
            Err(VaultError::TagNameTaken(_))
        ));

        let renamed = catalog.update_tag(tag.id, "People", None, Some("faces"))?;
        assert_eq!(renamed.name, "People");
        assert!(catalog.find_tag("Portraits")?.is_none());

        let image = catalog.store().upsert_image(&new_image("/vault/a.jpg", 1))?;
        catalog.assign_tag(image.id, "People")?;
        catalog.delete_tag(tag.id)?;
        assert!(catalog.image_tags(image.id)?.is_empty());
        assert!(matches!(catalog.delete_tag(tag.id), Err(VaultError::TagNotFound(_))));
        Ok(())
    }

    #[test]
    fn test_list_images_filters() -> Result<()> {
        let catalog = Catalog::open_in_memory()?;
        let store = catalog.store();
        let a = store.upsert_image(&new_image("/vault/sunset.jpg", 1))?;
        let b = store.upsert_image(&new_image("/vault/sunrise.png", 2))?;
        let c = store.upsert_image(&new_image("/vault/cat.webp", 3))?;

        catalog.assign_tag(a.id, "Sky")?;
        catalog.assign_tag(a.id, "Posted")?;
        catalog.assign_tag(b.id, "Sky")?;
        catalog.assign_tag(c.id, "Posted")?;

        let all = catalog.list_images(&ImageFilter::default(), 1, 100)?;
        assert_eq!(all.total, 3);

        let by_name = ImageFilter { query: Some("sun".into()), ..Default::default() };
        assert_eq!(catalog.list_images(&by_name, 1, 100)?.total, 2);

        let both = ImageFilter { tags: vec!["Sky".into(), "Posted".into()], ..Default::default() };
        let page = catalog.list_images(&both, 1, 100)?;
        assert_eq!(page.items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![a.id]);

        let unknown = ImageFilter { tags: vec!["Nope".into()], ..Default::default() };
        assert_eq!(catalog.list_images(&unknown, 1, 100)?.total, 3);

        let excluded = ImageFilter {
            tags: vec!["Sky".into()],
            exclude_tags: vec!["Posted".into()],
            ..Default::default()
        };
        let page = catalog.list_images(&excluded, 1, 100)?;
        assert_eq!(page.items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![b.id]);

        let paged = catalog.list_images(&ImageFilter::default(), 2, 2)?;
        assert_eq!(paged.total, 3);
        assert_eq!(paged.items.len(), 1);
        Ok(())
    }

    #[test]
    fn test_delete_images_removes_files_under_root() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let root = dir.path().canonicalize()?;
        let file = root.join("a.jpg");
        fs::write(&file, b"x")?;

        let mut catalog = Catalog::open_in_memory()?;
        let image = catalog.store().upsert_image(&new_image(file.to_str().unwrap(), 1))?;
        catalog.assign_tag(image.id, "Keep")?;

        assert_eq!(catalog.delete_images(&[image.id, 999], Some(&root))?, 1);
        assert!(!file.exists());
        assert!(catalog.get_image(image.id)?.is_none());
        let keep = catalog.find_tag("Keep")?.unwrap();
        assert!(!catalog.store().link_exists(image.id, keep.id)?);
        Ok(())
    }

    #[test]
    fn test_delete_images_keeps_row_when_unlink_fails() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let root = dir.path().canonicalize()?;
        let file = root.join("a.jpg");
        fs::write(&file, b"x")?;
        // a directory cannot be removed with remove_file
        let stuck = root.join("b.jpg");
        fs::create_dir(&stuck)?;

        let mut catalog = Catalog::open_in_memory()?;
        let a = catalog.store().upsert_image(&new_image(file.to_str().unwrap(), 1))?;
        let b = catalog.store().upsert_image(&new_image(stuck.to_str().unwrap(), 1))?;

        let result = catalog.delete_images(&[a.id, b.id], Some(&root));
        assert!(matches!(result, Err(VaultError::Io(_))));
        assert!(!file.exists());
        assert!(catalog.get_image(a.id)?.is_none());
        assert!(stuck.exists());
        assert!(catalog.get_image(b.id)?.is_some());
        Ok(())
    }

    #[test]
    fn test_delete_images_refuses_outside_root() -> Result<()> {
        let vault = tempfile::tempdir()?;
        let elsewhere = tempfile::tempdir()?;
        let file = elsewhere.path().canonicalize()?.join("b.jpg");
        fs::write(&file, b"x")?;

        let mut catalog = Catalog::open_in_memory()?;
        let image = catalog.store().upsert_image(&new_image(file.to_str().unwrap(), 1))?;

        let result = catalog.delete_images(&[image.id], Some(vault.path()));
        assert!(matches!(result, Err(VaultError::PathOutsideRoot { .. })));
        assert!(file.exists());
        assert!(catalog.get_image(image.id)?.is_some());
        Ok(())
    }

    #[test]
    fn test_summary() -> Result<()> {
        let catalog = Catalog::open_in_memory()?;
        catalog.store().upsert_image(&new_image("/vault/a.jpg", 100))?;
        catalog.store().upsert_image(&new_image("/vault/b.jpg", 50))?;
        let summary = catalog.summary()?;
        assert_eq!(summary.images, 2);
        assert_eq!(summary.total_bytes, 150);
        assert_eq!(summary.tags, DEFAULT_TAGS.len() as u64);
        Ok(())
    }
}
