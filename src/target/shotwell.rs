// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Shotwell `photo.db` access

use chrono::Utc;
use rusqlite::{params, Connection, OpenFlags};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

use super::{TargetDb, TitleUpdate};
use crate::events::EventId;
use crate::{MigrationError, Result};

const MEDIA_TABLES: [&str; 2] = ["PhotoTable", "VideoTable"];

/// A photo or video row, as far as the migration cares
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaRow {
    pub id: i64,
    pub filename: String,
    pub title: Option<String>,
    pub rating: i64,
    pub event_id: i64,
}

/// Row counts for a quick summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbStats {
    pub photo_count: i64,
    pub video_count: i64,
    pub tag_count: i64,
    pub event_count: i64,
}

/// Connection to a Shotwell database
pub struct ShotwellDb {
    conn: Connection,
}

impl ShotwellDb {
    /// Open an existing Shotwell database.
    ///
    /// Never creates one: a missing file or schema is a setup error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(MigrationError::Setup(format!("Shotwell database not found at {:?}", path)));
        }
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)
            .map_err(|e| MigrationError::Setup(format!("Cannot open {:?}: {}", path, e)))?;
        let db = Self { conn };
        db.check_schema()?;
        Ok(db)
    }

    /// Open an in-memory database with the Shotwell tables (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.create_schema()?;
        Ok(db)
    }

    /// The subset of Shotwell's schema the migration touches
    pub fn create_schema(&self) -> Result<()> {
        self.conn.execute_batch(r#"
            CREATE TABLE IF NOT EXISTS PhotoTable (
                id INTEGER PRIMARY KEY,
                filename TEXT UNIQUE NOT NULL,
                event_id INTEGER DEFAULT -1,
                rating INTEGER DEFAULT 0,
                title TEXT
            );

            CREATE TABLE IF NOT EXISTS VideoTable (
                id INTEGER PRIMARY KEY,
                filename TEXT UNIQUE NOT NULL,
                event_id INTEGER DEFAULT -1,
                rating INTEGER DEFAULT 0,
                title TEXT
            );

            CREATE TABLE IF NOT EXISTS EventTable (
                id INTEGER PRIMARY KEY,
                name TEXT,
                primary_photo_id INTEGER,
                time_created INTEGER,
                primary_source_id TEXT,
                comment TEXT
            );

            CREATE TABLE IF NOT EXISTS TagTable (
                id INTEGER PRIMARY KEY,
                name TEXT UNIQUE NOT NULL,
                photo_id_list TEXT,
                time_created INTEGER
            );
        "#)?;
        Ok(())
    }

    fn check_schema(&self) -> Result<()> {
        for table in ["PhotoTable", "VideoTable", "EventTable", "TagTable"] {
            let found: i64 = self.conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table],
                |row| row.get(0),
            )?;
            if found == 0 {
                return Err(MigrationError::Setup(format!(
                    "Not a Shotwell database: missing table {}",
                    table
                )));
            }
        }
        Ok(())
    }

    pub fn begin(&self) -> Result<()> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    pub fn commit(&self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    pub fn rollback(&self) -> Result<()> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    /// Register a photo the way a Shotwell import would
    pub fn insert_photo(&self, path: &Path) -> Result<i64> {
        self.insert_media("PhotoTable", path)
    }

    /// Register a video the way a Shotwell import would
    pub fn insert_video(&self, path: &Path) -> Result<i64> {
        self.insert_media("VideoTable", path)
    }

    fn insert_media(&self, table: &str, path: &Path) -> Result<i64> {
        self.conn.execute(
            &format!("INSERT INTO {} (filename) VALUES (?1)", table),
            params![path_str(path)?],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Row for a photo or video, whichever table has it
    pub fn get_media(&self, path: &Path) -> Result<Option<MediaRow>> {
        let filename = path_str(path)?;
        for table in MEDIA_TABLES {
            let result = self.conn.query_row(
                &format!(
                    "SELECT id, filename, title, rating, event_id FROM {} WHERE filename = ?1",
                    table
                ),
                params![filename],
                |row| {
                    Ok(MediaRow {
                        id: row.get(0)?,
                        filename: row.get(1)?,
                        title: row.get(2)?,
                        rating: row.get(3)?,
                        event_id: row.get(4)?,
                    })
                },
            );
            match result {
                Ok(row) => return Ok(Some(row)),
                Err(rusqlite::Error::QueryReturnedNoRows) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(None)
    }

    /// Shotwell's id string for a file: `thumb%016x` or `video-%016x`
    pub fn get_id_string(&self, path: &Path) -> Result<Option<String>> {
        let filename = path_str(path)?;
        for (table, prefix) in [("PhotoTable", "thumb"), ("VideoTable", "video-")] {
            let result: rusqlite::Result<i64> = self.conn.query_row(
                &format!("SELECT id FROM {} WHERE filename = ?1", table),
                params![filename],
                |row| row.get(0),
            );
            match result {
                Ok(id) => return Ok(Some(format!("{}{:016x}", prefix, id))),
                Err(rusqlite::Error::QueryReturnedNoRows) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(None)
    }

    /// Id strings attached to a tag
    pub fn tag_members(&self, tag: &str) -> Result<Vec<String>> {
        let result: rusqlite::Result<Option<String>> = self.conn.query_row(
            "SELECT photo_id_list FROM TagTable WHERE name = ?1",
            params![tag],
            |row| row.get(0),
        );
        match result {
            Ok(list) => Ok(split_id_list(list.as_deref().unwrap_or(""))),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Event names in id order
    pub fn event_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM EventTable ORDER BY id")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    /// Get database statistics
    pub fn get_stats(&self) -> Result<DbStats> {
        let count = |table: &str| -> Result<i64> {
            Ok(self.conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?)
        };
        Ok(DbStats {
            photo_count: count("PhotoTable")?,
            video_count: count("VideoTable")?,
            tag_count: count("TagTable")?,
            event_count: count("EventTable")?,
        })
    }

    /// Run an UPDATE against both media tables and insist on exactly one hit
    fn update_one(&self, set_clause: &str, value: &dyn rusqlite::ToSql, path: &Path) -> Result<()> {
        let filename = path_str(path)?;
        let mut changed = 0;
        for table in MEDIA_TABLES {
            changed += self.conn.execute(
                &format!("UPDATE {} SET {} = ?1 WHERE filename = ?2", table, set_clause),
                params![value, filename],
            )?;
        }
        match changed {
            1 => Ok(()),
            0 => Err(not_found(path)),
            n => Err(MigrationError::SinkWrite {
                path: path.to_path_buf(),
                reason: format!("filename matched {} photo/video rows", n),
            }),
        }
    }
}

impl TargetDb for ShotwellDb {
    fn upsert_tag(&mut self, photo: &Path, tag: &str) -> Result<()> {
        let id_str = self.get_id_string(photo)?.ok_or_else(|| not_found(photo))?;

        let existing: rusqlite::Result<(i64, Option<String>)> = self.conn.query_row(
            "SELECT id, photo_id_list FROM TagTable WHERE name = ?1",
            params![tag],
            |row| Ok((row.get(0)?, row.get(1)?)),
        );

        match existing {
            Ok((tag_id, list)) => {
                let list = list.unwrap_or_default();
                if split_id_list(&list).iter().any(|id| *id == id_str) {
                    debug!("Tag '{}' already on {}", tag, id_str);
                    return Ok(());
                }
                let mut updated = list;
                if !updated.is_empty() && !updated.ends_with(',') {
                    updated.push(',');
                }
                updated.push_str(&id_str);
                updated.push(',');
                self.conn.execute(
                    "UPDATE TagTable SET photo_id_list = ?1 WHERE id = ?2",
                    params![updated, tag_id],
                )?;
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                self.conn.execute(
                    "INSERT INTO TagTable (name, photo_id_list, time_created) VALUES (?1, ?2, ?3)",
                    params![tag, format!("{},", id_str), Utc::now().timestamp()],
                )?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn upsert_caption(&mut self, photo: &Path, text: &str) -> Result<TitleUpdate> {
        let row = self.get_media(photo)?.ok_or_else(|| not_found(photo))?;

        match row.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            Some(existing) if existing == text => Ok(TitleUpdate::Unchanged),
            Some(existing) => {
                warn!("Not overwriting title of {:?}: has {:?}, wanted {:?}", photo, existing, text);
                Ok(TitleUpdate::KeptExisting(existing.to_string()))
            }
            None => {
                self.update_one("title", &text, photo)?;
                Ok(TitleUpdate::Written)
            }
        }
    }

    fn upsert_rating(&mut self, photo: &Path, value: u8) -> Result<()> {
        debug!("Setting rating of {:?} to {}", photo, value);
        self.update_one("rating", &i64::from(value), photo)
    }

    fn ensure_event(&mut self, title: &str) -> Result<EventId> {
        let existing: rusqlite::Result<i64> = self.conn.query_row(
            "SELECT id FROM EventTable WHERE name = ?1",
            params![title],
            |row| row.get(0),
        );
        match existing {
            Ok(id) => Ok(id),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                info!("Creating event {:?}", title);
                self.conn.execute(
                    "INSERT INTO EventTable (name, time_created) VALUES (?1, ?2)",
                    params![title, Utc::now().timestamp()],
                )?;
                Ok(self.conn.last_insert_rowid())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn assign_photo_to_event(&mut self, photo: &Path, event: EventId) -> Result<()> {
        self.update_one("event_id", &event, photo)
    }
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str().ok_or_else(|| MigrationError::SinkWrite {
        path: path.to_path_buf(),
        reason: "path is not valid UTF-8".to_string(),
    })
}

fn not_found(path: &Path) -> MigrationError {
    MigrationError::SinkWrite {
        path: path.to_path_buf(),
        reason: "no photo or video row in the Shotwell database".to_string(),
    }
}

fn split_id_list(list: &str) -> Vec<String> {
    list.split(',')
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_media() -> ShotwellDb {
        let db = ShotwellDb::in_memory().unwrap();
        db.insert_photo(Path::new("/home/david/Pictures/2023/IMG_1924.JPG")).unwrap();
        db.insert_video(Path::new("/home/david/Pictures/2019/legoland/20191129_133938.mp4")).unwrap();
        db
    }

    #[test]
    fn test_id_strings() {
        let db = db_with_media();
        assert_eq!(
            db.get_id_string(Path::new("/home/david/Pictures/2023/IMG_1924.JPG")).unwrap(),
            Some("thumb0000000000000001".to_string())
        );
        assert_eq!(
            db.get_id_string(Path::new("/home/david/Pictures/2019/legoland/20191129_133938.mp4")).unwrap(),
            Some("video-0000000000000001".to_string())
        );
        assert_eq!(db.get_id_string(Path::new("/nowhere")).unwrap(), None);
    }

    #[test]
    fn test_upsert_tag_is_idempotent() {
        let mut db = db_with_media();
        let photo = Path::new("/home/david/Pictures/2023/IMG_1924.JPG");
        let video = Path::new("/home/david/Pictures/2019/legoland/20191129_133938.mp4");

        db.upsert_tag(photo, "caketown").unwrap();
        db.upsert_tag(photo, "caketown").unwrap();
        db.upsert_tag(video, "caketown").unwrap();

        assert_eq!(
            db.tag_members("caketown").unwrap(),
            vec!["thumb0000000000000001", "video-0000000000000001"]
        );
        assert_eq!(db.get_stats().unwrap().tag_count, 1);
    }

    #[test]
    fn test_upsert_tag_unknown_file() {
        let mut db = db_with_media();
        let err = db.upsert_tag(Path::new("/nowhere.jpg"), "x").unwrap_err();
        assert!(matches!(err, MigrationError::SinkWrite { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_caption_never_overwrites() {
        let mut db = db_with_media();
        let photo = Path::new("/home/david/Pictures/2023/IMG_1924.JPG");

        assert_eq!(db.upsert_caption(photo, "Izzy and the frog").unwrap(), TitleUpdate::Written);
        assert_eq!(db.upsert_caption(photo, "Izzy and the frog").unwrap(), TitleUpdate::Unchanged);
        assert_eq!(
            db.upsert_caption(photo, "something else").unwrap(),
            TitleUpdate::KeptExisting("Izzy and the frog".to_string())
        );
        assert_eq!(db.get_media(photo).unwrap().unwrap().title.as_deref(), Some("Izzy and the frog"));
    }

    #[test]
    fn test_caption_on_video() {
        let mut db = db_with_media();
        let video = Path::new("/home/david/Pictures/2019/legoland/20191129_133938.mp4");
        assert_eq!(db.upsert_caption(video, "Legoland").unwrap(), TitleUpdate::Written);
        assert_eq!(db.get_media(video).unwrap().unwrap().title.as_deref(), Some("Legoland"));
    }

    #[test]
    fn test_rating_and_event() {
        let mut db = db_with_media();
        let photo = Path::new("/home/david/Pictures/2023/IMG_1924.JPG");

        db.upsert_rating(photo, 4).unwrap();
        db.upsert_rating(photo, 4).unwrap();

        let event = db.ensure_event("Family Picnic").unwrap();
        assert_eq!(db.ensure_event("Family Picnic").unwrap(), event);
        db.assign_photo_to_event(photo, event).unwrap();

        let row = db.get_media(photo).unwrap().unwrap();
        assert_eq!(row.rating, 4);
        assert_eq!(row.event_id, event);
        assert_eq!(db.event_names().unwrap(), vec!["Family Picnic"]);
    }

    #[test]
    fn test_rating_unknown_file() {
        let mut db = db_with_media();
        assert!(db.upsert_rating(Path::new("/nowhere.jpg"), 3).is_err());
    }

    #[test]
    fn test_open_missing_is_setup_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ShotwellDb::open(dir.path().join("photo.db")).err().unwrap();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_open_rejects_foreign_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.db");
        Connection::open(&path).unwrap().execute_batch("CREATE TABLE t (x)").unwrap();
        let err = ShotwellDb::open(&path).err().unwrap();
        assert!(matches!(err, MigrationError::Setup(_)));
    }

    #[test]
    fn test_rollback_discards_writes() {
        let mut db = db_with_media();
        let photo = Path::new("/home/david/Pictures/2023/IMG_1924.JPG");
        db.begin().unwrap();
        db.upsert_rating(photo, 5).unwrap();
        db.rollback().unwrap();
        assert_eq!(db.get_media(photo).unwrap().unwrap().rating, 0);
    }
}
