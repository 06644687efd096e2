// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Migration orchestrator
//!
//! Walks a source tree in path order, assigns every media file to its folder
//! event, then gathers, classifies and reconciles its records and dispatches
//! the resulting writes. Per-item failures land in the [`RunReport`]; only an
//! unreachable target aborts the run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::classify::{classify, RoutingOptions};
use crate::config::{MediaKind, MigrationConfig};
use crate::embed::MetadataWriter;
use crate::events::{EventNamer, EventRegistry};
use crate::reconcile::{plan_writes, reconcile, Conflict, UnroutableItem, WriteOp, WriteOptions};
use crate::records::{from_binary_db, from_ini_entry, PhotoRecord, RecordContent, Source};
use crate::report::{EventSummary, RunReport};
use crate::sources::snapshot::RejectedEntry;
use crate::sources::{IniFolder, IniSource, SourceDb};
use crate::target::{TargetDb, TitleUpdate};
use crate::{MigrationError, Result};

/// Runs migrations over one or more source roots, sharing events and report
pub struct Migrator {
    config: MigrationConfig,
    namer: EventNamer,
    events: EventRegistry,
    ini_cache: HashMap<PathBuf, IniFolder>,
    report: RunReport,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}

impl Migrator {
    pub fn new(config: MigrationConfig) -> Self {
        let namer = EventNamer::from_config(&config.events);
        Self {
            config,
            namer,
            events: EventRegistry::new(),
            ini_cache: HashMap::new(),
            report: RunReport::new(),
        }
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    /// Snapshot entries whose paths could not be mapped are unroutable
    pub fn record_rejected(&mut self, rejected: &[RejectedEntry]) {
        for entry in rejected {
            self.report.record_unroutable(UnroutableItem {
                photo: PathBuf::from(&entry.path),
                source: Source::BinaryDb,
                content: RecordContent::Other {
                    key: "path".to_string(),
                    value: entry.path.clone(),
                },
                reason: entry.reason.clone(),
            });
        }
    }

    fn routing(&self, writer: &dyn MetadataWriter) -> RoutingOptions {
        let embedded = &self.config.embedded;
        RoutingOptions {
            embedded_video_tags: embedded.enabled && embedded.video_tags && writer.supports_video(),
        }
    }

    fn write_options(&self) -> WriteOptions {
        let embedded = &self.config.embedded;
        WriteOptions {
            embed_tags: embedded.enabled && embedded.write_tags,
            embed_titles: embedded.enabled && embedded.write_titles,
        }
    }

    /// Migrate every media file under `root`
    pub fn run(
        &mut self,
        root: &Path,
        source: &dyn SourceDb,
        ini: &dyn IniSource,
        target: &mut dyn TargetDb,
        writer: &mut dyn MetadataWriter,
    ) -> Result<()> {
        let root = root
            .canonicalize()
            .map_err(|e| MigrationError::Setup(format!("cannot open source root {:?}: {}", root, e)))?;
        info!("Migrating {:?}", root);

        let routing = self.routing(writer);
        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                    warn!("Cannot read {:?}: {}", path, e);
                    self.report.record_failure(&path, e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Some(media) = self.config.media.kind_of(path) else {
                continue;
            };

            let result = self.migrate_file(path, media, &routing, source, ini, target, writer);
            self.absorb(path, None, result)?;
        }

        Ok(())
    }

    /// Close out the run and hand back the report
    pub fn finish(mut self) -> RunReport {
        self.report.events = self
            .events
            .iter()
            .map(|e| EventSummary {
                title: e.title.clone(),
                photos: e.members.len(),
            })
            .collect();
        self.report.counts.events = self.events.len();
        self.report
    }

    /// Per-item errors go to the report; unreachable-target errors end the run.
    ///
    /// `item` names the single write that failed, so its payload survives
    /// in the report.
    fn absorb<T>(&mut self, path: &Path, item: Option<String>, result: Result<T>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_fatal() => {
                error!("Aborting at {:?}: {}", path, e);
                Err(match e {
                    MigrationError::Database(db) => MigrationError::Setup(format!("target database unusable: {}", db)),
                    other => other,
                })
            }
            Err(e) => {
                match item {
                    Some(item) => {
                        warn!("{:?}: {} not written: {}", path, item, e);
                        self.report.record_item_failure(path, item, e);
                    }
                    None => {
                        warn!("{:?}: {}", path, e);
                        self.report.record_failure(path, e);
                    }
                }
                Ok(None)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn migrate_file(
        &mut self,
        path: &Path,
        media: MediaKind,
        routing: &RoutingOptions,
        source: &dyn SourceDb,
        ini: &dyn IniSource,
        target: &mut dyn TargetDb,
        writer: &mut dyn MetadataWriter,
    ) -> Result<()> {
        debug!("Processing {:?}", path);
        match media {
            MediaKind::Photo => self.report.counts.photos_processed += 1,
            MediaKind::Video => self.report.counts.videos_processed += 1,
        }

        // A file Shotwell does not know still has its records reported below
        match self.namer.event_title(path) {
            Some(title) => {
                let result = self.assign_event(path, &title, target);
                self.absorb(path, Some(format!("event {:?}", title)), result)?;
            }
            None => self.report.record_failure(path, "no folder to name an event after"),
        }

        let records = self.gather(path, media, source, ini)?;
        let classified: Vec<_> = records
            .into_iter()
            .map(|record| {
                let class = classify(&record, routing);
                debug!("{} from {} -> {}", record.content, record.source, class.channel);
                (record, class)
            })
            .collect();

        let meta = reconcile(path, media, &classified);
        for conflict in &meta.conflicts {
            info!("Conflict on {:?}: {:?}", path, conflict);
            self.report.record_conflict(path, conflict.clone());
        }
        for item in &meta.unroutable {
            warn!("Unroutable on {:?}: {} ({})", path, item.content, item.reason);
            self.report.record_unroutable(item.clone());
        }

        for op in plan_writes(&meta, &self.write_options()) {
            let item = op.to_string();
            let result = self.apply(path, op, target, writer);
            self.absorb(path, Some(item), result)?;
        }
        Ok(())
    }

    fn assign_event(&mut self, path: &Path, title: &str, target: &mut dyn TargetDb) -> Result<()> {
        let (event, created) = self.events.get_or_create(title, |t| target.ensure_event(t))?;
        if created {
            info!("Event {:?} (id {}) for {:?}", event.title, event.id, path.parent().unwrap_or(path));
        }
        target.assign_photo_to_event(path, event.id)?;
        event.members.insert(path.to_path_buf());
        self.report.counts.event_assignments += 1;
        Ok(())
    }

    /// Records from the binary database first, then from the folder's INI file
    fn gather(
        &mut self,
        path: &Path,
        media: MediaKind,
        source: &dyn SourceDb,
        ini: &dyn IniSource,
    ) -> Result<Vec<PhotoRecord>> {
        let tags = source.list_photo_tags(path)?;
        let captions = source.list_photo_captions(path)?;
        let mut records = from_binary_db(path, media, tags, captions);

        let (Some(folder), Some(name)) = (path.parent(), path.file_name().and_then(|n| n.to_str())) else {
            return Ok(records);
        };

        if let Some(entry) = self.ini_folder(folder, ini).get(name).cloned() {
            let (ini_records, ignored) = from_ini_entry(path, media, &entry, &self.config.ratings);
            if !ignored.is_empty() {
                debug!("Ignoring keywords {:?} on {:?}", ignored, path);
                self.report.counts.ignored_keywords += ignored.len();
            }
            records.extend(ini_records);
        }
        Ok(records)
    }

    /// INI entries for `folder`, read once per run.
    ///
    /// An unreadable INI file is one failure; its folder's photos still get
    /// their binary database records.
    fn ini_folder(&mut self, folder: &Path, ini: &dyn IniSource) -> &IniFolder {
        if !self.ini_cache.contains_key(folder) {
            let entries = match ini.read_ini_for_folder(folder) {
                Ok(entries) => entries,
                Err(e) => {
                    let ini_path = folder.join(&self.config.source.ini_name);
                    warn!("Skipping {:?}: {}", ini_path, e);
                    self.report.record_failure(&ini_path, e);
                    IniFolder::new()
                }
            };
            self.ini_cache.insert(folder.to_path_buf(), entries);
        }
        &self.ini_cache[folder]
    }

    fn apply(
        &mut self,
        path: &Path,
        op: WriteOp,
        target: &mut dyn TargetDb,
        writer: &mut dyn MetadataWriter,
    ) -> Result<()> {
        match op {
            WriteOp::DbTag(tag) => {
                target.upsert_tag(path, &tag)?;
                self.report.counts.db_tags_written += 1;
            }
            WriteOp::DbCaption(text) => match target.upsert_caption(path, &text)? {
                TitleUpdate::Written | TitleUpdate::Unchanged => self.report.counts.captions_applied += 1,
                TitleUpdate::KeptExisting(existing) => self.report.record_conflict(
                    path,
                    Conflict::ExistingTitle {
                        kept: existing,
                        discarded: text,
                    },
                ),
            },
            WriteOp::DbRating(value) => {
                target.upsert_rating(path, value)?;
                self.report.counts.ratings_written += 1;
            }
            WriteOp::EmbedTags(tags) => {
                writer.write_tags(path, &tags)?;
                self.report.counts.embedded_tags_written += tags.len();
            }
            WriteOp::EmbedTitle(title) => {
                writer.write_title(path, &title)?;
                self.report.counts.titles_embedded += 1;
            }
            WriteOp::Report(item) => {
                info!("MANUAL {}\t{:?}\t{}", item.source, item.photo, item.content);
                self.report.record_manual(item);
            }
        }
        Ok(())
    }
}
