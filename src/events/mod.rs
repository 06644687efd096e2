// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Events derived from the folder structure

pub mod namer;

pub use namer::{is_event_folder, strip_date_prefix, EventNamer};

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::Result;

/// Identifier of an event in the target database
pub type EventId = i64;

/// A named grouping of photos
#[derive(Debug, Clone)]
pub struct Event {
    pub title: String,
    pub id: EventId,
    pub members: BTreeSet<PathBuf>,
}

/// Events seen during one run, keyed by case-folded title
#[derive(Debug, Default)]
pub struct EventRegistry {
    events: BTreeMap<String, Event>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(title: &str) -> String {
        title.to_lowercase()
    }

    /// Look up the event for `title`, calling `create` on first encounter.
    ///
    /// Returns the event and whether it was new to this registry.
    pub fn get_or_create<F>(&mut self, title: &str, create: F) -> Result<(&mut Event, bool)>
    where
        F: FnOnce(&str) -> Result<EventId>,
    {
        match self.events.entry(Self::key(title)) {
            Entry::Occupied(e) => Ok((e.into_mut(), false)),
            Entry::Vacant(v) => {
                let id = create(title)?;
                let event = v.insert(Event {
                    title: title.to_string(),
                    id,
                    members: BTreeSet::new(),
                });
                Ok((event, true))
            }
        }
    }

    /// Event a photo was assigned to, if any
    pub fn event_of(&self, photo: &Path) -> Option<&Event> {
        self.events.values().find(|e| e.members.contains(photo))
    }

    pub fn get(&self, title: &str) -> Option<&Event> {
        self.events.get(&Self::key(title))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All events, ordered by key
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.values()
    }
}
