// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Record classification and channel routing

use serde::Serialize;
use std::fmt;

use crate::config::MediaKind;
use crate::records::{PhotoRecord, RecordContent, Source};

/// Highest star rating Shotwell understands
pub const MAX_RATING: i64 = 5;

/// What a record means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticKind {
    DescriptiveTag,
    Caption,
    Rating,
    Favorite,
    Unknown,
}

/// Where a record goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetChannel {
    DatabaseTag,
    DatabaseCaption,
    DatabaseRating,
    EmbeddedVideoTag,
    /// Printed for a human to act on
    Report,
    Unroutable(&'static str),
}

impl TargetChannel {
    pub fn is_routable(self) -> bool {
        !matches!(self, TargetChannel::Unroutable(_))
    }
}

impl fmt::Display for TargetChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetChannel::DatabaseTag => write!(f, "database tag"),
            TargetChannel::DatabaseCaption => write!(f, "database caption"),
            TargetChannel::DatabaseRating => write!(f, "database rating"),
            TargetChannel::EmbeddedVideoTag => write!(f, "embedded video tag"),
            TargetChannel::Report => write!(f, "report"),
            TargetChannel::Unroutable(why) => write!(f, "unroutable ({})", why),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub kind: SemanticKind,
    pub channel: TargetChannel,
}

/// Capabilities of the sinks that affect routing
#[derive(Debug, Clone, Copy, Default)]
pub struct RoutingOptions {
    /// The embedded writer can tag video files
    pub embedded_video_tags: bool,
}

impl Classification {
    fn new(kind: SemanticKind, channel: TargetChannel) -> Self {
        Self { kind, channel }
    }
}

/// Decide what a record is and which channel receives it
pub fn classify(record: &PhotoRecord, opts: &RoutingOptions) -> Classification {
    use SemanticKind as K;
    use TargetChannel as C;

    match (record.source, &record.content, record.media) {
        (Source::BinaryDb, RecordContent::Tag(_), _) => Classification::new(K::DescriptiveTag, C::DatabaseTag),
        (Source::BinaryDb, RecordContent::Caption(_), MediaKind::Photo) => {
            Classification::new(K::Caption, C::DatabaseCaption)
        }
        (Source::BinaryDb, RecordContent::Caption(_), MediaKind::Video) => Classification::new(
            K::Caption,
            C::Unroutable("video captions live in Picasa's undecodable video store"),
        ),
        (Source::IniFile, RecordContent::Rating(v), _) if (0..=MAX_RATING).contains(v) => {
            Classification::new(K::Rating, C::DatabaseRating)
        }
        (Source::IniFile, RecordContent::Rating(_), _) => {
            Classification::new(K::Rating, C::Unroutable("rating outside 0-5"))
        }
        (Source::IniFile, RecordContent::Tag(_), MediaKind::Photo) => {
            Classification::new(K::DescriptiveTag, C::Report)
        }
        (Source::IniFile, RecordContent::Tag(_), MediaKind::Video) => {
            let channel = if opts.embedded_video_tags { C::EmbeddedVideoTag } else { C::Report };
            Classification::new(K::DescriptiveTag, channel)
        }
        (Source::IniFile, RecordContent::Caption(_), _) => Classification::new(K::Caption, C::DatabaseCaption),
        (Source::IniFile, RecordContent::Star, _) => Classification::new(K::Favorite, C::Report),
        (Source::BinaryDb, RecordContent::Rating(_), _) => {
            Classification::new(K::Rating, C::Unroutable("no rule for ratings from picasa-db"))
        }
        (Source::BinaryDb, RecordContent::Star, _) => {
            Classification::new(K::Favorite, C::Unroutable("no rule for stars from picasa-db"))
        }
        (_, RecordContent::Other { .. }, _) => Classification::new(K::Unknown, C::Unroutable("unrecognised field")),
    }
}
