// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Per-photo merge of classified records and the writes that follow from it

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::classify::{Classification, TargetChannel};
use crate::config::MediaKind;
use crate::records::{PhotoRecord, RecordContent, Source};

/// A tag that survived dedup, with the channel of its first occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutedTag {
    pub text: String,
    pub source: Source,
    pub channel: TargetChannel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourcedText {
    pub text: String,
    pub source: Source,
}

/// Sources disagreed; one value was applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum Conflict {
    Caption {
        kept: SourcedText,
        discarded: SourcedText,
        /// The discarded caption only differs in case or spacing
        duplicate: bool,
    },
    Rating {
        kept: u8,
        discarded: Vec<u8>,
    },
    /// The target already had a different title and it was left alone
    ExistingTitle {
        kept: String,
        discarded: String,
    },
}

/// A record that needs a human
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManualItem {
    pub photo: PathBuf,
    pub source: Source,
    pub content: String,
}

/// A record no rule could route, kept with its raw payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnroutableItem {
    pub photo: PathBuf,
    pub source: Source,
    pub content: RecordContent,
    pub reason: String,
}

/// Final state for one photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledMetadata {
    pub photo: PathBuf,
    pub media: MediaKind,
    pub caption: Option<SourcedText>,
    pub tags: Vec<RoutedTag>,
    pub rating: Option<u8>,
    pub conflicts: Vec<Conflict>,
    pub manual: Vec<ManualItem>,
    pub unroutable: Vec<UnroutableItem>,
}

/// Case- and whitespace-insensitive comparison key
pub fn normalize_key(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Merge every classified record for `photo` into one final state.
///
/// Tags are unioned with case/space-insensitive dedup, keeping the first
/// spelling. The best-ranked caption wins (first one on a tie) and every
/// differing loser is a conflict. The highest rating wins.
pub fn reconcile(
    photo: &Path,
    media: MediaKind,
    records: &[(PhotoRecord, Classification)],
) -> ReconciledMetadata {
    let mut meta = ReconciledMetadata {
        photo: photo.to_path_buf(),
        media,
        caption: None,
        tags: Vec::new(),
        rating: None,
        conflicts: Vec::new(),
        manual: Vec::new(),
        unroutable: Vec::new(),
    };

    let mut seen_tags = HashSet::new();
    let mut captions: Vec<SourcedText> = Vec::new();
    let mut ratings: Vec<u8> = Vec::new();

    for (record, class) in records {
        if let TargetChannel::Unroutable(reason) = class.channel {
            meta.unroutable.push(UnroutableItem {
                photo: record.photo.clone(),
                source: record.source,
                content: record.content.clone(),
                reason: reason.to_string(),
            });
            continue;
        }

        match &record.content {
            RecordContent::Tag(text) => {
                let text = collapse_whitespace(text);
                if text.is_empty() || !seen_tags.insert(normalize_key(&text)) {
                    continue;
                }
                meta.tags.push(RoutedTag {
                    text,
                    source: record.source,
                    channel: class.channel,
                });
            }
            RecordContent::Caption(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    captions.push(SourcedText {
                        text: text.to_string(),
                        source: record.source,
                    });
                }
            }
            RecordContent::Rating(value) => match u8::try_from(*value) {
                Ok(v) => ratings.push(v),
                Err(_) => meta.unroutable.push(UnroutableItem {
                    photo: record.photo.clone(),
                    source: record.source,
                    content: record.content.clone(),
                    reason: "rating does not fit the target range".to_string(),
                }),
            },
            RecordContent::Star | RecordContent::Other { .. } => meta.manual.push(ManualItem {
                photo: record.photo.clone(),
                source: record.source,
                content: record.content.to_string(),
            }),
        }
    }

    meta.caption = pick_caption(captions, &mut meta.conflicts);
    meta.rating = pick_rating(&ratings, &mut meta.conflicts);
    meta
}

fn pick_caption(captions: Vec<SourcedText>, conflicts: &mut Vec<Conflict>) -> Option<SourcedText> {
    let winner_idx = captions
        .iter()
        .enumerate()
        .fold(None, |best: Option<usize>, (i, c)| match best {
            Some(b) if captions[b].source.rank() >= c.source.rank() => Some(b),
            _ => Some(i),
        })?;

    let mut captions = captions;
    let winner = captions.remove(winner_idx);
    let winner_key = normalize_key(&winner.text);

    for loser in captions {
        if loser.text == winner.text {
            continue;
        }
        let duplicate = normalize_key(&loser.text) == winner_key;
        conflicts.push(Conflict::Caption {
            kept: winner.clone(),
            discarded: loser,
            duplicate,
        });
    }

    Some(winner)
}

fn pick_rating(ratings: &[u8], conflicts: &mut Vec<Conflict>) -> Option<u8> {
    let best = ratings.iter().copied().max()?;
    let mut discarded: Vec<u8> = ratings.iter().copied().filter(|r| *r != best).collect();
    discarded.sort_unstable();
    discarded.dedup();
    if !discarded.is_empty() {
        conflicts.push(Conflict::Rating { kept: best, discarded });
    }
    Some(best)
}

/// Which optional embedded writes to perform
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Burn database tags into the file as well
    pub embed_tags: bool,
    /// Burn the winning caption into the file title as well
    pub embed_titles: bool,
}

/// One operation against a sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    DbTag(String),
    DbCaption(String),
    DbRating(u8),
    EmbedTags(Vec<String>),
    EmbedTitle(String),
    Report(ManualItem),
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteOp::DbTag(tag) => write!(f, "database tag {:?}", tag),
            WriteOp::DbCaption(text) => write!(f, "database caption {:?}", text),
            WriteOp::DbRating(value) => write!(f, "database rating {}", value),
            WriteOp::EmbedTags(tags) => write!(f, "embedded tags {:?}", tags),
            WriteOp::EmbedTitle(title) => write!(f, "embedded title {:?}", title),
            WriteOp::Report(item) => write!(f, "report {}", item.content),
        }
    }
}

/// Turn a reconciled state into ordered sink operations.
///
/// Database and embedded writes are independent: a database tag is also
/// embedded when `embed_tags` is set.
pub fn plan_writes(meta: &ReconciledMetadata, opts: &WriteOptions) -> Vec<WriteOp> {
    let mut ops = Vec::new();
    let mut embedded = Vec::new();
    let mut reported = Vec::new();

    for tag in &meta.tags {
        match tag.channel {
            TargetChannel::DatabaseTag => {
                ops.push(WriteOp::DbTag(tag.text.clone()));
                if opts.embed_tags {
                    embedded.push(tag.text.clone());
                }
            }
            TargetChannel::EmbeddedVideoTag => embedded.push(tag.text.clone()),
            _ => reported.push(ManualItem {
                photo: meta.photo.clone(),
                source: tag.source,
                content: format!("tag {:?}", tag.text),
            }),
        }
    }

    if let Some(caption) = &meta.caption {
        ops.push(WriteOp::DbCaption(caption.text.clone()));
    }
    if let Some(rating) = meta.rating {
        ops.push(WriteOp::DbRating(rating));
    }
    if !embedded.is_empty() {
        ops.push(WriteOp::EmbedTags(embedded));
    }
    if let (true, Some(caption)) = (opts.embed_titles, &meta.caption) {
        ops.push(WriteOp::EmbedTitle(caption.text.clone()));
    }

    ops.extend(reported.into_iter().map(WriteOp::Report));
    ops.extend(meta.manual.iter().cloned().map(WriteOp::Report));
    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, RoutingOptions};

    const PHOTO: &str = "/p/a.jpg";

    fn classified(media: MediaKind, items: Vec<(Source, RecordContent)>) -> Vec<(PhotoRecord, Classification)> {
        let opts = RoutingOptions { embedded_video_tags: true };
        items
            .into_iter()
            .map(|(source, content)| {
                let record = PhotoRecord::new(Path::new(PHOTO), media, source, content);
                let class = classify(&record, &opts);
                (record, class)
            })
            .collect()
    }

    fn run(items: Vec<(Source, RecordContent)>) -> ReconciledMetadata {
        reconcile(Path::new(PHOTO), MediaKind::Photo, &classified(MediaKind::Photo, items))
    }

    fn tag(s: &str) -> RecordContent {
        RecordContent::Tag(s.to_string())
    }

    fn caption(s: &str) -> RecordContent {
        RecordContent::Caption(s.to_string())
    }

    #[test]
    fn test_rating_and_tag_from_different_sources() {
        let meta = run(vec![
            (Source::BinaryDb, tag("sunset")),
            (Source::IniFile, RecordContent::Rating(4)),
        ]);
        assert_eq!(meta.tags.len(), 1);
        assert_eq!(meta.tags[0].text, "sunset");
        assert_eq!(meta.rating, Some(4));
        assert!(meta.conflicts.is_empty());

        let ops = plan_writes(&meta, &WriteOptions::default());
        assert!(ops.contains(&WriteOp::DbTag("sunset".to_string())));
        assert!(ops.contains(&WriteOp::DbRating(4)));
    }

    #[test]
    fn test_tags_dedup_case_and_whitespace() {
        let meta = run(vec![
            (Source::BinaryDb, tag("Summer  Camp")),
            (Source::BinaryDb, tag("lake")),
            (Source::IniFile, tag("summer camp")),
            (Source::IniFile, tag(" LAKE ")),
            (Source::IniFile, tag("canoe")),
        ]);
        let texts: Vec<_> = meta.tags.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Summer Camp", "lake", "canoe"]);
        // First occurrence decides the channel
        assert_eq!(meta.tags[0].channel, TargetChannel::DatabaseTag);
        assert_eq!(meta.tags[2].channel, TargetChannel::Report);
    }

    #[test]
    fn test_binary_caption_beats_ini_duplicate() {
        let meta = run(vec![
            (Source::IniFile, caption("beach day")),
            (Source::BinaryDb, caption("Beach Day")),
        ]);
        assert_eq!(meta.caption.as_ref().map(|c| c.text.as_str()), Some("Beach Day"));
        assert_eq!(meta.conflicts.len(), 1);
        match &meta.conflicts[0] {
            Conflict::Caption { kept, discarded, duplicate } => {
                assert_eq!(kept.source, Source::BinaryDb);
                assert_eq!(discarded.text, "beach day");
                assert!(*duplicate);
            }
            other => panic!("unexpected conflict {:?}", other),
        }
    }

    #[test]
    fn test_identical_captions_do_not_conflict() {
        let meta = run(vec![
            (Source::BinaryDb, caption("Beach Day")),
            (Source::IniFile, caption("Beach Day")),
        ]);
        assert!(meta.conflicts.is_empty());
    }

    #[test]
    fn test_first_caption_wins_within_a_rank() {
        let meta = run(vec![
            (Source::BinaryDb, caption("First")),
            (Source::BinaryDb, caption("Second")),
        ]);
        assert_eq!(meta.caption.map(|c| c.text), Some("First".to_string()));
        assert!(matches!(&meta.conflicts[0], Conflict::Caption { duplicate: false, .. }));
    }

    #[test]
    fn test_no_caption_means_no_caption_write() {
        let meta = run(vec![(Source::BinaryDb, tag("sunset")), (Source::IniFile, caption("   "))]);
        assert!(meta.caption.is_none());
        let ops = plan_writes(&meta, &WriteOptions { embed_tags: true, embed_titles: true });
        assert!(!ops.iter().any(|op| matches!(op, WriteOp::DbCaption(_) | WriteOp::EmbedTitle(_))));
    }

    #[test]
    fn test_highest_rating_wins() {
        let meta = run(vec![
            (Source::IniFile, RecordContent::Rating(3)),
            (Source::IniFile, RecordContent::Rating(5)),
            (Source::IniFile, RecordContent::Rating(3)),
        ]);
        assert_eq!(meta.rating, Some(5));
        assert_eq!(meta.conflicts, vec![Conflict::Rating { kept: 5, discarded: vec![3] }]);
    }

    #[test]
    fn test_single_rating_unchanged() {
        for value in 0..=5 {
            let meta = run(vec![(Source::IniFile, RecordContent::Rating(value))]);
            assert_eq!(meta.rating, Some(value as u8));
            assert!(meta.conflicts.is_empty());
        }
    }

    #[test]
    fn test_ini_tag_goes_to_report_only() {
        let meta = run(vec![(Source::IniFile, tag("starred"))]);
        let ops = plan_writes(&meta, &WriteOptions { embed_tags: true, embed_titles: true });
        assert_eq!(ops.len(), 1);
        match &ops[0] {
            WriteOp::Report(item) => assert!(item.content.contains("starred")),
            other => panic!("unexpected op {:?}", other),
        }
    }

    #[test]
    fn test_unroutable_records_are_kept() {
        let meta = reconcile(
            Path::new(PHOTO),
            MediaKind::Video,
            &classified(MediaKind::Video, vec![(Source::BinaryDb, caption("Legoland trip"))]),
        );
        assert!(meta.caption.is_none());
        assert_eq!(meta.unroutable.len(), 1);
        assert_eq!(meta.unroutable[0].content, caption("Legoland trip"));
        assert!(plan_writes(&meta, &WriteOptions::default()).is_empty());
    }

    #[test]
    fn test_embedded_writes_follow_options() {
        let meta = reconcile(
            Path::new(PHOTO),
            MediaKind::Video,
            &classified(
                MediaKind::Video,
                vec![(Source::BinaryDb, tag("lego")), (Source::IniFile, tag("legoland"))],
            ),
        );

        let plain = plan_writes(&meta, &WriteOptions::default());
        assert_eq!(
            plain,
            vec![WriteOp::DbTag("lego".to_string()), WriteOp::EmbedTags(vec!["legoland".to_string()])]
        );

        let both = plan_writes(&meta, &WriteOptions { embed_tags: true, embed_titles: false });
        assert!(both.contains(&WriteOp::EmbedTags(vec!["lego".to_string(), "legoland".to_string()])));
    }

    #[test]
    fn test_star_is_manual() {
        let meta = run(vec![(Source::IniFile, RecordContent::Star)]);
        assert_eq!(meta.manual.len(), 1);
        assert!(meta.rating.is_none());
    }

    #[test]
    fn test_write_op_names_its_payload() {
        assert_eq!(WriteOp::DbTag("grandma".to_string()).to_string(), "database tag \"grandma\"");
        assert_eq!(WriteOp::DbRating(4).to_string(), "database rating 4");
        assert_eq!(
            WriteOp::EmbedTags(vec!["legoland".to_string()]).to_string(),
            "embedded tags [\"legoland\"]"
        );
    }
}
