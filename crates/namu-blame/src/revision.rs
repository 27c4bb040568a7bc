use std::iter;

use serde::{Deserialize, Serialize};
use similar::{Algorithm, DiffTag, capture_diff_slices};
use uuid::Uuid;

/// Consecutive lines owned by one revision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlameSegment {
    pub uuid: Uuid,
    pub count: usize,
}

/// A saved document revision with its line attribution.
///
/// The segment counts always add up to [`line_count`] of the content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub uuid: Uuid,
    pub content: String,
    pub blame: Vec<BlameSegment>,
}

impl Revision {
    /// First revision of a document: every line is its own.
    #[must_use]
    pub fn first(uuid: Uuid, content: impl Into<String>) -> Self {
        let content = content.into();
        let blame = attribute(None, "", &content, uuid);
        Self {
            uuid,
            content,
            blame,
        }
    }

    /// Revision that replaces this one's content.
    #[must_use]
    pub fn next(&self, uuid: Uuid, content: impl Into<String>) -> Self {
        let content = content.into();
        let blame = attribute(Some(self.blame.as_slice()), &self.content, &content, uuid);
        Self {
            uuid,
            content,
            blame,
        }
    }

    /// Owner of every line, in order.
    #[must_use]
    pub fn line_owners(&self) -> Vec<Uuid> {
        expand(&self.blame)
    }
}

/// Number of `\n`-separated lines. Empty content is one empty line.
#[must_use]
pub fn line_count(content: &str) -> usize {
    content.split('\n').count()
}

/// One owner per line.
#[must_use]
pub fn expand(blame: &[BlameSegment]) -> Vec<Uuid> {
    blame
        .iter()
        .flat_map(|segment| iter::repeat_n(segment.uuid, segment.count))
        .collect()
}

/// Run-length form of per-line owners. Inverse of [`expand`] for
/// attributions without empty or split runs.
#[must_use]
pub fn compress(owners: &[Uuid]) -> Vec<BlameSegment> {
    let mut blame: Vec<BlameSegment> = Vec::new();
    for &uuid in owners {
        match blame.last_mut() {
            Some(segment) if segment.uuid == uuid => segment.count += 1,
            _ => blame.push(BlameSegment { uuid, count: 1 }),
        }
    }
    blame
}

/// Attribution of `new_content`, saved as `new_id`, given the attribution
/// of `old_content`.
///
/// Without a previous attribution every line belongs to `new_id`. A
/// previous attribution that does not cover `old_content` line for line is
/// padded with its last owner or truncated before diffing.
#[must_use]
pub fn attribute(
    previous: Option<&[BlameSegment]>,
    old_content: &str,
    new_content: &str,
    new_id: Uuid,
) -> Vec<BlameSegment> {
    let new_lines: Vec<&str> = new_content.split('\n').collect();
    let Some(previous) = previous else {
        return vec![BlameSegment {
            uuid: new_id,
            count: new_lines.len(),
        }];
    };

    let old_lines: Vec<&str> = old_content.split('\n').collect();
    let mut owners = expand(previous);
    if owners.len() != old_lines.len() {
        tracing::warn!(
            lines = old_lines.len(),
            attributed = owners.len(),
            "Previous blame does not match its content, repairing"
        );
        let filler = owners.last().copied().unwrap_or(new_id);
        owners.resize(old_lines.len(), filler);
    }

    let mut result = Vec::with_capacity(new_lines.len());
    for op in capture_diff_slices(Algorithm::Myers, &old_lines, &new_lines) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => result.extend_from_slice(&owners[old_range]),
            DiffTag::Delete => {}
            DiffTag::Insert | DiffTag::Replace => {
                result.extend(iter::repeat_n(new_id, new_range.len()));
            }
        }
    }
    compress(&result)
}
