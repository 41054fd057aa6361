//! Anchor merge engine: decides how a fragment lands in a target file.
//!
//! # Design
//!
//! `merge` is a pure function of the file's current text, the fragment and an
//! ordered list of strategies. Guards (`SkipIfLocked`, `SkipIfContains`) are
//! evaluated first, lock before marker; the first placement strategy then
//! produces the new text. Missing anchors never fail: they degrade to an
//! append, reported as [`WriteAction::Appended`] so the caller can warn.
//!
//! There is no parse tree. Every decision is a line or substring match, so
//! the guarantees only hold for files that follow the generated layout.

use std::fmt;

/// Inserting this token anywhere in a file opts it out of further merges.
pub const LOCK_SENTINEL: &str = "#FileLocked";

/// Whether `text` carries the lock sentinel.
pub fn is_locked_text(text: &str) -> bool {
    text.contains(LOCK_SENTINEL)
}

// ── Strategies ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeRule {
    /// Merge symbols into the comma-joined list on the anchor line.
    JoinList,
    /// Insert the fragment as new lines right after the anchor line.
    InsertBlock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorStrategy {
    /// Write only when the file is absent.
    CreateOnly,
    /// Guard: skip when the marker text is already present.
    SkipIfContains(String),
    /// Guard: skip when the file carries [`LOCK_SENTINEL`].
    SkipIfLocked,
    /// Place relative to the first line whose trimmed text starts with `prefix`.
    InsertAfterLinePrefix { prefix: String, rule: MergeRule },
    /// Add at the end, after a blank line.
    AppendToFile,
    /// Overwrite the whole file.
    Replace,
    /// Substitute the first occurrence of a marker comment.
    ReplaceMarker(String),
}

impl AnchorStrategy {
    pub fn skip_if_contains(marker: impl Into<String>) -> Self {
        Self::SkipIfContains(marker.into())
    }

    pub fn join_list(prefix: impl Into<String>) -> Self {
        Self::InsertAfterLinePrefix {
            prefix: prefix.into(),
            rule: MergeRule::JoinList,
        }
    }

    pub fn insert_block(prefix: impl Into<String>) -> Self {
        Self::InsertAfterLinePrefix {
            prefix: prefix.into(),
            rule: MergeRule::InsertBlock,
        }
    }

    pub fn replace_marker(marker: impl Into<String>) -> Self {
        Self::ReplaceMarker(marker.into())
    }

    pub const fn is_guard(&self) -> bool {
        matches!(self, Self::SkipIfContains(_) | Self::SkipIfLocked)
    }
}

impl fmt::Display for AnchorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateOnly => f.write_str("create-only"),
            Self::SkipIfContains(m) => write!(f, "skip-if-contains({m})"),
            Self::SkipIfLocked => f.write_str("skip-if-locked"),
            Self::InsertAfterLinePrefix { prefix, rule } => {
                let rule = match rule {
                    MergeRule::JoinList => "join-list",
                    MergeRule::InsertBlock => "insert-block",
                };
                write!(f, "{rule}({prefix})")
            }
            Self::AppendToFile => f.write_str("append"),
            Self::Replace => f.write_str("replace"),
            Self::ReplaceMarker(m) => write!(f, "replace-marker({m})"),
        }
    }
}

// ── Outcomes ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAction {
    /// The file did not exist.
    Created,
    /// Spliced at its anchor, or appended on request.
    Merged,
    /// Anchor missing; appended instead.
    Appended,
    /// Whole-file regeneration of an existing file.
    Replaced,
}

impl WriteAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Merged => "merged",
            Self::Appended => "appended",
            Self::Replaced => "replaced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Locked,
    AlreadyPresent(String),
    /// `CreateOnly` target already exists.
    Exists,
    /// The merge would not change a byte.
    Unchanged,
    /// Nothing to merge into: the target is absent.
    NoTarget,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => f.write_str("locked"),
            Self::AlreadyPresent(marker) => write!(f, "already contains '{marker}'"),
            Self::Exists => f.write_str("already exists"),
            Self::Unchanged => f.write_str("unchanged"),
            Self::NoTarget => f.write_str("target file is missing"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Write { text: String, action: WriteAction },
    Skip(SkipReason),
}

impl MergeOutcome {
    fn write(text: String, action: WriteAction) -> Self {
        Self::Write { text, action }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Write { text, .. } => Some(text),
            Self::Skip(_) => None,
        }
    }
}

// ── Engine ───────────────────────────────────────────────────────────────────

pub struct AnchorMergeEngine;

impl AnchorMergeEngine {
    /// Compute the new text of a file.
    ///
    /// `current` is `None` when the file does not exist. Without a placement
    /// strategy the fragment is appended.
    pub fn merge(current: Option<&str>, fragment: &str, strategies: &[AnchorStrategy]) -> MergeOutcome {
        if let Some(text) = current {
            if strategies.contains(&AnchorStrategy::SkipIfLocked) && is_locked_text(text) {
                return MergeOutcome::Skip(SkipReason::Locked);
            }
            for strategy in strategies {
                if let AnchorStrategy::SkipIfContains(marker) = strategy {
                    if text.contains(marker.as_str()) {
                        return MergeOutcome::Skip(SkipReason::AlreadyPresent(marker.clone()));
                    }
                }
            }
        }

        let placement = strategies
            .iter()
            .find(|s| !s.is_guard())
            .unwrap_or(&AnchorStrategy::AppendToFile);

        let Some(text) = current else {
            return match placement {
                AnchorStrategy::ReplaceMarker(_) => MergeOutcome::Skip(SkipReason::NoTarget),
                _ => MergeOutcome::write(with_newline(fragment), WriteAction::Created),
            };
        };

        let outcome = match placement {
            AnchorStrategy::CreateOnly => return MergeOutcome::Skip(SkipReason::Exists),
            AnchorStrategy::InsertAfterLinePrefix { prefix, rule } => match rule {
                MergeRule::JoinList => join_list(text, fragment, prefix),
                MergeRule::InsertBlock => insert_block(text, fragment, prefix),
            },
            AnchorStrategy::AppendToFile
            | AnchorStrategy::SkipIfContains(_)
            | AnchorStrategy::SkipIfLocked => append(text, fragment, WriteAction::Merged),
            AnchorStrategy::Replace => {
                MergeOutcome::write(with_newline(fragment), WriteAction::Replaced)
            }
            AnchorStrategy::ReplaceMarker(marker) => {
                if !text.contains(marker.as_str()) {
                    return MergeOutcome::Skip(SkipReason::AlreadyPresent(marker.clone()));
                }
                MergeOutcome::write(text.replacen(marker.as_str(), fragment, 1), WriteAction::Merged)
            }
        };

        match outcome {
            MergeOutcome::Write { text: new, .. } if new == text => {
                MergeOutcome::Skip(SkipReason::Unchanged)
            }
            other => other,
        }
    }
}

fn with_newline(s: &str) -> String {
    let mut out = s.trim_end_matches('\n').to_string();
    out.push('\n');
    out
}

fn append(current: &str, fragment: &str, action: WriteAction) -> MergeOutcome {
    if current.trim().is_empty() {
        return MergeOutcome::write(with_newline(fragment), action);
    }
    let mut out = current.trim_end_matches('\n').to_string();
    out.push_str("\n\n");
    out.push_str(fragment.trim_matches('\n'));
    out.push('\n');
    MergeOutcome::write(out, action)
}

fn find_anchor(lines: &[&str], prefix: &str) -> Option<usize> {
    lines.iter().position(|l| l.trim_start().starts_with(prefix))
}

fn rejoin(current: &str, lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    if current.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Symbols after `prefix` on one line: `from .models import A, B` → `[A, B]`.
fn symbols_after<'a>(line: &'a str, prefix: &str) -> Vec<&'a str> {
    line.trim_start()
        .get(prefix.len()..)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn join_list(current: &str, fragment: &str, prefix: &str) -> MergeOutcome {
    let lines: Vec<&str> = current.lines().collect();
    let Some(index) = find_anchor(&lines, prefix) else {
        return append(current, fragment, WriteAction::Appended);
    };

    // The fragment contributes the symbols of its own prefixed line, or the
    // whole fragment when it is a bare symbol list.
    let incoming: Vec<&str> = match fragment.lines().find(|l| l.trim_start().starts_with(prefix)) {
        Some(line) => symbols_after(line, prefix),
        None => fragment
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect(),
    };

    let anchor = lines[index];
    let mut listed = symbols_after(anchor, prefix);
    for symbol in incoming {
        if !listed.contains(&symbol) {
            listed.push(symbol);
        }
    }

    let indent = &anchor[..anchor.len() - anchor.trim_start().len()];
    let rewritten = format!("{indent}{prefix} {}", listed.join(", "));

    let mut out: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
    out[index] = rewritten;
    MergeOutcome::write(rejoin(current, out), WriteAction::Merged)
}

fn insert_block(current: &str, fragment: &str, prefix: &str) -> MergeOutcome {
    let lines: Vec<&str> = current.lines().collect();
    let Some(index) = find_anchor(&lines, prefix) else {
        return append(current, fragment, WriteAction::Appended);
    };

    let mut out: Vec<String> = Vec::with_capacity(lines.len() + fragment.lines().count());
    out.extend(lines[..=index].iter().map(|l| l.to_string()));
    out.extend(fragment.trim_matches('\n').lines().map(str::to_string));
    out.extend(lines[index + 1..].iter().map(|l| l.to_string()));
    MergeOutcome::write(rejoin(current, out), WriteAction::Merged)
}
