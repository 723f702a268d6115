//! target block capture and entry parsing
use crate::line::{quoted_values, Line};

/// Lines strictly inside the first `config` section whose trimmed header equals `header`
///
/// Nested `config`/`end` pairs are tracked with a flat depth counter and kept as opaque content.
/// Returns an empty list when the header is not found.
#[tracing::instrument(level = "debug", skip(lines))]
pub fn capture_block<'f>(lines: impl IntoIterator<Item = &'f str>, header: &str) -> Vec<&'f str> {
    let mut captured = vec![];
    let mut depth = 0usize;

    for raw in lines {
        let line = Line::classify(raw);

        if depth == 0 {
            if matches!(line, Line::Config(config) if config == header) {
                depth = 1;
            }
            continue;
        }

        match line {
            Line::Config(_) => depth += 1,
            Line::End => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }

        captured.push(raw);
    }

    tracing::debug!(lines = captured.len(), "block captured");
    captured
}

/// One `edit ... next` record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<'f> {
    pub name: &'f str,
    pub body: Vec<&'f str>,
}

impl<'f> Entry<'f> {
    /// Member tokens of all `set member` lines in order
    ///
    /// Quoted values are preferred. Lines without quotes are split on whitespace.
    pub fn members(&self) -> Vec<&'f str> {
        let mut members = vec![];

        for &raw in &self.body {
            let Line::SetMember(rest) = Line::classify(raw) else {
                continue;
            };

            let quoted: Vec<_> = quoted_values(rest).collect();
            if quoted.is_empty() {
                members.extend(rest.split_whitespace().map(|part| part.trim_matches('"')));
            } else {
                members.extend(quoted);
            }
        }

        members.retain(|member| !member.is_empty());
        members
    }
}

/// Split captured block lines into entries
///
/// Unlike [crate::registry::Registry] duplicate names are kept as separate entries.
/// A trailing entry without `next` is still emitted.
pub fn parse_entries<'f>(lines: &[&'f str]) -> Vec<Entry<'f>> {
    let mut entries = vec![];
    let mut open: Option<Entry<'f>> = None;

    for &raw in lines {
        match Line::classify(raw) {
            Line::Edit(name) => {
                entries.extend(open.take());
                open = Some(Entry { name, body: vec![] });
            }
            Line::Next => entries.extend(open.take()),
            _ => {
                if let Some(entry) = open.as_mut() {
                    entry.body.push(raw);
                }
            }
        }
    }

    entries.extend(open);
    entries
}

/// How members of a block are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// `... addrgrp` blocks, members are references to resolve
    AddressGroup,
    /// members are reported as written
    Other,
}

impl BlockKind {
    pub fn from_header(header: &str) -> Self {
        if header.ends_with("addrgrp") {
            BlockKind::AddressGroup
        } else {
            BlockKind::Other
        }
    }
}
