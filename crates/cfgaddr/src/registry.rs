//! whole-file index of named entries
//!
//! Every `edit` anywhere in the file is indexed by name, regardless of the `config` block it lives in.
//! Entry names are assumed to be unique across block types. When they are not, whichever entry is closed last wins.
use crate::line::Line;
use std::collections::HashMap;

/// Read-only mapping of entry name to its body lines
#[derive(Debug, Default)]
pub struct Registry<'f> {
    entries: HashMap<&'f str, Vec<&'f str>>,
}

impl<'f> Registry<'f> {
    /// Build the registry in a single pass
    ///
    /// - `edit` opens an entry (closing a still open one first)
    /// - `next` closes the open entry
    /// - any other line, `config` and `end` included, is appended to the open entry
    /// - an entry still open at the end of input is closed implicitly
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build(lines: impl IntoIterator<Item = &'f str>) -> Self {
        let mut entries = HashMap::new();
        let mut open: Option<(&'f str, Vec<&'f str>)> = None;

        for raw in lines {
            match Line::classify(raw) {
                Line::Edit(name) => {
                    if let Some((name, body)) = open.take() {
                        entries.insert(name, body);
                    }
                    open = Some((name, Vec::new()));
                }
                Line::Next => {
                    if let Some((name, body)) = open.take() {
                        entries.insert(name, body);
                    }
                }
                _ => {
                    if let Some((_, body)) = open.as_mut() {
                        body.push(raw);
                    }
                }
            }
        }

        if let Some((name, body)) = open {
            tracing::debug!(name, "closing entry at end of input");
            entries.insert(name, body);
        }

        tracing::debug!(entries = entries.len(), "registry built");
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&[&'f str]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All indexed names, sorted
    pub fn names(&self) -> Vec<&'f str> {
        let mut names: Vec<_> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
