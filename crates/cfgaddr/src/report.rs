//! grouped report of resolved members
//!
//! Each entry lists its members in two sections:
//!
//! ```text
//! grp_web:
//!     IP:
//!     10.0.0.5/32
//!     DNS:
//!     example.com
//! ```
//!
//! A member is an IP literal if it parses as an address or a network with a prefix length or mask.
//! Everything else is a DNS name.
//! The domain syntax is not checked.
use crate::resolve::prefix_len;
use indexmap::IndexMap;
use ipnet::IpNet;
use serde::Serialize;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

const INDENT: &str = "    ";

/// Order-preserving mapping of entry name to its classified members
///
/// Entries without members are never part of a report.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct Report {
    entries: IndexMap<String, ReportEntry>,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dns: Vec<String>,
}

impl ReportEntry {
    /// Partition members into IP literals and DNS names, keeping their order
    pub fn classify(members: impl IntoIterator<Item = String>) -> Self {
        let (ip, dns): (Vec<_>, Vec<_>) = members.into_iter().partition(|member| is_ip_literal(member));
        Self { ip, dns }
    }

    pub fn is_empty(&self) -> bool {
        self.ip.is_empty() && self.dns.is_empty()
    }
}

impl Report {
    pub fn new(resolved: IndexMap<String, Vec<String>>) -> Self {
        let entries = resolved
            .into_iter()
            .map(|(name, members)| (name, ReportEntry::classify(members)))
            .filter(|(_, entry)| !entry.is_empty())
            .collect();

        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&ReportEntry> {
        self.entries.get(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &ReportEntry)> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Text payload
    ///
    /// Blank line between entries, no trailing whitespace except a final newline.
    /// An empty report renders as an empty string.
    pub fn render(&self) -> String {
        let mut lines = vec![];

        for (name, entry) in &self.entries {
            lines.push(format!("{name}:"));
            for (section, members) in [("IP", &entry.ip), ("DNS", &entry.dns)] {
                if members.is_empty() {
                    continue;
                }
                lines.push(format!("{INDENT}{section}:"));
                lines.extend(members.iter().map(|member| format!("{INDENT}{member}")));
            }
            lines.push(String::new());
        }

        if lines.is_empty() {
            return String::new();
        }

        let mut payload = lines.join("\n").trim_end().to_string();
        payload.push('\n');
        payload
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// `10.0.0.1`, `10.0.0.0/8`, `10.0.0.0/255.0.0.0`, `10.0.0.0/0.255.255.255`, `::1`, `2001:db8::/32`
pub fn is_ip_literal(member: &str) -> bool {
    if member.parse::<IpAddr>().is_ok() || member.parse::<IpNet>().is_ok() {
        return true;
    }

    // ipv4 with a netmask or host mask suffix
    let Some((address, mask)) = member.split_once('/') else {
        return false;
    };
    address.parse::<Ipv4Addr>().is_ok() && prefix_len(mask).is_some()
}

/// Default report file name for a block header
///
/// `config firewall addrgrp` with extension `txt` becomes `config_firewall_addrgrp_parsed.txt`
pub fn output_file_name(header: &str, extension: &str) -> String {
    format!("{}_parsed.{extension}", header.replace(' ', "_"))
}

/// Write a payload to `path`
pub fn persist(path: &Path, payload: &str) -> std::io::Result<()> {
    tracing::info!(path=%path.display(), bytes = payload.len(), "writing report");
    std::fs::write(path, payload)
}
