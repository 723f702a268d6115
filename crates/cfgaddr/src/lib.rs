//! # cfgaddr - address group member resolution
//!
//! Extracts the members of address groups from block/entry configuration dumps and resolves them to networks
//! or domain names.
//!
//! ## Introduction for developers
//!
//! ### Source grammar
//!
//! The input is line oriented, indentation carries no meaning:
//! - `config <path>` opens a block, `end` closes it
//! - blocks contain entries: `edit "<name>"` ... `next`
//! - entries contain statements: `set <key> <value>...`
//! - blocks may nest inside entries
//!
//! ```text
//! config firewall address
//!     edit "h-10.0.0.5"
//!         set subnet 10.0.0.5 255.255.255.255
//!     next
//!     edit "AC_Server1"
//!         set type fqdn
//!         set fqdn "server1.internal"
//!     next
//! end
//! config firewall addrgrp
//!     edit "grp_web"
//!         set member "h-10.0.0.5" "AC_Server1" "Internet_example.com"
//!     next
//! end
//! ```
//!
//! Only a handful of lines are understood, see [line::Line]. Everything else is opaque.
//!
//! ### Pipeline
//!
//! see [extract]
//!
//! 1. [registry::Registry::build] indexes every entry of the whole file by name. Block boundaries are ignored.
//! 2. [block::capture_block] isolates the lines of the requested block.
//! 3. [block::parse_entries] splits those lines into [block::Entry]s.
//! 4. [resolve::Resolver] reduces each `set member` token to an `ip/prefixlen` or a domain, looking up referenced
//!    objects in the registry. Only address group blocks are resolved, see [block::BlockKind].
//! 5. [report::Report] splits each entry's members into IP and DNS sections.
//!
//! For the example above `grp_web` resolves to `10.0.0.5/32`, `server1.internal` and `example.com`.
//!
//! ### Output
//!
//! [report::Report::render] produces the text payload. The report also serializes via [serde].
//!
pub mod block;
pub mod config_file;
pub mod line;
pub mod registry;
pub mod report;
pub mod resolve;

use block::BlockKind;
use config_file::ConfigFile;
use indexmap::IndexMap;
use registry::Registry;
use report::Report;
use resolve::Resolver;

/// Extraction ended without anything to report
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Block not found or empty: {header}")]
    EmptyBlock { header: String },
    #[error("No set member found in block: {header}")]
    EmptyResolution { header: String },
}

/// Resolve the members of every entry of block `header`
#[tracing::instrument(level = "debug", skip(file))]
pub fn extract(file: &ConfigFile, header: &str) -> Result<Report, ExtractError> {
    let registry = Registry::build(file.lines());

    let block = block::capture_block(file.lines(), header);
    if block.is_empty() {
        return Err(ExtractError::EmptyBlock {
            header: header.to_string(),
        });
    }

    let kind = BlockKind::from_header(header);
    let resolver = Resolver::new(&registry);

    let mut resolved: IndexMap<String, Vec<String>> = IndexMap::new();
    for entry in block::parse_entries(&block) {
        let members = entry.members();
        let members = match kind {
            BlockKind::AddressGroup => resolver.resolve_all(&members),
            BlockKind::Other => members.into_iter().map(str::to_string).collect(),
        };

        tracing::debug!(entry = entry.name, members = members.len(), "entry processed");
        // duplicate names keep their first position, last one wins
        resolved.insert(entry.name.to_string(), members);
    }

    let report = Report::new(resolved);
    if report.is_empty() {
        return Err(ExtractError::EmptyResolution {
            header: header.to_string(),
        });
    }

    tracing::info!(
        source = ?file.source(),
        entries = report.len(),
        ?kind,
        "extraction finished"
    );
    Ok(report)
}
