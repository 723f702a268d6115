//! Snapshot tests
//!
//! Loads each *.conf file in /tests/ individually and compares if the
//! rendered report for `config firewall addrgrp` changes.

#[test]
fn snapshots() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("CFGADDR_LOG"))
        .with_writer(std::io::stderr)
        .init();

    insta::glob!("*.conf", |path| {
        let file = cfgaddr::config_file::ConfigFile::load_file(path).expect("fixture must load");

        let rendered = cfgaddr::extract(&file, "config firewall addrgrp")
            .map(|report| report.render())
            .unwrap_or_else(|outcome| outcome.to_string());

        insta::assert_snapshot!(rendered);
    });
}
