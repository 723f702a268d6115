//! line classification
//!
//! The source grammar is line oriented. Every raw line is trimmed and then recognized as one of a few structural
//! tokens. Anything we do not care about is [Line::Other] and is treated as opaque body content.

/// Name used for `edit` lines that carry no name at all
pub const UNNAMED: &str = "<unnamed>";

/// A classified (trimmed) line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// `config <path>`, holds the full trimmed line
    Config(&'a str),
    /// `edit "<name>"` or `edit <name>`, holds the entry name
    Edit(&'a str),
    Next,
    End,
    /// `set member ...`, holds everything after the keyword
    SetMember(&'a str),
    /// `set fqdn ...`, holds everything after the keyword
    SetFqdn(&'a str),
    /// `set subnet ...`, holds everything after the keyword
    SetSubnet(&'a str),
    Other,
}

impl<'a> Line<'a> {
    pub fn classify(raw: &'a str) -> Self {
        let line = raw.trim();

        if line.starts_with("config ") {
            return Line::Config(line);
        }
        if let Some(rest) = line.strip_prefix("edit ") {
            return Line::Edit(entry_name(rest));
        }

        match line {
            "next" => return Line::Next,
            "end" => return Line::End,
            _ => {}
        }

        if let Some(rest) = line.strip_prefix("set member ") {
            Line::SetMember(rest.trim())
        } else if let Some(rest) = line.strip_prefix("set fqdn ") {
            Line::SetFqdn(rest.trim())
        } else if let Some(rest) = line.strip_prefix("set subnet ") {
            Line::SetSubnet(rest.trim())
        } else {
            Line::Other
        }
    }
}

/// Entry name from the remainder of an `edit` line
///
/// - `"name" ...` yields the first quoted value
/// - otherwise the unquoted remainder is used as-is
/// - empty names become [UNNAMED]
pub fn entry_name(rest: &str) -> &str {
    let rest = rest.trim();

    let name = match rest.strip_prefix('"') {
        Some(quoted) => match quoted.find('"') {
            Some(close) => &quoted[..close],
            // unterminated quote, keep the raw remainder
            None => rest,
        },
        None => rest,
    };

    if name.is_empty() {
        UNNAMED
    } else {
        name
    }
}

/// All values enclosed in double quotes
pub fn quoted_values(s: &str) -> impl Iterator<Item = &str> {
    // every odd segment sits between a pair of quotes
    let pairs = s.matches('"').count() / 2;
    s.split('"').skip(1).step_by(2).take(pairs)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classify_structural_lines() {
        assert_eq!(
            Line::classify("  config firewall addrgrp  "),
            Line::Config("config firewall addrgrp")
        );
        assert_eq!(Line::classify("\tnext"), Line::Next);
        assert_eq!(Line::classify("end   "), Line::End);
        assert_eq!(Line::classify("config"), Line::Other);
        assert_eq!(Line::classify("ending"), Line::Other);
        assert_eq!(Line::classify(""), Line::Other);
    }

    #[test]
    fn classify_set_lines() {
        assert_eq!(
            Line::classify(r#"    set member "a" "b""#),
            Line::SetMember(r#""a" "b""#)
        );
        assert_eq!(
            Line::classify(r#"set fqdn "example.com""#),
            Line::SetFqdn(r#""example.com""#)
        );
        assert_eq!(
            Line::classify("set subnet 10.0.0.0 255.0.0.0"),
            Line::SetSubnet("10.0.0.0 255.0.0.0")
        );
        // case sensitive
        assert_eq!(Line::classify("SET member a"), Line::Other);
        assert_eq!(Line::classify("set comment \"x\""), Line::Other);
    }

    #[test]
    fn edit_names() {
        assert_eq!(Line::classify(r#"edit "h-10.0.0.5""#), Line::Edit("h-10.0.0.5"));
        assert_eq!(Line::classify(r#"edit "grp" trailing"#), Line::Edit("grp"));
        assert_eq!(Line::classify("edit 42"), Line::Edit("42"));
        assert_eq!(Line::classify(r#"edit """#), Line::Edit(UNNAMED));
        assert_eq!(Line::classify(r#"edit "open"#), Line::Edit(r#""open"#));
        // trimmed to a bare keyword, so not an edit at all
        assert_eq!(Line::classify("edit    "), Line::Other);
    }

    #[test]
    fn quoted() {
        let values: Vec<_> = quoted_values(r#""a" "b c" x "" "d"#).collect();
        assert_eq!(values, vec!["a", "b c", ""]);
        assert_eq!(quoted_values("no quotes").count(), 0);
    }
}
