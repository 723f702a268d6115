//! member resolution
//!
//! Each member token of an address group names another object. We try to reduce it to something useful:
//! an `ip/prefixlen` network or a domain name. Which lookups are tried depends on the shape of the token,
//! see [Rule].
//!
//! Resolution only ever reads the [Registry]. Tokens are independent of each other.
use crate::line::{quoted_values, Line};
use crate::registry::Registry;
use std::net::Ipv4Addr;

/// Resolution rules, tried in [Rule::ORDER]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// `h-<dotted quad>` host objects
    ///
    /// registry subnet, else the embedded address as `/32`
    Host,
    /// anything containing a `.`
    ///
    /// registry fqdn, else registry subnet, else a domain guessed from the name
    DottedName,
    /// everything else
    ///
    /// registry subnet, else registry fqdn, else the token itself
    Generic,
}

impl Rule {
    pub const ORDER: [Rule; 3] = [Rule::Host, Rule::DottedName, Rule::Generic];

    /// First rule in [Rule::ORDER] that matches
    pub fn for_token(token: &str) -> Rule {
        Self::ORDER
            .into_iter()
            .find(|rule| rule.matches(token))
            .unwrap_or(Rule::Generic)
    }

    pub fn matches(self, token: &str) -> bool {
        match self {
            Rule::Host => host_address(token).is_some(),
            Rule::DottedName => token.contains('.'),
            Rule::Generic => true,
        }
    }

    /// Resolve `token` under this rule
    ///
    /// Never fails, every branch has a fallback value.
    pub fn resolve(self, token: &str, registry: &Registry) -> String {
        let body = registry.get(token).unwrap_or_default();

        match self {
            Rule::Host => find_subnet(body).unwrap_or_else(|| {
                let address = host_address(token).unwrap_or(token);
                format!("{address}/32")
            }),
            Rule::DottedName => find_fqdn(body)
                .map(str::to_string)
                .or_else(|| find_subnet(body))
                .unwrap_or_else(|| domain_fallback(token).to_string()),
            Rule::Generic => find_subnet(body)
                .or_else(|| find_fqdn(body).map(str::to_string))
                .unwrap_or_else(|| token.to_string()),
        }
    }
}

/// Resolves member tokens against a [Registry]
#[derive(derive_new::new, Debug)]
pub struct Resolver<'r, 'f> {
    registry: &'r Registry<'f>,
}

impl<'r, 'f> Resolver<'r, 'f> {
    pub fn resolve(&self, token: &str) -> String {
        let rule = Rule::for_token(token);
        let resolved = rule.resolve(token, self.registry);
        tracing::trace!(token, ?rule, %resolved, "member resolved");
        resolved
    }

    /// Resolve tokens, keeping their order
    pub fn resolve_all(&self, tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|token| self.resolve(token)).collect()
    }
}

/// The address embedded in a `h-<a>.<b>.<c>.<d>` token
///
/// Each group is 1-3 ascii digits. The value range is not checked.
fn host_address(token: &str) -> Option<&str> {
    let address = token.strip_prefix("h-")?;

    let mut groups = 0;
    for group in address.split('.') {
        let valid = (1..=3).contains(&group.len()) && group.bytes().all(|b| b.is_ascii_digit());
        if !valid {
            return None;
        }
        groups += 1;
    }

    (groups == 4).then_some(address)
}

/// Degraded domain for dotted names without a registry entry
///
/// A `<prefix>_` in front of the first `.` is dropped: `Internet_example.com` becomes `example.com`.
/// Otherwise everything after the first `.` is used: `web.example.com` becomes `example.com`.
/// Tokens with nothing left are kept whole. The result is not validated.
fn domain_fallback(token: &str) -> &str {
    let Some((label, rest)) = token.split_once('.') else {
        return token;
    };

    if let Some(underscore) = label.rfind('_') {
        let domain = &token[underscore + 1..];
        if !domain.starts_with('.') {
            return domain;
        }
    }

    if rest.is_empty() {
        token
    } else {
        rest
    }
}

/// First `set subnet <ip> <mask>` of an entry body as `ip/prefixlen`
///
/// `set subnet` lines with fewer than two values are skipped.
/// An unparsable ip or mask yields the raw ip.
pub fn find_subnet(body: &[&str]) -> Option<String> {
    body.iter().find_map(|raw| {
        let Line::SetSubnet(rest) = Line::classify(raw) else {
            return None;
        };

        let mut parts = rest.split_whitespace();
        let (Some(ip), Some(mask)) = (parts.next(), parts.next()) else {
            return None;
        };

        Some(subnet_to_cidr(ip, mask).unwrap_or_else(|| {
            tracing::debug!(ip, mask, "malformed subnet, keeping raw address");
            ip.to_string()
        }))
    })
}

/// First non-empty quoted value of a `set fqdn` line
pub fn find_fqdn<'f>(body: &[&'f str]) -> Option<&'f str> {
    body.iter()
        .find_map(|&raw| match Line::classify(raw) {
            Line::SetFqdn(rest) => quoted_values(rest).next(),
            _ => None,
        })
        .filter(|fqdn| !fqdn.is_empty())
}

/// `ip` + `mask` to `ip/prefixlen`
///
/// `mask` may be a netmask (`255.255.255.0`), a host mask (`0.0.0.255`) or a prefix length (`24`).
/// The ip is kept as written, host bits are not cleared.
pub fn subnet_to_cidr(ip: &str, mask: &str) -> Option<String> {
    ip.parse::<Ipv4Addr>().ok()?;
    let prefix = prefix_len(mask)?;
    Some(format!("{ip}/{prefix}"))
}

pub(crate) fn prefix_len(mask: &str) -> Option<u8> {
    if !mask.is_empty() && mask.bytes().all(|b| b.is_ascii_digit()) {
        return mask.parse::<u8>().ok().filter(|prefix| *prefix <= 32);
    }

    let mask: Ipv4Addr = mask.parse().ok()?;
    ipnet::ipv4_mask_to_prefix(mask)
        .or_else(|_| ipnet::ipv4_mask_to_prefix(!mask))
        .ok()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config_file;
    use pretty_assertions::assert_eq;

    fn resolve_in(file: &crate::config_file::ConfigFile, token: &str) -> String {
        let registry = Registry::build(file.lines());
        Resolver::new(&registry).resolve(token)
    }

    #[test]
    fn rule_order() {
        assert_eq!(Rule::for_token("h-10.0.0.5"), Rule::Host);
        assert_eq!(Rule::for_token("h-10.0.0.1234"), Rule::DottedName);
        assert_eq!(Rule::for_token("h-10.0.0"), Rule::DottedName);
        assert_eq!(Rule::for_token("Internet_example.com"), Rule::DottedName);
        assert_eq!(Rule::for_token("AC_Server1"), Rule::Generic);
        assert_eq!(Rule::for_token("h-host"), Rule::Generic);
    }

    #[test]
    fn host_without_subnet() {
        let file = config_file!["edit \"h-10.0.0.5\"", "set comment \"x\"", "next"];
        assert_eq!(resolve_in(&file, "h-10.0.0.5"), "10.0.0.5/32");
    }

    #[test]
    fn host_with_subnet() {
        let file = config_file![
            "edit \"h-10.0.0.5\"",
            "    set subnet 10.0.0.0 255.255.255.0",
            "next",
        ];
        assert_eq!(resolve_in(&file, "h-10.0.0.5"), "10.0.0.0/24");
    }

    #[test]
    fn host_missing_from_registry() {
        let file = config_file![];
        assert_eq!(resolve_in(&file, "h-192.168.1.1"), "192.168.1.1/32");
    }

    #[test]
    fn host_with_malformed_subnet() {
        let file = config_file!["edit \"h-10.0.0.5\"", "set subnet 10.0.0.5 255.0.255.0", "next"];
        assert_eq!(resolve_in(&file, "h-10.0.0.5"), "10.0.0.5");
    }

    #[test]
    fn dotted_name_fallback() {
        let file = config_file![];
        assert_eq!(resolve_in(&file, "Internet_example.com"), "example.com");
        assert_eq!(resolve_in(&file, "AC_Ext_portal.example.org"), "portal.example.org");
        assert_eq!(resolve_in(&file, "web.example.com"), "example.com");
        assert_eq!(resolve_in(&file, "Internet_.com"), "com");
        assert_eq!(resolve_in(&file, "a.b_c.d"), "b_c.d");
    }

    #[test]
    fn dotted_name_prefers_fqdn_over_subnet() {
        let file = config_file![
            "edit \"Internet_example.com\"",
            "set subnet 1.2.3.4 255.255.255.255",
            "set fqdn \"www.example.com\"",
            "next",
        ];
        assert_eq!(resolve_in(&file, "Internet_example.com"), "www.example.com");
    }

    #[test]
    fn dotted_name_with_subnet_only() {
        let file = config_file!["edit \"net.lan\"", "set subnet 192.168.0.0 255.255.0.0", "next"];
        assert_eq!(resolve_in(&file, "net.lan"), "192.168.0.0/16");
    }

    #[test]
    fn generic_name_with_fqdn() {
        let file = config_file![
            "config firewall address",
            "    edit \"AC_Server1\"",
            "        set type fqdn",
            "        set fqdn \"server1.internal\"",
            "    next",
            "end",
        ];
        assert_eq!(resolve_in(&file, "AC_Server1"), "server1.internal");
    }

    #[test]
    fn generic_name_prefers_subnet_over_fqdn() {
        let file = config_file![
            "edit \"AC_Both\"",
            "set fqdn \"both.internal\"",
            "set subnet 172.16.0.0 255.240.0.0",
            "next",
        ];
        assert_eq!(resolve_in(&file, "AC_Both"), "172.16.0.0/12");
    }

    #[test]
    fn generic_name_kept_when_unresolvable() {
        let file = config_file!["edit \"AC_Empty\"", "set comment \"nothing\"", "next"];
        assert_eq!(resolve_in(&file, "AC_Empty"), "AC_Empty");
        assert_eq!(resolve_in(&file, "AC_Missing"), "AC_Missing");
    }

    #[test]
    fn fallbacks_never_empty() {
        let file = config_file![];
        for token in ["h-1.2.3.4", "a.b", "trailing.", "plain"] {
            assert!(!resolve_in(&file, token).is_empty(), "{token}");
        }
        assert_eq!(resolve_in(&file, "trailing."), "trailing.");
    }

    #[test]
    fn first_subnet_wins() {
        let body = [
            "set subnet 10.0.0.1",
            "set subnet 10.0.0.0 255.0.0.0",
            "set subnet 11.0.0.0 255.0.0.0",
        ];
        assert_eq!(find_subnet(&body), Some("10.0.0.0/8".to_string()));
    }

    #[test]
    fn first_fqdn_wins() {
        let body = ["set fqdn unquoted", "set fqdn \"a.example\"", "set fqdn \"b.example\""];
        assert_eq!(find_fqdn(&body), Some("a.example"));
        assert_eq!(find_fqdn(&["set fqdn \"\""]), None);
    }

    #[test]
    fn netmask_prefix_lengths() {
        for prefix in 0..=32u32 {
            let mask = Ipv4Addr::from(u32::MAX.checked_shl(32 - prefix).unwrap_or(0));
            assert_eq!(
                subnet_to_cidr("10.0.0.0", &mask.to_string()),
                Some(format!("10.0.0.0/{prefix}")),
            );
        }
    }

    #[test]
    fn mask_forms() {
        assert_eq!(
            subnet_to_cidr("10.1.2.3", "255.255.255.255").as_deref(),
            Some("10.1.2.3/32")
        );
        assert_eq!(
            subnet_to_cidr("10.1.2.0", "0.0.0.255").as_deref(),
            Some("10.1.2.0/24")
        );
        assert_eq!(subnet_to_cidr("10.1.2.0", "24").as_deref(), Some("10.1.2.0/24"));
        assert_eq!(subnet_to_cidr("10.1.2.0", "33"), None);
        assert_eq!(subnet_to_cidr("10.1.2.0", "255.0.255.0"), None);
        assert_eq!(subnet_to_cidr("300.1.2.0", "255.0.0.0"), None);
    }
}
