//! Internal port vocabulary: the direct table, the alias fallback, and
//! virtual country-level pseudo-codes.

#[derive(Debug, Clone, Copy)]
pub struct PortInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub country: &'static str,
}

/// A caller-supplied port code after normalization. `via_virtual` marks
/// codes that arrived as "all ports in country X": they resolve to the
/// designated default port but keep their country, because two codes
/// landing in the same country must still fail cross-port validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPort {
    pub code: String,
    pub country: String,
    pub via_virtual: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortResolution {
    Resolved(ResolvedPort),
    Unknown,
}

const PORTS: &[PortInfo] = &[
    PortInfo { code: "TUN", name: "Tunis (La Goulette)", country: "TN" },
    PortInfo { code: "GAE", name: "Gabes", country: "TN" },
    PortInfo { code: "MRS", name: "Marseille", country: "FR" },
    PortInfo { code: "SET", name: "Sete", country: "FR" },
    PortInfo { code: "AJA", name: "Ajaccio", country: "FR" },
    PortInfo { code: "GOA", name: "Genoa", country: "IT" },
    PortInfo { code: "CIV", name: "Civitavecchia", country: "IT" },
    PortInfo { code: "PMO", name: "Palermo", country: "IT" },
    PortInfo { code: "BCN", name: "Barcelona", country: "ES" },
];

/// Name/alias fallback for callers that send names instead of codes.
const ALIASES: &[(&str, &str)] = &[
    ("tunis", "TUN"),
    ("la goulette", "TUN"),
    ("gabes", "GAE"),
    ("marseille", "MRS"),
    ("sete", "SET"),
    ("ajaccio", "AJA"),
    ("genoa", "GOA"),
    ("genova", "GOA"),
    ("civitavecchia", "CIV"),
    ("palermo", "PMO"),
    ("barcelona", "BCN"),
];

/// One designated default port per country for virtual "ALL-<CC>" codes.
/// The table is deliberately closed: countries without an entry do not
/// resolve, we never invent a default.
const VIRTUAL_DEFAULTS: &[(&str, &str)] = &[
    ("TN", "TUN"),
    ("FR", "MRS"),
    ("IT", "GOA"),
    ("ES", "BCN"),
];

pub fn port_info(code: &str) -> Option<&'static PortInfo> {
    PORTS.iter().find(|p| p.code == code)
}

pub fn virtual_default(country: &str) -> Option<&'static str> {
    VIRTUAL_DEFAULTS
        .iter()
        .find(|(cc, _)| *cc == country)
        .map(|(_, code)| *code)
}

/// Normalize a caller-supplied port code, alias, or virtual country code.
pub fn resolve(input: &str) -> PortResolution {
    let trimmed = input.trim();
    let upper = trimmed.to_uppercase();

    if let Some(country) = upper.strip_prefix("ALL-") {
        return match virtual_default(country) {
            Some(code) => PortResolution::Resolved(ResolvedPort {
                code: code.to_string(),
                country: country.to_string(),
                via_virtual: true,
            }),
            None => PortResolution::Unknown,
        };
    }

    if let Some(info) = port_info(&upper) {
        return PortResolution::Resolved(ResolvedPort {
            code: info.code.to_string(),
            country: info.country.to_string(),
            via_virtual: false,
        });
    }

    let lower = trimmed.to_lowercase();
    if let Some((_, code)) = ALIASES.iter().find(|(alias, _)| *alias == lower) {
        let info = port_info(code);
        if let Some(info) = info {
            return PortResolution::Resolved(ResolvedPort {
                code: info.code.to_string(),
                country: info.country.to_string(),
                via_virtual: false,
            });
        }
    }

    PortResolution::Unknown
}

/// Per-operator static port mapping, tier 1 of the resolution chain.
/// `Unsupported` short-circuits to "no result" without an operator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticPortMapping {
    Code(&'static str),
    Unsupported,
}

pub fn operator_port_static(operator: &str, internal: &str) -> Option<StaticPortMapping> {
    use StaticPortMapping::*;
    let table: &[(&str, StaticPortMapping)] = match operator {
        "maghreb" => &[
            ("TUN", Code("TNTUN")),
            ("GAE", Unsupported),
            ("MRS", Code("FRMRS")),
            ("SET", Code("FRSET")),
            ("GOA", Code("ITGOA")),
            ("PMO", Unsupported),
        ],
        "adriatic" => &[
            ("GOA", Code("GE")),
            ("CIV", Code("CV")),
            ("PMO", Code("PA")),
            ("TUN", Code("TU")),
            ("MRS", Code("MA")),
            ("BCN", Unsupported),
        ],
        _ => &[],
    };
    table
        .iter()
        .find(|(code, _)| *code == internal)
        .map(|(_, mapping)| *mapping)
}

/// Tier 2: operator-specific alias rows keyed by our port's display name.
pub fn operator_port_alias(operator: &str, internal_name: &str) -> Option<&'static str> {
    let lower = internal_name.to_lowercase();
    let table: &[(&str, &str)] = match operator {
        "maghreb" => &[("civitavecchia", "ITCIV")],
        "adriatic" => &[("ajaccio", "AJ"), ("sete", "ST")],
        _ => &[],
    };
    table
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, code)| *code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_code_resolves_to_default_port() {
        let resolved = match resolve("all-tn") {
            PortResolution::Resolved(p) => p,
            PortResolution::Unknown => panic!("ALL-TN should resolve"),
        };
        assert_eq!(resolved.code, "TUN");
        assert_eq!(resolved.country, "TN");
        assert!(resolved.via_virtual);
    }

    #[test]
    fn test_alias_fallback() {
        assert_eq!(
            resolve("Genova"),
            PortResolution::Resolved(ResolvedPort {
                code: "GOA".to_string(),
                country: "IT".to_string(),
                via_virtual: false,
            })
        );
    }

    #[test]
    fn test_unknown_country_has_no_invented_default() {
        assert_eq!(resolve("ALL-GR"), PortResolution::Unknown);
    }

    #[test]
    fn test_unsupported_port_flagged_per_operator() {
        assert_eq!(
            operator_port_static("maghreb", "PMO"),
            Some(StaticPortMapping::Unsupported)
        );
        assert_eq!(
            operator_port_static("adriatic", "PMO"),
            Some(StaticPortMapping::Code("PA"))
        );
    }
}
