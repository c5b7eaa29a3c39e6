//! arXiv-style domain codes and their display names.

/// Bucket for entries that do not state a domain.
pub const DEFAULT_DOMAIN: &str = "physics";

pub struct DomainCategory {
    pub code: &'static str,
    pub title: &'static str,
}

static DOMAIN_CATEGORIES: &[DomainCategory] = &[
    DomainCategory { code: "physics.class-ph", title: "Classical Physics" },
    DomainCategory { code: "physics", title: "General Physics" },
    DomainCategory { code: "physics.flu-dyn", title: "Fluid Dynamics" },
    DomainCategory { code: "physics.atom-ph", title: "Atomic Physics" },
    DomainCategory { code: "physics.cond-mat", title: "Condensed Matter Physics" },
    DomainCategory { code: "physics.optics", title: "Optics" },
    DomainCategory { code: "quant-ph", title: "Quantum Physics" },
    DomainCategory { code: "cond-mat", title: "Condensed Matter Physics" },
    DomainCategory { code: "cond-mat.stat-mech", title: "Statistical Mechanics" },
    DomainCategory { code: "cond-mat.mes-hall", title: "Mesoscale and Nanoscale Physics" },
    DomainCategory { code: "cond-mat.mtrl-sci", title: "Materials Science" },
    DomainCategory { code: "hep-th", title: "High Energy Physics (Theory)" },
    DomainCategory { code: "hep-ph", title: "High Energy Physics (Phenomenology)" },
    DomainCategory { code: "hep-ex", title: "High Energy Physics (Experiment)" },
    DomainCategory { code: "hep-lat", title: "High Energy Physics (Lattice)" },
    DomainCategory { code: "nucl-th", title: "Nuclear Theory" },
    DomainCategory { code: "astro-ph", title: "Astrophysics" },
    DomainCategory { code: "gr-qc", title: "General Relativity and Quantum Cosmology" },
    DomainCategory { code: "math-ph", title: "Mathematical Physics" },
];

pub fn categories() -> &'static [DomainCategory] {
    DOMAIN_CATEGORIES
}

/// Empty or missing domains fall into `DEFAULT_DOMAIN`.
pub fn normalize_domain(domain: Option<&str>) -> &str {
    match domain.map(str::trim) {
        Some(code) if !code.is_empty() => code,
        _ => DEFAULT_DOMAIN,
    }
}

/// Display name; unmapped codes are shown as-is.
pub fn domain_title(code: &str) -> String {
    DOMAIN_CATEGORIES
        .iter()
        .find(|c| c.code == code)
        .map(|c| c.title.to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Fragment id for a domain section.
pub fn domain_anchor(code: &str) -> String {
    code.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titles() {
        assert_eq!(domain_title("quant-ph"), "Quantum Physics");
        assert_eq!(domain_title("physics"), "General Physics");
        assert_eq!(domain_title("xx-yy"), "xx-yy");
    }

    #[test]
    fn test_default_and_anchor() {
        assert_eq!(normalize_domain(None), "physics");
        assert_eq!(normalize_domain(Some("  ")), "physics");
        assert_eq!(normalize_domain(Some("gr-qc")), "gr-qc");
        assert_eq!(domain_anchor("physics.class-ph"), "physics-class-ph");
    }

    #[test]
    fn test_codes_unique() {
        let mut codes: Vec<_> = categories().iter().map(|c| c.code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), categories().len());
    }
}
