//! Static catalog of common UK SIC codes with natural-language keywords,
//! backing the autocomplete endpoint and the prefix-match predicate used
//! by the local filters.

pub struct SicEntry {
    pub code: &'static str,
    pub description: &'static str,
    pub keywords: &'static [&'static str],
}

pub const SIC_CODES: &[SicEntry] = &[
    SicEntry {
        code: "62010",
        description: "Computer programming activities",
        keywords: &["software", "programming", "coding", "developer", "app"],
    },
    SicEntry {
        code: "62020",
        description: "Computer consultancy activities",
        keywords: &["software", "consulting", "IT consulting", "technology consulting"],
    },
    SicEntry {
        code: "62090",
        description: "Other information technology and computer service activities",
        keywords: &["IT", "technology", "tech support", "IT services"],
    },
    SicEntry {
        code: "63110",
        description: "Data processing, hosting and related activities",
        keywords: &["data", "hosting", "cloud", "server", "data center"],
    },
    SicEntry {
        code: "63120",
        description: "Web portals",
        keywords: &["web", "portal", "website", "online platform"],
    },
    SicEntry {
        code: "64191",
        description: "Banks",
        keywords: &["bank", "banking", "commercial bank"],
    },
    SicEntry {
        code: "64205",
        description: "Activities of financial services holding companies",
        keywords: &["finance", "financial", "holding", "investment"],
    },
    SicEntry {
        code: "64209",
        description: "Other activities of holding companies",
        keywords: &["holding", "investment", "parent company"],
    },
    SicEntry {
        code: "64303",
        description: "Activities of venture and development capital companies",
        keywords: &["venture", "VC", "venture capital", "startup funding"],
    },
    SicEntry {
        code: "64922",
        description: "Activities of mortgage finance companies",
        keywords: &["mortgage", "home loan", "property finance"],
    },
    SicEntry {
        code: "64999",
        description: "Other financial service activities",
        keywords: &["financial services", "fintech", "payment"],
    },
    SicEntry {
        code: "65110",
        description: "Life insurance",
        keywords: &["insurance", "life insurance", "life cover"],
    },
    SicEntry {
        code: "65120",
        description: "Non-life insurance",
        keywords: &["insurance", "general insurance", "property insurance"],
    },
    SicEntry {
        code: "68100",
        description: "Buying and selling of own real estate",
        keywords: &["real estate", "property", "property development"],
    },
    SicEntry {
        code: "68209",
        description: "Other letting and operating of own or leased real estate",
        keywords: &["property", "rental", "landlord", "letting"],
    },
    SicEntry {
        code: "68310",
        description: "Real estate agencies",
        keywords: &["estate agent", "property agent", "real estate agency"],
    },
    SicEntry {
        code: "68320",
        description: "Management of real estate on a fee or contract basis",
        keywords: &["property management", "estate management"],
    },
    SicEntry {
        code: "47110",
        description: "Retail sale in non-specialised stores with food predominating",
        keywords: &["retail", "shop", "store", "supermarket", "grocery"],
    },
    SicEntry {
        code: "47910",
        description: "Retail sale via mail order houses or via Internet",
        keywords: &["ecommerce", "online retail", "online shop", "mail order"],
    },
    SicEntry {
        code: "10710",
        description: "Manufacture of bread; manufacture of fresh pastry goods and cakes",
        keywords: &["bakery", "bread", "manufacturing", "food"],
    },
    SicEntry {
        code: "26200",
        description: "Manufacture of computers and peripheral equipment",
        keywords: &["manufacturing", "computer", "hardware", "electronics"],
    },
    SicEntry {
        code: "69102",
        description: "Solicitors",
        keywords: &["legal", "law", "solicitor", "lawyer"],
    },
    SicEntry {
        code: "69201",
        description: "Accounting and auditing activities",
        keywords: &["accounting", "accountant", "audit", "auditing"],
    },
    SicEntry {
        code: "69203",
        description: "Tax consultancy",
        keywords: &["tax", "taxation", "tax consultant", "tax advisor"],
    },
    SicEntry {
        code: "70100",
        description: "Activities of head offices",
        keywords: &["management", "head office", "corporate", "headquarters"],
    },
    SicEntry {
        code: "70229",
        description: "Management consultancy activities other than financial management",
        keywords: &["consulting", "consultancy", "management consulting"],
    },
    SicEntry {
        code: "73110",
        description: "Advertising agencies",
        keywords: &["advertising", "marketing", "ad agency", "creative agency"],
    },
    SicEntry {
        code: "73200",
        description: "Market research and public opinion polling",
        keywords: &["market research", "research", "polling", "survey"],
    },
    SicEntry {
        code: "86210",
        description: "General medical practice activities",
        keywords: &["GP", "doctor", "medical practice", "healthcare"],
    },
    SicEntry {
        code: "86230",
        description: "Dental practice activities",
        keywords: &["dental", "dentist", "dentistry", "oral health"],
    },
    SicEntry {
        code: "41100",
        description: "Development of building projects",
        keywords: &["construction", "building", "property development"],
    },
    SicEntry {
        code: "41202",
        description: "Construction of domestic buildings",
        keywords: &["construction", "building", "house building", "builder"],
    },
    SicEntry {
        code: "43210",
        description: "Electrical installation",
        keywords: &["electrician", "electrical", "installation"],
    },
    SicEntry {
        code: "49410",
        description: "Freight transport by road",
        keywords: &["haulage", "freight", "transport", "logistics", "trucking"],
    },
    SicEntry {
        code: "52290",
        description: "Other transportation support activities",
        keywords: &["logistics", "freight forwarding", "transport support"],
    },
    SicEntry {
        code: "56101",
        description: "Licensed restaurants",
        keywords: &["restaurant", "dining", "food", "hospitality"],
    },
    SicEntry {
        code: "56302",
        description: "Public houses and bars",
        keywords: &["pub", "bar", "hospitality", "drinks"],
    },
    SicEntry {
        code: "85590",
        description: "Other education n.e.c.",
        keywords: &["education", "training", "tuition", "courses"],
    },
    SicEntry {
        code: "96020",
        description: "Hairdressing and other beauty treatment",
        keywords: &["hairdresser", "salon", "beauty", "barber"],
    },
    SicEntry {
        code: "82990",
        description: "Other business support service activities n.e.c.",
        keywords: &["business support", "services", "admin", "outsourcing"],
    },
];

#[must_use]
pub fn describe(code: &str) -> Option<&'static SicEntry> {
    SIC_CODES.iter().find(|entry| entry.code == code)
}

/// Matches codes by prefix and descriptions/keywords by case-insensitive
/// substring. Capped so the autocomplete payload stays small.
#[must_use]
pub fn suggest(query: &str) -> Vec<&'static SicEntry> {
    const MAX_SUGGESTIONS: usize = 20;

    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    SIC_CODES
        .iter()
        .filter(|entry| {
            entry.code.starts_with(&query)
                || entry.description.to_lowercase().contains(&query)
                || entry
                    .keywords
                    .iter()
                    .any(|k| k.to_lowercase().contains(&query))
        })
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// True when any of `codes` starts with any of `prefixes`.
#[must_use]
pub fn matches_any_prefix(codes: &[String], prefixes: &[String]) -> bool {
    codes
        .iter()
        .any(|code| prefixes.iter().any(|prefix| code.starts_with(prefix)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_finds_exact_code() {
        assert_eq!(
            describe("62010").map(|e| e.description),
            Some("Computer programming activities")
        );
        assert!(describe("00000").is_none());
    }

    #[test]
    fn suggest_matches_keywords_and_code_prefixes() {
        let by_keyword = suggest("software");
        assert!(by_keyword.iter().any(|e| e.code == "62010"));

        let by_code = suggest("6201");
        assert!(by_code.iter().any(|e| e.code == "62010"));

        assert!(suggest("  ").is_empty());
    }

    #[test]
    fn prefix_match_semantics() {
        let codes = vec!["62010".to_string()];
        assert!(matches_any_prefix(&codes, &["620".to_string()]));
        assert!(!matches_any_prefix(
            &["47110".to_string()],
            &["620".to_string()]
        ));
        assert!(!matches_any_prefix(&[], &["620".to_string()]));
    }
}
