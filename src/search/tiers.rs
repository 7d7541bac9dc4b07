// Tier cascade for medicine-name matching.
use crate::catalog::MedicineRecord;
use serde::{Deserialize, Serialize};

/// Tokens shorter than this never earn partial credit.
pub const MIN_TOKEN_CHARS: usize = 3;

const NAME_TOKEN_CREDIT: u32 = 20;
const GENERIC_TOKEN_CREDIT: u32 = 15;
const ALIAS_TOKEN_CREDIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    ExactName,
    ExactGeneric,
    ExactAlias,
    NamePrefix,
    GenericPrefix,
    AliasPrefix,
    NameContains,
    GenericContains,
    AliasContains,
    PartialTokens,
}

impl MatchTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExactName => "exact_name",
            Self::ExactGeneric => "exact_generic",
            Self::ExactAlias => "exact_alias",
            Self::NamePrefix => "name_prefix",
            Self::GenericPrefix => "generic_prefix",
            Self::AliasPrefix => "alias_prefix",
            Self::NameContains => "name_contains",
            Self::GenericContains => "generic_contains",
            Self::AliasContains => "alias_contains",
            Self::PartialTokens => "partial_tokens",
        }
    }
}

/// A query after trimming, length bounding and lowercasing.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedQuery {
    /// Trimmed text in the caller's original casing.
    pub display: String,
    /// Lowercased `display`; every comparison uses this.
    pub text: String,
    /// Whitespace-separated words of at least `MIN_TOKEN_CHARS` characters.
    pub tokens: Vec<String>,
}

impl NormalizedQuery {
    /// Returns `None` when nothing but whitespace was typed.
    pub fn new(raw: &str, max_chars: usize) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let display = if trimmed.chars().count() > max_chars {
            trimmed
                .chars()
                .take(max_chars)
                .collect::<String>()
                .trim_end()
                .to_string()
        } else {
            trimmed.to_string()
        };
        let text = display.to_lowercase();
        let tokens = text
            .split_whitespace()
            .filter(|word| word.chars().count() >= MIN_TOKEN_CHARS)
            .map(str::to_string)
            .collect();
        Some(Self {
            display,
            text,
            tokens,
        })
    }
}

#[derive(Clone, Copy)]
enum Field {
    Name,
    Generic,
    Alias,
}

#[derive(Clone, Copy)]
enum Relation {
    Equals,
    StartsWith,
    Contains,
}

impl Relation {
    fn holds(self, value: &str, query: &str) -> bool {
        match self {
            Self::Equals => value == query,
            Self::StartsWith => value.starts_with(query),
            Self::Contains => value.contains(query),
        }
    }
}

struct TierRule {
    tier: MatchTier,
    field: Field,
    relation: Relation,
    score: u32,
}

const fn rule(tier: MatchTier, field: Field, relation: Relation, score: u32) -> TierRule {
    TierRule {
        tier,
        field,
        relation,
        score,
    }
}

/// Evaluated top to bottom; the first rule that holds decides the score.
const CASCADE: [TierRule; 9] = [
    rule(MatchTier::ExactName, Field::Name, Relation::Equals, 100),
    rule(MatchTier::ExactGeneric, Field::Generic, Relation::Equals, 95),
    rule(MatchTier::ExactAlias, Field::Alias, Relation::Equals, 90),
    rule(MatchTier::NamePrefix, Field::Name, Relation::StartsWith, 80),
    rule(MatchTier::GenericPrefix, Field::Generic, Relation::StartsWith, 75),
    rule(MatchTier::AliasPrefix, Field::Alias, Relation::StartsWith, 70),
    rule(MatchTier::NameContains, Field::Name, Relation::Contains, 60),
    rule(MatchTier::GenericContains, Field::Generic, Relation::Contains, 55),
    rule(MatchTier::AliasContains, Field::Alias, Relation::Contains, 50),
];

struct LoweredRecord {
    name: String,
    generic: String,
    aliases: Vec<String>,
}

impl LoweredRecord {
    fn of(record: &MedicineRecord) -> Self {
        Self {
            name: record.name.to_lowercase(),
            generic: record.generic_name.to_lowercase(),
            aliases: record.aliases.iter().map(|a| a.to_lowercase()).collect(),
        }
    }

    fn satisfies(&self, field: Field, relation: Relation, query: &str) -> bool {
        match field {
            Field::Name => relation.holds(&self.name, query),
            Field::Generic => relation.holds(&self.generic, query),
            Field::Alias => self.aliases.iter().any(|a| relation.holds(a, query)),
        }
    }
}

/// Scores one record. `None` means the record is not a match at all.
pub fn score_record(record: &MedicineRecord, query: &NormalizedQuery) -> Option<(u32, MatchTier)> {
    let lowered = LoweredRecord::of(record);

    if let Some(rule) = CASCADE
        .iter()
        .find(|rule| lowered.satisfies(rule.field, rule.relation, &query.text))
    {
        return Some((rule.score, rule.tier));
    }

    // Additive pass. Uncapped, so several matching words can outscore a prefix hit.
    let credit: u32 = query
        .tokens
        .iter()
        .map(|token| token_credit(&lowered, token))
        .sum();

    (credit > 0).then_some((credit, MatchTier::PartialTokens))
}

fn token_credit(lowered: &LoweredRecord, token: &str) -> u32 {
    let mut credit = 0;
    if lowered.satisfies(Field::Name, Relation::Contains, token) {
        credit += NAME_TOKEN_CREDIT;
    }
    if lowered.satisfies(Field::Generic, Relation::Contains, token) {
        credit += GENERIC_TOKEN_CREDIT;
    }
    if lowered.satisfies(Field::Alias, Relation::Contains, token) {
        credit += ALIAS_TOKEN_CREDIT;
    }
    credit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RiskLevel;

    fn med(name: &str, generic: &str, aliases: &[&str]) -> MedicineRecord {
        MedicineRecord {
            id: name.to_lowercase(),
            name: name.to_string(),
            generic_name: generic.to_string(),
            manufacturer: "Various".to_string(),
            risk_level: RiskLevel::Moderate,
            overall_score: 7.0,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn q(raw: &str) -> NormalizedQuery {
        NormalizedQuery::new(raw, 500).unwrap()
    }

    #[test]
    fn normalization_trims_and_lowercases() {
        let query = q("  Vitamin   D3 ");
        assert_eq!(query.display, "Vitamin   D3");
        assert_eq!(query.text, "vitamin   d3");
        assert_eq!(query.tokens, vec!["vitamin".to_string()]);
    }

    #[test]
    fn blank_query_normalizes_to_none() {
        assert!(NormalizedQuery::new("", 500).is_none());
        assert!(NormalizedQuery::new(" \t\n", 500).is_none());
    }

    #[test]
    fn long_query_is_bounded_by_chars() {
        let raw = "é".repeat(600);
        let query = NormalizedQuery::new(&raw, 500).unwrap();
        assert_eq!(query.display.chars().count(), 500);
    }

    #[test]
    fn tiers_one_through_nine_score_in_order() {
        let para = med("Paracetamol", "Acetaminophen", &["Crocin", "Tylenol"]);
        let cases = [
            ("paracetamol", 100, MatchTier::ExactName),
            ("ACETAMINOPHEN", 95, MatchTier::ExactGeneric),
            ("crocin", 90, MatchTier::ExactAlias),
            ("para", 80, MatchTier::NamePrefix),
            ("aceta", 75, MatchTier::GenericPrefix),
            ("tyle", 70, MatchTier::AliasPrefix),
            ("cetam", 60, MatchTier::NameContains),
            ("minoph", 55, MatchTier::GenericContains),
            ("ocin", 50, MatchTier::AliasContains),
        ];
        for (raw, score, tier) in cases {
            assert_eq!(score_record(&para, &q(raw)), Some((score, tier)), "{raw}");
        }
    }

    #[test]
    fn first_matching_rule_wins_without_summing() {
        let ibu = med("Ibuprofen", "Ibuprofen", &["Ibuprofen"]);
        assert_eq!(
            score_record(&ibu, &q("ibuprofen")),
            Some((100, MatchTier::ExactName))
        );
    }

    #[test]
    fn partial_tokens_accumulate_across_words() {
        let combi = med("Combiflam", "Ibuprofen + Paracetamol", &["Ibuprofen Paracetamol"]);
        // ibuprofen: generic 15 + alias 10, paracetamol: generic 15 + alias 10
        assert_eq!(
            score_record(&combi, &q("ibuprofen paracetamol tablets")),
            Some((50, MatchTier::PartialTokens))
        );
    }

    #[test]
    fn partial_tokens_can_exceed_prefix_tiers() {
        let sinarest = med(
            "Sinarest",
            "Paracetamol + Phenylephrine + Chlorpheniramine",
            &["Cold Relief"],
        );
        let (score, tier) = score_record(
            &sinarest,
            &q("paracetamol phenylephrine chlorpheniramine sinarest cold relief"),
        )
        .unwrap();
        assert_eq!(tier, MatchTier::PartialTokens);
        assert_eq!(score, 15 * 3 + 20 + 10 + 10);
        assert!(score > 80);
    }

    #[test]
    fn short_tokens_earn_nothing() {
        let d3 = med("Vitamin D3", "Cholecalciferol", &["D3"]);
        assert_eq!(score_record(&d3, &q("xx d3 yy zz")), None);
    }

    #[test]
    fn unmatched_record_scores_none() {
        let para = med("Paracetamol", "Acetaminophen", &["Crocin"]);
        assert_eq!(score_record(&para, &q("xyzzynotreal")), None);
        assert_eq!(score_record(&para, &q("!!! ??")), None);
    }
}
