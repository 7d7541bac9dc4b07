pub mod request;
pub mod suggest;
pub mod synthetic;
pub mod tiers;

use crate::catalog::{Catalog, MedicineRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tiers::{MatchTier, NormalizedQuery};
use tracing::debug;

/// Upper bound on returned matches, whatever the configuration says.
pub const MAX_RESULTS: usize = 20;
pub const DEFAULT_MAX_QUERY_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankOptions {
    pub max_results: usize,
    pub max_query_chars: usize,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            max_results: MAX_RESULTS,
            max_query_chars: DEFAULT_MAX_QUERY_CHARS,
        }
    }
}

impl RankOptions {
    fn result_cap(&self) -> usize {
        self.max_results.clamp(1, MAX_RESULTS)
    }
}

#[derive(Debug, Clone)]
pub struct RankedMatch<'a> {
    pub medicine: &'a MedicineRecord,
    pub score: u32,
    pub tier: MatchTier,
}

/// Scored catalog entries, best first. Deterministic: ties keep catalog order.
pub fn rank_matches<'a>(
    query: &str,
    catalog: &'a [MedicineRecord],
    options: &RankOptions,
) -> Vec<RankedMatch<'a>> {
    let Some(normalized) = NormalizedQuery::new(query, options.max_query_chars) else {
        return Vec::new();
    };
    score_catalog(&normalized, catalog, options.result_cap())
}

fn score_catalog<'a>(
    query: &NormalizedQuery,
    catalog: &'a [MedicineRecord],
    cap: usize,
) -> Vec<RankedMatch<'a>> {
    let mut matches: Vec<RankedMatch<'a>> = catalog
        .iter()
        .filter_map(|medicine| {
            tiers::score_record(medicine, query).map(|(score, tier)| RankedMatch {
                medicine,
                score,
                tier,
            })
        })
        .collect();

    // sort_by is stable
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches.truncate(cap);
    matches
}

/// Best catalog matches for `query`, or a single synthetic record when nothing
/// matches. Blank queries yield an empty list.
pub fn rank<R: Rng + ?Sized>(
    query: &str,
    catalog: &[MedicineRecord],
    rng: &mut R,
) -> Vec<MedicineRecord> {
    rank_with(query, catalog, &RankOptions::default(), rng)
}

pub fn rank_with<R: Rng + ?Sized>(
    query: &str,
    catalog: &[MedicineRecord],
    options: &RankOptions,
    rng: &mut R,
) -> Vec<MedicineRecord> {
    let Some(normalized) = NormalizedQuery::new(query, options.max_query_chars) else {
        return Vec::new();
    };
    let matches = score_catalog(&normalized, catalog, options.result_cap());
    if matches.is_empty() {
        return vec![synthetic::generate(&normalized.display, rng)];
    }
    matches.into_iter().map(|m| m.medicine.clone()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub query: String,
    pub results: Vec<MedicineRecord>,
    /// True when `results` holds a single fabricated record.
    pub synthetic: bool,
    /// Close catalog names, only filled in on the synthetic path.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

pub struct SearchEngine<'a, R: Rng = StdRng> {
    catalog: &'a Catalog,
    options: RankOptions,
    rng: R,
}

impl<'a> SearchEngine<'a, StdRng> {
    pub fn new(catalog: &'a Catalog, options: RankOptions) -> Self {
        Self::with_rng(catalog, options, StdRng::from_entropy())
    }
}

impl<'a, R: Rng> SearchEngine<'a, R> {
    pub fn with_rng(catalog: &'a Catalog, options: RankOptions, rng: R) -> Self {
        Self {
            catalog,
            options,
            rng,
        }
    }

    pub fn options(&self) -> &RankOptions {
        &self.options
    }

    pub fn search(&mut self, query: &str) -> SearchOutcome {
        let results = rank_with(query, self.catalog.records(), &self.options, &mut self.rng);
        let synthetic = results.len() == 1 && results[0].is_synthetic();
        let suggestions = if synthetic {
            NormalizedQuery::new(query, self.options.max_query_chars)
                .map(|q| suggest::suggest(&q.text, self.catalog.records()))
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        debug!(
            query = %query.trim(),
            results = results.len(),
            synthetic,
            "ranked catalog"
        );

        SearchOutcome {
            query: query.trim().to_string(),
            results,
            synthetic,
            suggestions,
        }
    }

    /// Scored view of the same ranking, for diagnostics.
    pub fn explain(&self, query: &str) -> Vec<RankedMatch<'a>> {
        rank_matches(query, self.catalog.records(), &self.options)
    }
}
