use crate::catalog::MedicineRecord;
use strsim::jaro_winkler;

pub const SUGGESTION_THRESHOLD: f64 = 0.8;
pub const MAX_SUGGESTIONS: usize = 3;

/// "Did you mean" candidates for a query that matched nothing. Compares the
/// lowercased query against every name and alias; returns display names.
pub fn suggest(query_text: &str, catalog: &[MedicineRecord]) -> Vec<String> {
    let mut scored: Vec<(f64, &str)> = catalog
        .iter()
        .filter_map(|record| {
            let best = std::iter::once(&record.name)
                .chain(record.aliases.iter())
                .map(|candidate| jaro_winkler(query_text, &candidate.to_lowercase()))
                .fold(0.0_f64, f64::max);
            (best >= SUGGESTION_THRESHOLD).then_some((best, record.name.as_str()))
        })
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut names: Vec<String> = Vec::new();
    for (_, name) in scored {
        if names.len() == MAX_SUGGESTIONS {
            break;
        }
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
