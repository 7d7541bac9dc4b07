// Placeholder records for queries the catalog knows nothing about.
use crate::catalog::{MedicineRecord, RiskLevel, SYNTHETIC_ID_PREFIX};
use rand::Rng;
use uuid::Uuid;

pub const SYNTHETIC_MANUFACTURER: &str = "Various Manufacturers";

/// Half-width of the uniform jitter added to the risk baseline.
pub const SCORE_JITTER: f64 = 1.0;

const MIN_SYNTHETIC_SCORE: f64 = 1.0;
const MAX_SYNTHETIC_SCORE: f64 = 10.0;

/// First character uppercased, the rest lowercased.
pub fn title_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Builds a plausible record named after `query`. Risk and score come from
/// `rng`; the id is always fresh.
pub fn generate<R: Rng + ?Sized>(query: &str, rng: &mut R) -> MedicineRecord {
    let name = title_case(query.trim());
    let risk_level = RiskLevel::ALL[rng.gen_range(0..RiskLevel::ALL.len())];
    let jitter = rng.gen_range(-SCORE_JITTER..SCORE_JITTER);
    let score = (risk_level.baseline_score() + jitter).clamp(MIN_SYNTHETIC_SCORE, MAX_SYNTHETIC_SCORE);

    MedicineRecord {
        id: format!("{SYNTHETIC_ID_PREFIX}{}", Uuid::new_v4()),
        generic_name: format!("{name} (Generic)"),
        name,
        manufacturer: SYNTHETIC_MANUFACTURER.to_string(),
        risk_level,
        overall_score: (score * 10.0).round() / 10.0,
        aliases: Vec::new(),
    }
}
