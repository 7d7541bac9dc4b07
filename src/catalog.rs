use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Prefix carried by every record fabricated by the search fallback.
pub const SYNTHETIC_ID_PREFIX: &str = "generated-";

/// Manufacturer label meaning "unspecified".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [Self::Safe, Self::Moderate, Self::High, Self::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "safe" => Some(Self::Safe),
            "moderate" => Some(Self::Moderate),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    /// Centre of the score band used when a record has to be fabricated.
    pub fn baseline_score(&self) -> f64 {
        match self {
            Self::Safe => 8.0,
            Self::Moderate => 6.5,
            Self::High => 5.0,
            Self::Critical => 3.5,
        }
    }

    /// Translation key for the display label.
    pub fn label_key(&self) -> &'static str {
        match self {
            Self::Safe => "risk.safe",
            Self::Moderate => "risk.moderate",
            Self::High => "risk.high",
            Self::Critical => "risk.critical",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicineRecord {
    pub id: String,
    pub name: String,
    pub generic_name: String,
    pub manufacturer: String,
    pub risk_level: RiskLevel,
    pub overall_score: f64,
    /// Alternate brand names. Used for matching only, never displayed as the name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl MedicineRecord {
    pub fn is_synthetic(&self) -> bool {
        self.id.starts_with(SYNTHETIC_ID_PREFIX)
    }

    fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            bail!("medicine record has an empty id");
        }
        if self.is_synthetic() {
            bail!("catalog id {} uses the reserved '{SYNTHETIC_ID_PREFIX}' prefix", self.id);
        }
        if self.name.trim().is_empty() {
            bail!("medicine {} has an empty name", self.id);
        }
        if self.generic_name.trim().is_empty() {
            bail!("medicine {} has an empty generic name", self.id);
        }
        if !(0.0..=10.0).contains(&self.overall_score) {
            bail!(
                "medicine {} has overall score {} outside [0, 10]",
                self.id,
                self.overall_score
            );
        }
        Ok(())
    }
}

/// Read-only list of known medicines. Iteration order is load order and is
/// what breaks score ties during ranking.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<MedicineRecord>,
}

impl Catalog {
    pub fn new(records: Vec<MedicineRecord>) -> Result<Self> {
        let mut seen = HashSet::new();
        for record in &records {
            record.validate()?;
            if !seen.insert(record.id.as_str()) {
                bail!("duplicate medicine id {}", record.id);
            }
        }
        Ok(Self { records })
    }

    pub fn builtin() -> Self {
        let records = BUILTIN
            .iter()
            .map(|(id, name, generic, manufacturer, risk, score, aliases)| MedicineRecord {
                id: id.to_string(),
                name: name.to_string(),
                generic_name: generic.to_string(),
                manufacturer: manufacturer.to_string(),
                risk_level: *risk,
                overall_score: *score,
                aliases: aliases.iter().map(|a| a.to_string()).collect(),
            })
            .collect();
        Self { records }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<MedicineRecord> =
            serde_json::from_str(json).context("catalog is not a JSON array of medicine records")?;
        Self::new(records)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog {}", path.display()))?;
        Self::from_json_str(&raw)
    }

    pub fn records(&self) -> &[MedicineRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&MedicineRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn popular_searches() -> &'static [&'static str] {
        &POPULAR_SEARCHES
    }
}

const POPULAR_SEARCHES: [&str; 8] = [
    "Paracetamol",
    "Ibuprofen",
    "Aspirin",
    "Omeprazole",
    "Cetirizine",
    "Amoxicillin",
    "Metformin",
    "Vitamin D3",
];

type BuiltinRow = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    RiskLevel,
    f64,
    &'static [&'static str],
);

// id, name, generic name, manufacturer, risk, score, aliases
const BUILTIN: &[BuiltinRow] = &[
    ("1", "Paracetamol", "Acetaminophen", "Various", RiskLevel::Moderate, 7.2, &["Tylenol", "Crocin", "Dolo", "Calpol", "Panadol"]),
    ("2", "Ibuprofen", "Ibuprofen", "Various", RiskLevel::High, 6.1, &["Advil", "Brufen", "Nurofen", "Motrin"]),
    ("3", "Aspirin", "Acetylsalicylic acid", "Various", RiskLevel::Moderate, 7.8, &["Disprin", "Ecosprin", "Bayer Aspirin"]),
    ("4", "Diclofenac", "Diclofenac sodium", "Various", RiskLevel::Critical, 4.2, &["Voltaren", "Voveran", "Cataflam"]),
    ("5", "Nimesulide", "Nimesulide", "Various", RiskLevel::High, 5.8, &["Nise", "Nimulid", "Nice"]),
    ("6", "Aceclofenac", "Aceclofenac", "Various", RiskLevel::Moderate, 6.9, &["Zerodol", "Hifenac", "Aceclo"]),
    ("7", "Tramadol", "Tramadol hydrochloride", "Various", RiskLevel::Critical, 4.5, &["Ultram", "Tramal", "Ultracet"]),
    ("8", "Naproxen", "Naproxen", "Various", RiskLevel::High, 6.3, &["Aleve", "Naprosyn", "Flanax"]),
    ("9", "Celecoxib", "Celecoxib", "Various", RiskLevel::Moderate, 6.8, &["Celebrex", "Celact"]),
    ("10", "Meloxicam", "Meloxicam", "Various", RiskLevel::Moderate, 6.7, &["Mobic", "Melonex"]),
    ("11", "Amoxicillin", "Amoxicillin", "Various", RiskLevel::Safe, 8.1, &["Amoxil", "Augmentin", "Moxikind"]),
    ("12", "Azithromycin", "Azithromycin", "Various", RiskLevel::Moderate, 7.3, &["Zithromax", "Azee", "Z-pack"]),
    ("13", "Ciprofloxacin", "Ciprofloxacin", "Various", RiskLevel::High, 5.9, &["Cipro", "Ciplox", "Cifran"]),
    ("14", "Doxycycline", "Doxycycline", "Various", RiskLevel::Moderate, 7.0, &["Vibramycin", "Doxy", "Doxt"]),
    ("15", "Cephalexin", "Cephalexin", "Various", RiskLevel::Safe, 8.3, &["Keflex", "Cefalexin"]),
    ("16", "Clarithromycin", "Clarithromycin", "Various", RiskLevel::Moderate, 7.1, &["Biaxin", "Klacid"]),
    ("17", "Levofloxacin", "Levofloxacin", "Various", RiskLevel::High, 6.0, &["Levaquin", "Tavanic"]),
    ("18", "Metronidazole", "Metronidazole", "Various", RiskLevel::Moderate, 7.2, &["Flagyl", "Metrogyl"]),
    ("19", "Omeprazole", "Omeprazole", "Various", RiskLevel::Safe, 8.5, &["Prilosec", "Omez", "Losec"]),
    ("20", "Pantoprazole", "Pantoprazole", "Various", RiskLevel::Safe, 8.2, &["Protonix", "Pantop", "Controloc"]),
    ("21", "Esomeprazole", "Esomeprazole", "Various", RiskLevel::Safe, 8.3, &["Nexium", "Esoz"]),
    ("22", "Ranitidine", "Ranitidine", "Various", RiskLevel::Moderate, 6.8, &["Zantac", "Aciloc"]),
    ("23", "Domperidone", "Domperidone", "Various", RiskLevel::Moderate, 7.1, &["Motilium", "Domstal"]),
    ("24", "Ondansetron", "Ondansetron", "Various", RiskLevel::Safe, 8.0, &["Zofran", "Emeset"]),
    ("25", "Loperamide", "Loperamide", "Various", RiskLevel::Safe, 7.9, &["Imodium", "Lopamide"]),
    ("26", "Amlodipine", "Amlodipine", "Various", RiskLevel::Moderate, 7.4, &["Norvasc", "Amlong"]),
    ("27", "Atenolol", "Atenolol", "Various", RiskLevel::Moderate, 7.2, &["Tenormin", "Aten"]),
    ("28", "Lisinopril", "Lisinopril", "Various", RiskLevel::Moderate, 7.6, &["Prinivil", "Zestril"]),
    ("29", "Metoprolol", "Metoprolol", "Various", RiskLevel::Moderate, 7.3, &["Lopressor", "Toprol"]),
    ("30", "Losartan", "Losartan", "Various", RiskLevel::Safe, 8.1, &["Cozaar", "Losacar"]),
    ("31", "Atorvastatin", "Atorvastatin", "Various", RiskLevel::Moderate, 7.5, &["Lipitor", "Atorva"]),
    ("32", "Simvastatin", "Simvastatin", "Various", RiskLevel::Moderate, 7.4, &["Zocor", "Simvotin"]),
    ("33", "Metformin", "Metformin", "Various", RiskLevel::Safe, 8.4, &["Glucophage", "Glycomet"]),
    ("34", "Glimepiride", "Glimepiride", "Various", RiskLevel::Moderate, 6.9, &["Amaryl", "Glimpid"]),
    ("35", "Insulin", "Human Insulin", "Various", RiskLevel::Moderate, 7.8, &["Humulin", "Novolin", "Lantus"]),
    ("36", "Gliclazide", "Gliclazide", "Various", RiskLevel::Moderate, 7.0, &["Diamicron", "Glizid"]),
    ("37", "Salbutamol", "Salbutamol", "Various", RiskLevel::Safe, 8.2, &["Ventolin", "Asthalin", "Albuterol"]),
    ("38", "Montelukast", "Montelukast", "Various", RiskLevel::Safe, 7.9, &["Singulair", "Montair"]),
    ("39", "Cetirizine", "Cetirizine", "Various", RiskLevel::Safe, 8.6, &["Zyrtec", "Alerid", "Cetrizet"]),
    ("40", "Loratadine", "Loratadine", "Various", RiskLevel::Safe, 8.4, &["Claritin", "Lorfast"]),
    ("41", "Dextromethorphan", "Dextromethorphan", "Various", RiskLevel::Safe, 7.8, &["Robitussin", "Delsym"]),
    ("42", "Prednisolone", "Prednisolone", "Various", RiskLevel::High, 5.5, &["Prelone", "Wysolone"]),
    ("43", "Sertraline", "Sertraline", "Various", RiskLevel::Moderate, 7.1, &["Zoloft", "Sertima"]),
    ("44", "Fluoxetine", "Fluoxetine", "Various", RiskLevel::Moderate, 7.0, &["Prozac", "Fludac"]),
    ("45", "Escitalopram", "Escitalopram", "Various", RiskLevel::Moderate, 7.2, &["Lexapro", "Citadep"]),
    ("46", "Alprazolam", "Alprazolam", "Various", RiskLevel::Critical, 4.8, &["Xanax", "Alprax"]),
    ("47", "Lorazepam", "Lorazepam", "Various", RiskLevel::Critical, 4.9, &["Ativan", "Loram"]),
    ("48", "Vitamin D3", "Cholecalciferol", "Various", RiskLevel::Safe, 9.1, &["Calcirol", "D3", "Cholecalciferol"]),
    ("49", "Vitamin B12", "Cyanocobalamin", "Various", RiskLevel::Safe, 9.2, &["Methylcobalamin", "B12"]),
    ("50", "Folic Acid", "Folic Acid", "Various", RiskLevel::Safe, 9.0, &["Folate", "Vitamin B9"]),
    ("51", "Iron", "Ferrous Sulfate", "Various", RiskLevel::Safe, 8.0, &["Ferrous Fumarate", "Iron Supplement"]),
    ("52", "Calcium", "Calcium Carbonate", "Various", RiskLevel::Safe, 8.5, &["Calcium Citrate", "Cal"]),
    ("53", "Levothyroxine", "Levothyroxine", "Various", RiskLevel::Moderate, 7.7, &["Synthroid", "Eltroxin", "Thyronorm"]),
    ("54", "Carbimazole", "Carbimazole", "Various", RiskLevel::Moderate, 6.8, &["Neo-Mercazole"]),
    ("55", "Hydrocortisone", "Hydrocortisone", "Various", RiskLevel::Safe, 7.8, &["Cortisone", "HC"]),
    ("56", "Clotrimazole", "Clotrimazole", "Various", RiskLevel::Safe, 8.2, &["Canesten", "Clotrim"]),
    ("57", "Mupirocin", "Mupirocin", "Various", RiskLevel::Safe, 8.1, &["Bactroban", "T-Bact"]),
    ("58", "Chloramphenicol", "Chloramphenicol", "Various", RiskLevel::Moderate, 6.9, &["Chloromycetin"]),
    ("59", "Tobramycin", "Tobramycin", "Various", RiskLevel::Moderate, 7.1, &["Tobrex"]),
    ("60", "Mifepristone", "Mifepristone", "Various", RiskLevel::Critical, 4.0, &["Mifeprex"]),
    ("61", "Clomiphene", "Clomiphene", "Various", RiskLevel::Moderate, 6.5, &["Clomid", "Fertomid"]),
    ("62", "Epinephrine", "Epinephrine", "Various", RiskLevel::Critical, 5.0, &["Adrenaline", "EpiPen"]),
    ("63", "Atropine", "Atropine", "Various", RiskLevel::Critical, 4.5, &["Atropine Sulfate"]),
    ("64", "Ashwagandha", "Withania somnifera", "Various", RiskLevel::Safe, 8.0, &["Winter Cherry", "Indian Ginseng"]),
    ("65", "Turmeric", "Curcuma longa", "Various", RiskLevel::Safe, 8.5, &["Haldi", "Curcumin"]),
    ("66", "Triphala", "Triphala", "Various", RiskLevel::Safe, 8.2, &["Three Fruits"]),
    ("67", "Crocin", "Paracetamol", "GSK", RiskLevel::Moderate, 7.2, &["Paracetamol", "Acetaminophen"]),
    ("68", "Combiflam", "Ibuprofen + Paracetamol", "Sanofi", RiskLevel::Moderate, 6.8, &["Ibuprofen Paracetamol"]),
    ("69", "Sinarest", "Paracetamol + Phenylephrine + Chlorpheniramine", "Centaur", RiskLevel::Moderate, 6.5, &["Cold Relief"]),
    ("70", "Allegra", "Fexofenadine", "Sanofi", RiskLevel::Safe, 8.3, &["Fexofenadine"]),
];
