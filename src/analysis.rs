// Static safety analysis shown after a medicine is selected. Nothing here is
// computed from clinical data; the tables are fixed per medicine family.
use crate::catalog::{MedicineRecord, RiskLevel};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrganRiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RemedyKind {
    Ayurvedic,
    Herbal,
    Homeopathic,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrganRisk {
    pub organ: &'static str,
    pub risk: OrganRiskLevel,
    pub score: f64,
    pub description: &'static str,
    pub effects: &'static [&'static str],
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
    pub name: &'static str,
    pub generic_name: &'static str,
    pub safety_score: f64,
    pub advantages: &'static [&'static str],
    pub common_use: &'static str,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TraditionalRemedy {
    pub name: &'static str,
    pub sanskrit_name: &'static str,
    pub botanical_name: &'static str,
    pub safety_score: f64,
    #[serde(rename = "type")]
    pub kind: RemedyKind,
    pub benefits: &'static [&'static str],
    pub preparation: &'static str,
    pub dosage: &'static str,
    pub precautions: &'static [&'static str],
    pub best_time: &'static str,
    pub duration: &'static str,
    /// Taste.
    pub rasa: &'static str,
    /// Potency.
    pub virya: &'static str,
    /// Post-digestive effect.
    pub vipaka: &'static str,
}

struct Profile {
    organ_risks: &'static [OrganRisk],
    alternatives: &'static [Alternative],
    traditional: &'static [TraditionalRemedy],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineAnalysis {
    pub medicine: MedicineRecord,
    pub summary: String,
    pub organ_risks: &'static [OrganRisk],
    pub alternatives: &'static [Alternative],
    pub traditional_alternatives: &'static [TraditionalRemedy],
}

/// Mock analysis for `medicine`. Synthetic records get the generic profile.
pub fn analyze(medicine: &MedicineRecord) -> MedicineAnalysis {
    let profile = profile_for(medicine);
    MedicineAnalysis {
        medicine: medicine.clone(),
        summary: summary(medicine),
        organ_risks: profile.organ_risks,
        alternatives: profile.alternatives,
        traditional_alternatives: profile.traditional,
    }
}

// Matching is exact and case-sensitive on display names.
fn profile_for(medicine: &MedicineRecord) -> &'static Profile {
    match (medicine.name.as_str(), medicine.generic_name.as_str()) {
        ("Paracetamol" | "Crocin", _) | (_, "Acetaminophen") => &ANALGESIC,
        ("Omeprazole" | "Omez", _) => &ANTACID,
        _ => &GENERAL,
    }
}

/// One-paragraph spoken summary of the record itself.
pub fn summary(medicine: &MedicineRecord) -> String {
    let risk = match medicine.risk_level {
        RiskLevel::Safe => "safe to use",
        RiskLevel::Moderate => "moderately risky",
        RiskLevel::High => "high risk",
        RiskLevel::Critical => "critically risky",
    };
    format!(
        "{}, also known as {}, has a safety score of {} out of 10. This medicine is {}. It is manufactured by {}.",
        medicine.name, medicine.generic_name, medicine.overall_score, risk, medicine.manufacturer
    )
}

static ANALGESIC: Profile = Profile {
    organ_risks: &[
        OrganRisk {
            organ: "Liver",
            risk: OrganRiskLevel::High,
            score: 4.2,
            description: "High doses can cause severe liver damage",
            effects: &[
                "Hepatotoxicity with overdose",
                "Liver enzyme elevation",
                "Potential liver failure in extreme cases",
            ],
        },
        OrganRisk {
            organ: "Kidneys",
            risk: OrganRiskLevel::Moderate,
            score: 6.8,
            description: "Long-term use may affect kidney function",
            effects: &[
                "Chronic kidney disease risk",
                "Reduced kidney function",
                "Electrolyte imbalances",
            ],
        },
        OrganRisk {
            organ: "Heart",
            risk: OrganRiskLevel::Low,
            score: 8.5,
            description: "Generally safe for cardiovascular system",
            effects: &["Minimal cardiovascular effects", "Safe for heart patients"],
        },
    ],
    alternatives: &[
        Alternative {
            name: "Ibuprofen",
            generic_name: "Ibuprofen",
            safety_score: 6.1,
            advantages: &["Better anti-inflammatory action", "Effective for muscle pain"],
            common_use: "Pain and inflammation relief",
        },
        Alternative {
            name: "Aspirin",
            generic_name: "Acetylsalicylic acid",
            safety_score: 7.8,
            advantages: &["Cardiovascular benefits", "Anti-platelet effects"],
            common_use: "Pain relief and heart protection",
        },
    ],
    traditional: &[
        TraditionalRemedy {
            name: "Willow Bark",
            sanskrit_name: "Vetasa Tvak",
            botanical_name: "Salix alba",
            safety_score: 8.5,
            kind: RemedyKind::Herbal,
            benefits: &[
                "Natural pain relief",
                "Anti-inflammatory properties",
                "Fever reduction",
                "Gentle on stomach",
            ],
            preparation: "Decoction of dried bark or standardized extract",
            dosage: "1-2 grams of dried bark powder twice daily or 120-240mg extract",
            precautions: &[
                "Avoid if allergic to aspirin",
                "Not for children under 16",
                "Consult doctor if on blood thinners",
            ],
            best_time: "After meals to prevent stomach irritation",
            duration: "Maximum 7-10 days for acute pain",
            rasa: "Kashaya (Astringent), Tikta (Bitter)",
            virya: "Sheeta (Cold)",
            vipaka: "Katu (Pungent)",
        },
        TraditionalRemedy {
            name: "Turmeric",
            sanskrit_name: "Haridra",
            botanical_name: "Curcuma longa",
            safety_score: 9.2,
            kind: RemedyKind::Ayurvedic,
            benefits: &[
                "Powerful anti-inflammatory",
                "Natural pain reliever",
                "Liver protective",
                "Antioxidant properties",
            ],
            preparation: "Golden milk, turmeric paste, or curcumin supplements",
            dosage: "1-3 grams daily with black pepper for absorption",
            precautions: &[
                "May increase bleeding risk",
                "Avoid before surgery",
                "Can interact with diabetes medications",
            ],
            best_time: "With meals, preferably with warm milk and black pepper",
            duration: "Safe for long-term use in culinary amounts",
            rasa: "Tikta (Bitter), Katu (Pungent)",
            virya: "Ushna (Hot)",
            vipaka: "Katu (Pungent)",
        },
        TraditionalRemedy {
            name: "Ginger",
            sanskrit_name: "Ardraka",
            botanical_name: "Zingiber officinale",
            safety_score: 8.8,
            kind: RemedyKind::Ayurvedic,
            benefits: &["Anti-inflammatory", "Pain relief", "Digestive aid", "Nausea relief"],
            preparation: "Fresh ginger tea, dried powder, or standardized extract",
            dosage: "1-4 grams daily of fresh ginger or 250mg extract",
            precautions: &[
                "May increase bleeding",
                "Avoid with gallstones",
                "Can interact with blood thinners",
            ],
            best_time: "Morning on empty stomach or 30 minutes before meals",
            duration: "Safe for daily use in moderate amounts",
            rasa: "Katu (Pungent)",
            virya: "Ushna (Hot)",
            vipaka: "Madhura (Sweet)",
        },
        TraditionalRemedy {
            name: "Boswellia",
            sanskrit_name: "Shallaki",
            botanical_name: "Boswellia serrata",
            safety_score: 8.7,
            kind: RemedyKind::Ayurvedic,
            benefits: &[
                "Joint pain relief",
                "Anti-inflammatory",
                "Cartilage protection",
                "Respiratory support",
            ],
            preparation: "Standardized extract or resin powder",
            dosage: "300-500mg extract twice daily or 1-2g powder",
            precautions: &[
                "May cause stomach upset",
                "Avoid during pregnancy",
                "Monitor if on anti-inflammatory drugs",
            ],
            best_time: "Between meals for better absorption",
            duration: "2-3 months for chronic conditions",
            rasa: "Tikta (Bitter), Katu (Pungent)",
            virya: "Ushna (Hot)",
            vipaka: "Katu (Pungent)",
        },
        TraditionalRemedy {
            name: "Ashwagandha",
            sanskrit_name: "Ashwagandha",
            botanical_name: "Withania somnifera",
            safety_score: 8.9,
            kind: RemedyKind::Ayurvedic,
            benefits: &[
                "Stress-related pain relief",
                "Anti-inflammatory",
                "Muscle recovery",
                "Sleep improvement",
            ],
            preparation: "Root powder with warm milk or water, or standardized extract",
            dosage: "1-6 grams powder daily or 300-500mg extract",
            precautions: &[
                "Avoid during pregnancy",
                "May interact with immunosuppressants",
                "Can affect thyroid medications",
            ],
            best_time: "Evening with warm milk for sleep, morning for energy",
            duration: "3-6 months for optimal benefits",
            rasa: "Tikta (Bitter), Katu (Pungent), Madhura (Sweet)",
            virya: "Ushna (Hot)",
            vipaka: "Madhura (Sweet)",
        },
    ],
};

static ANTACID: Profile = Profile {
    organ_risks: &[
        OrganRisk {
            organ: "Stomach",
            risk: OrganRiskLevel::Low,
            score: 8.2,
            description: "Effective for acid reduction",
            effects: &["Reduced stomach acid", "Healing of ulcers"],
        },
        OrganRisk {
            organ: "Kidneys",
            risk: OrganRiskLevel::Moderate,
            score: 7.1,
            description: "Long-term use may affect kidney function",
            effects: &["Potential kidney disease", "Electrolyte imbalances"],
        },
    ],
    alternatives: &[Alternative {
        name: "Ranitidine",
        generic_name: "Ranitidine",
        safety_score: 6.8,
        advantages: &["Different mechanism", "Shorter duration"],
        common_use: "Acid reflux treatment",
    }],
    traditional: &[
        TraditionalRemedy {
            name: "Licorice Root",
            sanskrit_name: "Yashtimadhu",
            botanical_name: "Glycyrrhiza glabra",
            safety_score: 8.4,
            kind: RemedyKind::Ayurvedic,
            benefits: &[
                "Soothes stomach lining",
                "Reduces acid production",
                "Heals ulcers",
                "Anti-inflammatory",
            ],
            preparation: "Decoction, powder, or DGL (deglycyrrhizinated) supplements",
            dosage: "1-2 grams powder twice daily or 380mg DGL before meals",
            precautions: &[
                "Avoid with high blood pressure",
                "Can cause potassium loss",
                "Limit use to 6 weeks",
            ],
            best_time: "30 minutes before meals",
            duration: "Maximum 6 weeks continuous use",
            rasa: "Madhura (Sweet)",
            virya: "Sheeta (Cold)",
            vipaka: "Madhura (Sweet)",
        },
        TraditionalRemedy {
            name: "Aloe Vera",
            sanskrit_name: "Kumari",
            botanical_name: "Aloe barbadensis",
            safety_score: 8.1,
            kind: RemedyKind::Ayurvedic,
            benefits: &[
                "Soothes digestive tract",
                "Reduces inflammation",
                "Promotes healing",
                "Cooling effect",
            ],
            preparation: "Fresh gel or juice (inner leaf only)",
            dosage: "1-2 tablespoons of gel twice daily",
            precautions: &[
                "Use only inner gel",
                "Avoid latex part",
                "May cause diarrhea in excess",
            ],
            best_time: "Empty stomach, 30 minutes before meals",
            duration: "2-4 weeks for acute conditions",
            rasa: "Tikta (Bitter), Madhura (Sweet)",
            virya: "Sheeta (Cold)",
            vipaka: "Madhura (Sweet)",
        },
        TraditionalRemedy {
            name: "Amla",
            sanskrit_name: "Amalaki",
            botanical_name: "Phyllanthus emblica",
            safety_score: 9.1,
            kind: RemedyKind::Ayurvedic,
            benefits: &[
                "Natural antacid",
                "Vitamin C rich",
                "Digestive tonic",
                "Liver protective",
            ],
            preparation: "Fresh juice, powder, or dried fruit",
            dosage: "1-2 teaspoons powder twice daily or 20ml fresh juice",
            precautions: &[
                "Generally safe",
                "May enhance iron absorption",
                "Avoid with kidney stones",
            ],
            best_time: "Morning on empty stomach",
            duration: "Safe for long-term daily use",
            rasa: "Amla (Sour), Madhura (Sweet), Tikta (Bitter), Katu (Pungent), Kashaya (Astringent)",
            virya: "Sheeta (Cold)",
            vipaka: "Madhura (Sweet)",
        },
        TraditionalRemedy {
            name: "Fennel Seeds",
            sanskrit_name: "Shatapushpa",
            botanical_name: "Foeniculum vulgare",
            safety_score: 8.9,
            kind: RemedyKind::Ayurvedic,
            benefits: &["Digestive aid", "Reduces gas", "Soothes stomach", "Fresh breath"],
            preparation: "Chew seeds after meals or make tea",
            dosage: "1 teaspoon seeds after meals or 1 cup tea",
            precautions: &[
                "Generally safe",
                "Avoid in pregnancy (large amounts)",
                "May interact with blood thinners",
            ],
            best_time: "After meals for digestion",
            duration: "Safe for daily use",
            rasa: "Madhura (Sweet), Katu (Pungent)",
            virya: "Sheeta (Cold)",
            vipaka: "Madhura (Sweet)",
        },
    ],
};

static GENERAL: Profile = Profile {
    organ_risks: &[
        OrganRisk {
            organ: "Heart",
            risk: OrganRiskLevel::Moderate,
            score: 6.5,
            description: "May affect cardiovascular system",
            effects: &["Increased blood pressure", "Heart rhythm changes"],
        },
        OrganRisk {
            organ: "Liver",
            risk: OrganRiskLevel::Low,
            score: 8.2,
            description: "Generally safe for liver",
            effects: &["Minimal liver impact"],
        },
    ],
    alternatives: &[Alternative {
        name: "Natural Alternative",
        generic_name: "Herbal supplement",
        safety_score: 9.2,
        advantages: &["Natural ingredients", "Fewer side effects"],
        common_use: "Alternative treatment",
    }],
    traditional: &[
        TraditionalRemedy {
            name: "Triphala",
            sanskrit_name: "Triphala",
            botanical_name: "Terminalia chebula, T. bellirica, Phyllanthus emblica",
            safety_score: 9.0,
            kind: RemedyKind::Ayurvedic,
            benefits: &[
                "General health tonic",
                "Digestive support",
                "Detoxification",
                "Antioxidant",
            ],
            preparation: "Powder mixed with warm water or honey",
            dosage: "1-2 teaspoons powder before bed",
            precautions: &[
                "Start with small dose",
                "May cause loose stools initially",
                "Avoid during pregnancy",
            ],
            best_time: "Before bed on empty stomach",
            duration: "Safe for long-term use",
            rasa: "Pancha Rasa (Five tastes except Lavana)",
            virya: "Sheeta (Cold)",
            vipaka: "Madhura (Sweet)",
        },
        TraditionalRemedy {
            name: "Brahmi",
            sanskrit_name: "Brahmi",
            botanical_name: "Bacopa monnieri",
            safety_score: 8.8,
            kind: RemedyKind::Ayurvedic,
            benefits: &[
                "Mental clarity",
                "Stress reduction",
                "Memory enhancement",
                "Nervous system support",
            ],
            preparation: "Powder with ghee or honey, or standardized extract",
            dosage: "1-2 grams powder twice daily or 300mg extract",
            precautions: &[
                "May cause drowsiness initially",
                "Can interact with thyroid medications",
                "Avoid with sedatives",
            ],
            best_time: "Morning and evening with meals",
            duration: "3-6 months for cognitive benefits",
            rasa: "Tikta (Bitter), Kashaya (Astringent)",
            virya: "Sheeta (Cold)",
            vipaka: "Madhura (Sweet)",
        },
    ],
};
