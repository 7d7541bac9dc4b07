pub const DEFAULT_LANGUAGE: &str = "hi";

/// Language codes the application ships dictionaries for.
pub const SUPPORTED_LANGUAGES: [&str; 7] = ["hi", "en", "bn", "te", "mr", "ta", "gu"];

pub fn is_supported(code: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&code)
}

/// Key lookup against one language's dictionary. Missing keys come back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translator {
    language: &'static str,
}

impl Translator {
    /// Unsupported codes fall back to the default language.
    pub fn new(language: &str) -> Self {
        let language = SUPPORTED_LANGUAGES
            .iter()
            .copied()
            .find(|code| *code == language)
            .unwrap_or(DEFAULT_LANGUAGE);
        Self { language }
    }

    pub fn language(&self) -> &'static str {
        self.language
    }

    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        dictionary(self.language)
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, text)| *text)
            .unwrap_or(key)
    }
}

type Dictionary = &'static [(&'static str, &'static str)];

fn dictionary(language: &str) -> Dictionary {
    match language {
        "hi" => HI,
        "en" => EN,
        "bn" => BN,
        "te" => TE,
        "mr" => MR,
        "ta" => TA,
        "gu" => GU,
        _ => &[],
    }
}

const EN: Dictionary = &[
    ("nav.home", "Home"),
    ("history.title", "Medicine History"),
    ("history.empty", "No medicine history yet"),
    ("history.searched", "Searched"),
    ("history.scanned", "Scanned"),
    ("history.uploaded", "Uploaded"),
    ("risk.safe", "Safe"),
    ("risk.moderate", "Moderate Risk"),
    ("risk.high", "High Risk"),
    ("risk.critical", "Critical Risk"),
];

const HI: Dictionary = &[
    ("nav.home", "होम"),
    ("history.title", "दवा इतिहास"),
    ("history.empty", "अभी तक कोई दवा इतिहास नहीं"),
    ("history.searched", "खोजा गया"),
    ("history.scanned", "स्कैन किया गया"),
    ("history.uploaded", "अपलोड किया गया"),
    ("risk.safe", "सुरक्षित"),
    ("risk.moderate", "मध्यम जोखिम"),
    ("risk.high", "उच्च जोखिम"),
    ("risk.critical", "गंभीर जोखिम"),
];

const BN: Dictionary = &[
    ("nav.home", "হোম"),
    ("history.title", "ওষুধের ইতিহাস"),
    ("history.empty", "এখনও কোন ওষুধের ইতিহাস নেই"),
    ("history.searched", "খোঁজা হয়েছে"),
    ("history.scanned", "স্ক্যান করা হয়েছে"),
    ("history.uploaded", "আপলোড করা হয়েছে"),
    ("risk.safe", "নিরাপদ"),
    ("risk.moderate", "মাঝারি ঝুঁকি"),
    ("risk.high", "উচ্চ ঝুঁকি"),
    ("risk.critical", "গুরুতর ঝুঁকি"),
];

const TE: Dictionary = &[
    ("nav.home", "హోమ్"),
    ("risk.safe", "సురక్షితం"),
    ("risk.moderate", "మధ్యస్థ రిస్క్"),
    ("risk.high", "అధిక రిస్క్"),
    ("risk.critical", "క్రిటికల్ రిస్క్"),
];

const MR: Dictionary = &[
    ("nav.home", "होम"),
    ("risk.safe", "सुरक्षित"),
    ("risk.moderate", "मध्यम जोखीम"),
    ("risk.high", "उच्च जोखीम"),
    ("risk.critical", "गंभीर जोखीम"),
];

const TA: Dictionary = &[
    ("nav.home", "முகப்பு"),
    ("risk.safe", "பாதுகாப்பானது"),
    ("risk.moderate", "மிதமான ஆபத்து"),
    ("risk.high", "அதிக ஆபத்து"),
    ("risk.critical", "முக்கியமான ஆபத்து"),
];

const GU: Dictionary = &[
    ("nav.home", "હોમ"),
    ("risk.safe", "સુરક્ષિત"),
    ("risk.moderate", "મધ્યમ જોખમ"),
    ("risk.high", "ઉચ્ચ જોખમ"),
    ("risk.critical", "ગંભીર જોખમ"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RiskLevel;

    #[test]
    fn every_language_labels_every_risk_level() {
        for code in SUPPORTED_LANGUAGES {
            let tr = Translator::new(code);
            for risk in RiskLevel::ALL {
                assert_ne!(tr.t(risk.label_key()), risk.label_key(), "{code}");
            }
        }
    }

    #[test]
    fn missing_key_returns_key() {
        let tr = Translator::new("te");
        assert_eq!(tr.t("history.title"), "history.title");
        assert_eq!(tr.t("no.such.key"), "no.such.key");
    }

    #[test]
    fn unsupported_language_uses_default() {
        let tr = Translator::new("fr");
        assert_eq!(tr.language(), DEFAULT_LANGUAGE);
        assert_eq!(tr.t("risk.safe"), "सुरक्षित");
    }

    #[test]
    fn english_lookup() {
        assert_eq!(Translator::new("en").t("history.searched"), "Searched");
        assert!(is_supported("gu"));
        assert!(!is_supported("xx"));
    }
}
