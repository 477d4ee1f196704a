//! Risk descriptor mapping: class index + display language → the localized
//! presentation bundle. Pure lookup, no computation.

use serde::{Deserialize, Serialize, Serializer};

use crate::model::RiskAssessment;

/// Ordinal severity class the classifiers emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    Safe,
    Warning,
    HighRisk,
    Critical,
}

impl RiskLevel {
    pub const fn all() -> &'static [RiskLevel] {
        &[RiskLevel::Safe, RiskLevel::Warning, RiskLevel::HighRisk, RiskLevel::Critical]
    }

    pub fn index(&self) -> usize {
        match self {
            RiskLevel::Safe => 0,
            RiskLevel::Warning => 1,
            RiskLevel::HighRisk => 2,
            RiskLevel::Critical => 3,
        }
    }

    /// Inverse of [`RiskLevel::index`]. The classifiers arg-max over four
    /// probabilities, so anything outside 0..=3 is a programming error and
    /// panics rather than being coerced.
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => RiskLevel::Safe,
            1 => RiskLevel::Warning,
            2 => RiskLevel::HighRisk,
            3 => RiskLevel::Critical,
            _ => panic!("risk class index {index} out of range 0..=3"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Warning => "warning",
            RiskLevel::HighRisk => "high-risk",
            RiskLevel::Critical => "critical",
        }
    }

    /// High-Risk and Critical assessments unlock the emergency-resource
    /// lookup.
    pub fn is_severe(&self) -> bool {
        *self >= RiskLevel::HighRisk
    }
}

impl Serialize for RiskLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.index() as u8)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display language for descriptor bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Hi,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
        }
    }

    pub const fn all() -> &'static [Language] {
        &[Language::En, Language::Hi]
    }

    /// Unknown or unsupported codes fall back to English.
    pub fn parse_or_default(code: &str) -> Self {
        match code.to_lowercase().as_str() {
            "hi" => Language::Hi,
            _ => Language::En,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

struct LocaleText {
    label: &'static str,
    title: &'static str,
    message: &'static str,
    actions: &'static [&'static str],
}

static EN: [LocaleText; 4] = [
    LocaleText {
        label: "Safe",
        title: "All Clear",
        message: "No immediate threat detected. Conditions are normal.",
        actions: &[
            "📰 Stay updated with weather news",
            "📋 Review emergency preparedness plan",
            "🎒 Keep emergency kit accessible",
            "😊 Enjoy your day safely",
        ],
    },
    LocaleText {
        label: "Warning",
        title: "Stay Alert",
        message: "Elevated hazard conditions detected. Monitor the situation closely.",
        actions: &[
            "🧰 Prepare emergency supplies",
            "🔋 Charge all devices",
            "🏔️ Avoid low-lying areas",
            "📱 Monitor local weather updates",
            "📄 Secure important documents",
        ],
    },
    LocaleText {
        label: "High Risk",
        title: "Take Action Now",
        message: "Dangerous conditions likely. Take precautions immediately!",
        actions: &[
            "📦 Move valuables to higher floors",
            "🚪 Prepare to evacuate",
            "⚡ Turn off utilities if flooding starts",
            "🏔️ Move to higher ground NOW",
            "🚫 Do NOT drive through flooded areas",
            "🧰 Keep emergency supplies ready",
        ],
    },
    LocaleText {
        label: "Critical",
        title: "EVACUATE NOW",
        message: "SEVERE CONDITIONS IMMINENT! Evacuate the affected area immediately!",
        actions: &[
            "🆘 EVACUATE TO HIGHER GROUND NOW",
            "📞 Call emergency services: 112",
            "🚫 Do NOT walk through flood water",
            "🏢 Move to upper floors if trapped",
            "🏳️ Signal for help if stranded",
            "🗺️ Follow official evacuation routes",
        ],
    },
];

static HI: [LocaleText; 4] = [
    LocaleText {
        label: "सुरक्षित",
        title: "सब ठीक है",
        message: "आपदा का कोई खतरा नहीं। स्थितियाँ सामान्य हैं।",
        actions: &[
            "📰 मौसम समाचार से अपडेट रहें",
            "📋 आपातकालीन तैयारी योजना की समीक्षा करें",
            "🎒 आपातकालीन किट तैयार रखें",
            "😊 सुरक्षित रूप से अपने दिन का आनंद लें",
        ],
    },
    LocaleText {
        label: "चेतावनी",
        title: "सतर्क रहें",
        message: "खतरनाक स्थितियों का पता चला। स्थिति पर नज़र रखें।",
        actions: &[
            "🧰 आपातकालीन आपूर्ति तैयार करें",
            "🔋 सभी उपकरण चार्ज करें",
            "🏔️ निचले इलाकों से बचें",
            "📱 स्थानीय मौसम अपडेट देखें",
            "📄 महत्वपूर्ण दस्तावेज़ सुरक्षित करें",
        ],
    },
    LocaleText {
        label: "उच्च जोखिम",
        title: "अभी कार्रवाई करें",
        message: "खतरनाक स्थिति की संभावना। तुरंत सावधानी बरतें!",
        actions: &[
            "📦 कीमती सामान ऊपरी मंजिल पर ले जाएं",
            "🚪 निकासी के लिए तैयार रहें",
            "⚡ बाढ़ शुरू होने पर बिजली बंद करें",
            "🏔️ अभी ऊँचे स्थान पर जाएं",
            "🚫 बाढ़ वाले क्षेत्रों में गाड़ी न चलाएं",
            "🧰 आपातकालीन आपूर्ति तैयार रखें",
        ],
    },
    LocaleText {
        label: "गंभीर",
        title: "अभी निकासी करें",
        message: "गंभीर आपदा आसन्न! तुरंत निकासी करें!",
        actions: &[
            "🆘 अभी ऊँचे स्थान पर निकासी करें",
            "📞 आपातकालीन सेवाएं कॉल करें: 112",
            "🚫 बाढ़ के पानी में न चलें",
            "🏢 फंसे हों तो ऊपरी मंजिल पर जाएं",
            "🏳️ फंसे हों तो मदद के लिए संकेत दें",
            "🗺️ आधिकारिक निकासी मार्ग का पालन करें",
        ],
    },
];

fn locale_text(language: Language, level: RiskLevel) -> &'static LocaleText {
    let table = match language {
        Language::En => &EN,
        Language::Hi => &HI,
    };
    &table[level.index()]
}

/// Localized names of the four classes, for rendering the probability
/// distribution next to an assessment.
pub fn class_labels(language: Language) -> [&'static str; 4] {
    let table = match language {
        Language::En => &EN,
        Language::Hi => &HI,
    };
    [table[0].label, table[1].label, table[2].label, table[3].label]
}

pub fn color(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Safe => "#10b981",
        RiskLevel::Warning => "#f59e0b",
        RiskLevel::HighRisk => "#f97316",
        RiskLevel::Critical => "#ef4444",
    }
}

pub fn gradient(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Safe => "linear-gradient(135deg, #0f766e, #10b981)",
        RiskLevel::Warning => "linear-gradient(135deg, #d97706, #f59e0b)",
        RiskLevel::HighRisk => "linear-gradient(135deg, #ea580c, #f97316)",
        RiskLevel::Critical => "linear-gradient(135deg, #dc2626, #ef4444)",
    }
}

pub fn emoji(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Safe => "✅",
        RiskLevel::Warning => "⚠️",
        RiskLevel::HighRisk => "🚨",
        RiskLevel::Critical => "🆘",
    }
}

/// Assemble the full presentation bundle for a classified risk level.
pub fn describe(language: Language, level: RiskLevel, probabilities: [f64; 4]) -> RiskAssessment {
    let text = locale_text(language, level);

    RiskAssessment {
        risk_level: level,
        probabilities,
        confidence: probabilities[level.index()],
        label: text.label.to_string(),
        title: text.title.to_string(),
        message: text.message.to_string(),
        actions: text.actions.iter().map(|a| (*a).to_string()).collect(),
        color: color(level).to_string(),
        gradient: gradient(level).to_string(),
        emoji: emoji(level).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_language_class_pair_has_a_full_bundle() {
        for language in Language::all() {
            for level in RiskLevel::all() {
                let a = describe(*language, *level, [0.25, 0.25, 0.25, 0.25]);
                assert!(!a.label.is_empty());
                assert!(!a.title.is_empty());
                assert!(!a.message.is_empty());
                assert!(!a.actions.is_empty(), "{language}/{level} actions");
                assert!(a.color.starts_with('#'), "{language}/{level} color {}", a.color);
                assert!(a.gradient.starts_with("linear-gradient"));
                assert!(!a.emoji.is_empty());
            }
        }
    }

    #[test]
    fn higher_classes_never_have_fewer_actions() {
        for language in Language::all() {
            let counts: Vec<usize> = RiskLevel::all()
                .iter()
                .map(|level| locale_text(*language, *level).actions.len())
                .collect();
            for pair in counts.windows(2) {
                assert!(pair[1] >= pair[0], "{language}: {counts:?}");
            }
        }
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        assert_eq!(Language::parse_or_default("fr"), Language::En);
        assert_eq!(Language::parse_or_default(""), Language::En);
        assert_eq!(Language::parse_or_default("HI"), Language::Hi);
    }

    #[test]
    fn risk_level_index_roundtrip() {
        for level in RiskLevel::all() {
            assert_eq!(RiskLevel::from_index(level.index()), *level);
        }
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_class_panics() {
        let _ = RiskLevel::from_index(4);
    }

    #[test]
    fn confidence_tracks_predicted_class() {
        let a = describe(Language::En, RiskLevel::HighRisk, [0.1, 0.2, 0.6, 0.1]);
        assert_eq!(a.confidence, 0.6);
        assert_eq!(a.label, "High Risk");
    }
}
