//! Core data types shared across modules

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// ISO 639-1 two-letter language codes
const ISO_639_1: &[&str] = &[
    "aa", "ab", "ae", "af", "ak", "am", "an", "ar", "as", "av", "ay", "az", "ba", "be", "bg",
    "bh", "bi", "bm", "bn", "bo", "br", "bs", "ca", "ce", "ch", "co", "cr", "cs", "cu", "cv",
    "cy", "da", "de", "dv", "dz", "ee", "el", "en", "eo", "es", "et", "eu", "fa", "ff", "fi",
    "fj", "fo", "fr", "fy", "ga", "gd", "gl", "gn", "gu", "gv", "ha", "he", "hi", "ho", "hr",
    "ht", "hu", "hy", "hz", "ia", "id", "ie", "ig", "ii", "ik", "io", "is", "it", "iu", "ja",
    "jv", "ka", "kg", "ki", "kj", "kk", "kl", "km", "kn", "ko", "kr", "ks", "ku", "kv", "kw",
    "ky", "la", "lb", "lg", "li", "ln", "lo", "lt", "lu", "lv", "mg", "mh", "mi", "mk", "ml",
    "mn", "mr", "ms", "mt", "my", "na", "nb", "nd", "ne", "ng", "nl", "nn", "no", "nr", "nv",
    "ny", "oc", "oj", "om", "or", "os", "pa", "pi", "pl", "ps", "pt", "qu", "rm", "rn", "ro",
    "ru", "rw", "sa", "sc", "sd", "se", "sg", "si", "sk", "sl", "sm", "sn", "so", "sq", "sr",
    "ss", "st", "su", "sv", "sw", "ta", "te", "tg", "th", "ti", "tk", "tl", "tn", "to", "tr",
    "ts", "tt", "tw", "ty", "ug", "uk", "ur", "uz", "ve", "vi", "vo", "wa", "wo", "xh", "yi",
    "yo", "za", "zh", "zu",
];

/// A validated ISO 639-1 language code, stored in lower case
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Language(String);

impl Language {
    /// Parse and validate a language code
    ///
    /// Accepts either case (`"FR"`, `"fr"`). Anything outside the ISO 639-1
    /// set fails with [`Error::InvalidArgument`].
    pub fn new(code: &str) -> Result<Self, Error> {
        let normalized = code.trim().to_ascii_lowercase();
        if ISO_639_1.binary_search(&normalized.as_str()).is_ok() {
            Ok(Self(normalized))
        } else {
            Err(Error::invalid_argument(format!(
                "'{code}' is not an ISO 639-1 language code"
            )))
        }
    }

    /// The two-letter code
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Language {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_table_is_sorted() {
        assert!(ISO_639_1.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_valid_language() {
        let lang = Language::new("fr").unwrap();
        assert_eq!(lang.code(), "fr");
        assert_eq!(lang.to_string(), "fr");
    }

    #[test]
    fn test_language_is_normalized() {
        assert_eq!(Language::new("DE").unwrap().code(), "de");
        assert_eq!("En".parse::<Language>().unwrap().code(), "en");
    }

    #[test]
    fn test_invalid_language() {
        for code in ["", "f", "fra", "xx", "12", "fr-FR"] {
            let err = Language::new(code).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "{code}");
        }
    }

    #[test]
    fn test_language_serde() {
        let lang: Language = serde_json::from_str("\"it\"").unwrap();
        assert_eq!(lang.code(), "it");
        assert_eq!(serde_json::to_string(&lang).unwrap(), "\"it\"");
        assert!(serde_json::from_str::<Language>("\"zz\"").is_err());
    }
}
