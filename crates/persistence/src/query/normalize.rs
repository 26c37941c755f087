//! Arabic to Persian dialect normalization for text query values.

/// Substitutions applied in order. Multi-character keys are a base letter
/// followed by a kasra (U+0650).
const DIALECT_TABLE: [(&str, &str); 19] = [
    ("\u{0643}", "\u{06A9}"),         // ك -> ک
    ("\u{062F}\u{0650}", "\u{062F}"), // دِ -> د
    ("\u{0628}\u{0650}", "\u{0628}"), // بِ -> ب
    ("\u{0632}\u{0650}", "\u{0632}"), // زِ -> ز
    ("\u{0630}\u{0650}", "\u{0630}"), // ذِ -> ذ
    ("\u{0634}\u{0650}", "\u{0634}"), // شِ -> ش
    ("\u{0633}\u{0650}", "\u{0633}"), // سِ -> س
    ("\u{0649}", "\u{06CC}"),         // ى -> ی
    ("\u{064A}", "\u{06CC}"),         // ي -> ی
    ("\u{0661}", "\u{06F1}"),
    ("\u{0662}", "\u{06F2}"),
    ("\u{0663}", "\u{06F3}"),
    ("\u{0664}", "\u{06F4}"),
    ("\u{0665}", "\u{06F5}"),
    ("\u{0666}", "\u{06F6}"),
    ("\u{0667}", "\u{06F7}"),
    ("\u{0668}", "\u{06F8}"),
    ("\u{0669}", "\u{06F9}"),
    ("\u{0660}", "\u{06F0}"),
];

/// Replaces Arabic code points with their Persian equivalents.
pub fn normalize_dialect(text: &str) -> String {
    let mut out = text.to_string();
    for (from, to) in DIALECT_TABLE {
        if out.contains(from) {
            out = out.replace(from, to);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kaf_and_yeh() {
        assert_eq!(normalize_dialect("كتاب"), "کتاب");
        assert_eq!(normalize_dialect("علي"), "علی");
        assert_eq!(normalize_dialect("موسى"), "موسی");
    }

    #[test]
    fn test_digits() {
        assert_eq!(normalize_dialect("١٢٣٤٥٦٧٨٩٠"), "۱۲۳۴۵۶۷۸۹۰");
    }

    #[test]
    fn test_kasra_ligatures() {
        assert_eq!(normalize_dialect("\u{062F}\u{0650}ر"), "در");
        assert_eq!(normalize_dialect("\u{0633}\u{0650}لام"), "سلام");
    }

    #[test]
    fn test_latin_untouched() {
        assert_eq!(normalize_dialect("Rust Weekly 42"), "Rust Weekly 42");
        assert_eq!(normalize_dialect(""), "");
    }

    #[test]
    fn test_idempotent() {
        let once = normalize_dialect("كي ١");
        assert_eq!(normalize_dialect(&once), once);
    }
}
