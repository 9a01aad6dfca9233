//! Narrative text normalization.
//!
//! Incident narratives arrive in inconsistent case and with inconsistent use
//! of Portuguese diacritics ("VIOLENCIA" and "violência" must compare equal).
//! Normalization is the canonical form every matching component works on:
//! lowercase, diacritics folded to their base letter, whitespace-tokenized.
//!
//! All functions here are pure and idempotent: normalizing an already
//! normalized string yields the same string.

/// Portuguese stop words, stored in folded (lowercase, accent-free) form.
///
/// Subset of the usual NLP lists, covering articles, prepositions,
/// pronouns, and high-frequency verb forms seen in incident reports.
const STOP_WORDS: &[&str] = &[
    "a", "ao", "aos", "aquela", "aquele", "aquilo", "as", "ate", "com", "como",
    "da", "das", "de", "depois", "do", "dos", "e", "ela", "elas", "ele",
    "eles", "em", "entre", "era", "essa", "esse", "esta", "este", "eu", "foi",
    "for", "ha", "isso", "isto", "ja", "mais", "mas", "mesmo", "meu", "minha",
    "muito", "na", "nao", "nas", "nem", "no", "nos", "num", "numa", "o", "os",
    "ou", "para", "pela", "pelas", "pelo", "pelos", "por", "qual", "quando",
    "que", "quem", "se", "sem", "ser", "seu", "sua", "tambem", "tem", "ter",
    "um", "uma", "voce",
];

/// Lowercase a string without touching diacritics.
pub fn case_fold(text: &str) -> String {
    text.to_lowercase()
}

/// Fold Portuguese diacritics to their base ASCII letter.
///
/// Only the accented letters that occur in Portuguese orthography are mapped;
/// everything else passes through unchanged.
pub fn fold_diacritics(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'Ç' => 'C',
            other => other,
        })
        .collect()
}

/// Canonical matching form: lowercase with diacritics folded.
pub fn normalize(text: &str) -> String {
    fold_diacritics(&case_fold(text))
}

/// Split a string into normalized whitespace-delimited tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// Whether a token is purely alphabetic (no digits, no glued punctuation).
pub fn is_alphabetic_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphabetic)
}

/// Whether a normalized token is a Portuguese stop word.
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.binary_search(&token).is_ok()
}

/// Tokens carrying content: alphabetic, non-stop-word.
///
/// This is the token stream the statistical vectorizer is built on.
pub fn content_tokens(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| is_alphabetic_token(t) && !is_stop_word(t))
        .collect()
}
