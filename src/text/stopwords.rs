//! Default stopword lists.
//!
//! Tokens shorter than the normalizer's minimum length never reach the
//! stopword check, so the lists only need entries of three or more letters,
//! but the short forms are kept so the lists stay usable on their own.

pub const ENGLISH: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

pub const PORTUGUESE: &[&str] = &[
    "o", "a", "os", "as", "um", "uma", "de", "da", "do", "das", "dos", "em", "na", "no", "nas",
    "nos", "para", "por", "com", "sem", "sobre", "entre", "até", "após", "durante", "e", "ou",
    "mas", "se", "que", "quando", "onde", "como", "porque", "então", "também", "muito", "mais",
    "menos", "bem", "mal", "sempre", "nunca", "já", "ainda", "só", "apenas", "depois", "antes",
    "agora", "hoje", "ontem", "amanhã", "seu", "sua", "seus", "suas", "ele", "ela", "eles",
    "elas", "pelo", "pela", "pelos", "pelas", "num", "numa", "este", "esta", "esse", "essa",
    "isso", "isto", "aquele", "aquela",
];

/// English and Portuguese lists combined.
pub fn default_stopwords() -> Vec<String> {
    ENGLISH
        .iter()
        .chain(PORTUGUESE.iter())
        .map(|w| w.to_string())
        .collect()
}
