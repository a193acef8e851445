pub mod normalizer;
pub mod stopwords;
