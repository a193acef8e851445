use std::marker::PhantomData;

use indexmap::IndexMap;
use serde::{ser::SerializeStruct, Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::text::normalizer::TextNormalizer;
use crate::vectorizer::{
    tfidf::{DefaultTfIdfEngine, TfIdfEngine},
    TfIdfVectorizer, VectorizerConfig,
};

/// TfIdfVectorizerのデシリアライズ用のデータ構造
/// Plain data form of a fitted [`TfIdfVectorizer`].
/// Use [`TfIdfData::into_tf_idf_vectorizer`] to get a usable vectorizer back;
/// it rebuilds the normalizer and checks the vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdfData {
    /// fit parameters, normalizer settings included
    pub config: VectorizerConfig,
    /// term -> idf, in index order
    #[serde(with = "indexmap::map::serde_seq")]
    pub vocabulary: IndexMap<String, f64>,
    pub doc_num: u64,
}

impl TfIdfData {
    /// `TfIdfData`から`TfIdfVectorizer`に変換します。
    pub fn into_tf_idf_vectorizer<E>(self) -> Result<TfIdfVectorizer<E>>
    where
        E: TfIdfEngine,
    {
        self.config.validate()?;
        if self.vocabulary.is_empty() {
            return Err(Error::EmptyVocabulary {
                min_df: self.config.min_df,
                max_df: self.config.max_df,
            });
        }
        let bad_idf = self
            .vocabulary
            .iter()
            .find(|(_, idf)| !idf.is_finite() || **idf <= 0.0);
        if let Some((term, idf)) = bad_idf {
            return Err(Error::InvalidConfig(format!("invalid idf {idf} for term {term:?}")));
        }
        let normalizer = TextNormalizer::new(self.config.normalizer.clone());
        Ok(TfIdfVectorizer {
            config: self.config,
            normalizer,
            vocabulary: self.vocabulary,
            doc_num: self.doc_num,
            _marker: PhantomData,
        })
    }
}

impl<E> From<&TfIdfVectorizer<E>> for TfIdfData
where
    E: TfIdfEngine,
{
    fn from(v: &TfIdfVectorizer<E>) -> Self {
        Self {
            config: v.config.clone(),
            vocabulary: v.vocabulary.clone(),
            doc_num: v.doc_num,
        }
    }
}

impl<E> Serialize for TfIdfVectorizer<E>
where
    E: TfIdfEngine,
{
    /// Serialized with the same layout as [`TfIdfData`].
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        struct Vocab<'a>(&'a IndexMap<String, f64>);
        impl Serialize for Vocab<'_> {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                indexmap::map::serde_seq::serialize(self.0, serializer)
            }
        }

        let mut state = serializer.serialize_struct("TfIdfData", 3)?;
        state.serialize_field("config", &self.config)?;
        state.serialize_field("vocabulary", &Vocab(&self.vocabulary))?;
        state.serialize_field("doc_num", &self.doc_num)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for TfIdfVectorizer<DefaultTfIdfEngine> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let data = TfIdfData::deserialize(deserializer)?;
        data.into_tf_idf_vectorizer()
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted() -> TfIdfVectorizer {
        let docs = [
            "prison friendship and hope",
            "prison escape and hope",
            "space alien crew",
            "alien crew in space",
        ];
        TfIdfVectorizer::fit(VectorizerConfig::default(), &docs).unwrap()
    }

    #[test]
    fn cbor_roundtrip_keeps_vocabulary_order_and_vectors() {
        let v = fitted();
        let bytes = serde_cbor::to_vec(&v).unwrap();
        let back: TfIdfVectorizer = serde_cbor::from_slice(&bytes).unwrap();
        assert_eq!(back, v);
        let a: Vec<&String> = v.vocabulary().keys().collect();
        let b: Vec<&String> = back.vocabulary().keys().collect();
        assert_eq!(a, b);
        assert_eq!(back.transform("hope in prison"), v.transform("hope in prison"));
    }

    #[test]
    fn data_form_matches_vectorizer_form() {
        let v = fitted();
        let json = serde_json::to_value(&v).unwrap();
        let data: TfIdfData = serde_json::from_value(json).unwrap();
        let keys: Vec<&String> = data.vocabulary.keys().collect();
        assert_eq!(keys, v.vocabulary().keys().collect::<Vec<_>>());
        assert_eq!(data.doc_num, 4);
    }

    #[test]
    fn rejects_empty_vocabulary() {
        let data = TfIdfData {
            config: VectorizerConfig::default(),
            vocabulary: IndexMap::new(),
            doc_num: 0,
        };
        assert!(data.into_tf_idf_vectorizer::<DefaultTfIdfEngine>().is_err());
    }
}
