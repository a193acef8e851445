use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_YEAR: i32 = 2000;
pub const DEFAULT_RATING: f64 = 8.0;
pub const DEFAULT_GENRE: &str = "Drama";

/// Which cluster model answers the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    /// model A, synopsis text only
    #[default]
    #[serde(rename = "vector_a", alias = "tfidf")]
    VectorA,
    /// model B, metadata + synopsis text
    #[serde(rename = "vector_b", alias = "all")]
    VectorB,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::VectorA => "vector_a",
            Method::VectorB => "vector_b",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vector_a" | "tfidf" => Ok(Method::VectorA),
            "vector_b" | "all" => Ok(Method::VectorB),
            other => Err(Error::InvalidConfig(format!("unknown method {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    /// required; a missing or blank synopsis is rejected
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub method: Method,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub genre: Option<String>,
}

impl RecommendationRequest {
    pub fn new(synopsis: impl Into<String>) -> Self {
        Self {
            synopsis: Some(synopsis.into()),
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// The synopsis, or `EmptySynopsis` when missing or blank.
    pub fn validated_synopsis(&self) -> Result<&str> {
        match self.synopsis.as_deref() {
            Some(s) if !s.trim().is_empty() => Ok(s),
            _ => Err(Error::EmptySynopsis),
        }
    }

    pub fn year(&self) -> i32 {
        self.year.unwrap_or(DEFAULT_YEAR)
    }

    pub fn rating(&self) -> f64 {
        self.rating.unwrap_or(DEFAULT_RATING)
    }

    pub fn genre(&self) -> &str {
        self.genre.as_deref().unwrap_or(DEFAULT_GENRE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases_and_defaults() {
        let req: RecommendationRequest =
            serde_json::from_str(r#"{"synopsis": "a heist", "method": "all"}"#).unwrap();
        assert_eq!(req.method, Method::VectorB);
        assert_eq!(req.year(), 2000);
        assert_eq!(req.rating(), 8.0);
        assert_eq!(req.genre(), "Drama");

        let req: RecommendationRequest = serde_json::from_str(r#"{"synopsis": "x"}"#).unwrap();
        assert_eq!(req.method, Method::VectorA);
        assert_eq!("TFIDF".parse::<Method>().unwrap(), Method::VectorA);
        assert!("cosine".parse::<Method>().is_err());
    }

    #[test]
    fn blank_synopsis_is_an_input_error() {
        assert!(matches!(
            RecommendationRequest::new("   ").validated_synopsis(),
            Err(Error::EmptySynopsis)
        ));
        assert!(RecommendationRequest::default().validated_synopsis().is_err());
    }
}
