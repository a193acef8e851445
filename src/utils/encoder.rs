use serde::{Deserialize, Serialize};

/// Code given to labels that were not seen while fitting.
pub const DEFAULT_LABEL_CODE: usize = 0;

/// Maps categorical labels to integer codes in sorted label order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

/// Result of encoding one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoded {
    Known(usize),
    /// label was not seen at fit time; carries the default code
    Unknown(usize),
}

impl Encoded {
    pub fn code(self) -> usize {
        match self {
            Encoded::Known(c) | Encoded::Unknown(c) => c,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, Encoded::Known(_))
    }
}

impl LabelEncoder {
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classes: Vec<String> = labels
            .into_iter()
            .map(|l| l.as_ref().trim().to_string())
            .collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Encode a label; unknown labels fall back to [`DEFAULT_LABEL_CODE`].
    pub fn encode(&self, label: &str) -> Encoded {
        match self.classes.binary_search_by(|c| c.as_str().cmp(label.trim())) {
            Ok(code) => Encoded::Known(code),
            Err(_) => Encoded::Unknown(DEFAULT_LABEL_CODE),
        }
    }

    /// Code scaled into `[0, 1]`.
    pub fn encode_unit(&self, label: &str) -> (f64, Encoded) {
        let encoded = self.encode(label);
        let denom = self.classes.len().saturating_sub(1).max(1) as f64;
        (encoded.code() as f64 / denom, encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_sorted_unique_labels() {
        let enc = LabelEncoder::fit(["Drama", "Action", "Drama", "Crime"]);
        assert_eq!(enc.classes(), &["Action", "Crime", "Drama"]);
        assert_eq!(enc.encode("Crime"), Encoded::Known(1));
        assert_eq!(enc.encode_unit("Drama").0, 1.0);
    }

    #[test]
    fn unknown_label_gets_default_code() {
        let enc = LabelEncoder::fit(["Drama"]);
        let e = enc.encode("Western");
        assert!(!e.is_known());
        assert_eq!(e.code(), DEFAULT_LABEL_CODE);
    }
}
