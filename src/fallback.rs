//! Keyword classifier used when no model bundle can be loaded.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::text::normalizer::TextNormalizer;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// seed for category choice and sampling
    pub seed: u64,
    /// confidence reported with every fallback answer
    pub confidence: f64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            confidence: 0.5,
        }
    }
}

/// Category names and keywords, in tie-break order.
pub const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "acao",
        &[
            "ação", "luta", "combate", "guerra", "soldado", "batalha", "vigilante", "mascarado",
            "criminoso", "justiça", "vingança", "action", "fight", "combat", "war", "soldier",
            "battle", "masked", "criminal", "justice", "revenge",
        ],
    ),
    (
        "drama",
        &[
            "drama", "emocional", "família", "relacionamento", "amor", "paixão", "jovem",
            "diferente", "preconceito", "obstáculo", "emotional", "family", "relationship", "love",
            "passion", "young", "different", "prejudice", "obstacle",
        ],
    ),
    (
        "ficcao",
        &[
            "ficção", "científica", "espaço", "astronauta", "universo", "futuro", "tecnologia",
            "mágico", "poder", "reino", "fiction", "scientific", "space", "astronaut", "universe",
            "future", "technology", "magic", "power", "kingdom",
        ],
    ),
    (
        "terror",
        &[
            "terror", "assombrado", "espírito", "sobrenatural", "morte", "assassinato", "mistério",
            "detetive", "investigação", "horror", "haunted", "spirit", "supernatural", "death",
            "murder", "mystery", "detective", "investigation",
        ],
    ),
    (
        "comedia",
        &[
            "comédia", "hilário", "cômico", "viagem", "amigo", "situação", "mal-entendido",
            "musical", "cantora", "famoso", "comedy", "hilarious", "comic", "trip", "friend",
            "situation", "misunderstanding", "singer", "famous",
        ],
    ),
];

#[derive(Debug, Clone, PartialEq)]
pub struct FallbackCategory {
    pub name: String,
    /// normalized keyword prefixes
    pub keywords: Vec<String>,
    /// catalog positions, catalog order
    pub members: Vec<usize>,
}

impl FallbackCategory {
    /// Number of tokens starting with one of the keywords.
    fn score(&self, tokens: &[String]) -> usize {
        tokens
            .iter()
            .filter(|t| self.keywords.iter().any(|k| t.starts_with(k.as_str())))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub category: usize,
    pub name: String,
    pub scores: Vec<usize>,
    /// false when no keyword matched and the category was drawn at random
    pub matched: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FallbackRecommendation {
    pub classification: Classification,
    pub positions: Vec<usize>,
    pub notes: Vec<String>,
}

/// Keyword buckets over a catalog with seeded sampling.
#[derive(Debug, Clone)]
pub struct FallbackClassifier {
    categories: Vec<FallbackCategory>,
    /// positions in no category, by rating desc
    uncategorized: Vec<usize>,
    normalizer: TextNormalizer,
    config: FallbackConfig,
}

impl FallbackClassifier {
    /// Build the buckets with one scan of the catalog over
    /// `synopsis + title_pt + genre`.
    pub fn new(catalog: &Catalog, normalizer: TextNormalizer, config: FallbackConfig) -> Self {
        let mut categories: Vec<FallbackCategory> = CATEGORIES
            .iter()
            .map(|(name, words)| {
                let mut seen = HashSet::new();
                let keywords = words
                    .iter()
                    .flat_map(|w| normalizer.tokens(w))
                    .filter(|k| seen.insert(k.clone()))
                    .collect();
                FallbackCategory {
                    name: name.to_string(),
                    keywords,
                    members: Vec::new(),
                }
            })
            .collect();

        let mut uncategorized = Vec::new();
        for (pos, record) in catalog.iter().enumerate() {
            let text = format!(
                "{} {} {}",
                record.synopsis,
                record.titles.pt.as_deref().unwrap_or(""),
                record.genre_string()
            );
            let tokens = normalizer.tokens(&text);
            let scores: Vec<usize> = categories.iter().map(|c| c.score(&tokens)).collect();
            match best(&scores) {
                Some(c) => categories[c].members.push(pos),
                None => uncategorized.push(pos),
            }
        }
        let uncategorized = catalog.sort_by_rating(&uncategorized);

        tracing::debug!(
            sizes = ?categories.iter().map(|c| c.members.len()).collect::<Vec<_>>(),
            uncategorized = uncategorized.len(),
            "fallback categories built"
        );

        Self {
            categories,
            uncategorized,
            normalizer,
            config,
        }
    }

    pub fn categories(&self) -> &[FallbackCategory] {
        &self.categories
    }

    pub fn config(&self) -> &FallbackConfig {
        &self.config
    }

    /// Highest keyword score wins, ties by category order. Without any match
    /// the category is drawn with the configured seed.
    pub fn classify(&self, text: &str) -> Classification {
        let tokens = self.normalizer.tokens(text);
        let scores: Vec<usize> = self.categories.iter().map(|c| c.score(&tokens)).collect();
        let (category, matched) = match best(&scores) {
            Some(c) => (c, true),
            None => {
                let mut rng = StdRng::seed_from_u64(self.config.seed);
                (rng.gen_range(0..self.categories.len()), false)
            }
        };
        Classification {
            category,
            name: self.categories[category].name.clone(),
            scores,
            matched,
        }
    }

    /// Up to `n` catalog positions for `text`.
    pub fn recommend(&self, catalog: &Catalog, text: &str, n: usize) -> FallbackRecommendation {
        let classification = self.classify(text);
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut notes = Vec::new();
        if !classification.matched {
            notes.push(format!(
                "no category keyword matched; picked {:?} with a fixed seed",
                classification.name
            ));
        }

        let own = &self.categories[classification.category].members;
        let mut positions: Vec<usize> = if own.len() >= n {
            own.choose_multiple(&mut rng, n).copied().collect()
        } else {
            let mut union: Vec<usize> = self
                .categories
                .iter()
                .flat_map(|c| c.members.iter().copied())
                .collect();
            union.sort();
            notes.push(format!(
                "category {:?} has only {} movies; sampled from all categories",
                classification.name,
                own.len()
            ));
            union.choose_multiple(&mut rng, n.min(union.len())).copied().collect()
        };

        if positions.len() < n {
            let before = positions.len();
            positions.extend(self.uncategorized.iter().copied().take(n - before));
            notes.push(format!(
                "added {} top rated uncategorized movies",
                positions.len() - before
            ));
        }
        positions.truncate(n.min(catalog.len()));

        FallbackRecommendation {
            classification,
            positions,
            notes,
        }
    }
}

/// Index of the highest positive score; first wins ties.
fn best(scores: &[usize]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (i, &s) in scores.iter().enumerate() {
        if s == 0 {
            continue;
        }
        match best {
            Some((_, b)) if s <= b => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::movie;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            movie("w1", 8.0, "War", "soldiers fight a brutal battle"),
            movie("w2", 7.5, "War", "a soldier seeks revenge"),
            movie("s1", 8.5, "Sci-Fi", "astronauts travel through space"),
            movie("s2", 7.0, "Sci-Fi", "the future of technology"),
            movie("h1", 7.8, "Horror", "a haunted house and a murder mystery"),
            movie("x1", 9.0, "Documentary", "bees make honey"),
        ])
        .unwrap()
    }

    fn classifier(cat: &Catalog) -> FallbackClassifier {
        FallbackClassifier::new(cat, TextNormalizer::default(), FallbackConfig::default())
    }

    #[test]
    fn membership_uses_best_category() {
        let cat = catalog();
        let fc = classifier(&cat);
        assert_eq!(fc.categories()[0].members, vec![0, 1]);
        assert_eq!(fc.categories()[2].members, vec![2, 3]);
        assert_eq!(fc.categories()[3].members, vec![4]);
        assert_eq!(fc.uncategorized, vec![5]);
    }

    #[test]
    fn classify_prefers_higher_score_then_order() {
        let cat = catalog();
        let fc = classifier(&cat);
        let c = fc.classify("Astronauts explore space and fight");
        assert_eq!(c.name, "ficcao");
        assert!(c.matched);
        // one hit each for acao and ficcao
        assert_eq!(fc.classify("fight in space").name, "acao");
    }

    #[test]
    fn unmatched_text_is_deterministic() {
        let cat = catalog();
        let fc = classifier(&cat);
        let a = fc.classify("bees honey");
        let b = fc.classify("bees honey");
        assert!(!a.matched);
        assert_eq!(a, b);
    }

    #[test]
    fn short_category_samples_union_then_uncategorized() {
        let cat = catalog();
        let fc = classifier(&cat);
        let r = fc.recommend(&cat, "haunted mansion", 2);
        assert_eq!(r.classification.name, "terror");
        assert_eq!(r.positions.len(), 2);
        let all = fc.recommend(&cat, "haunted mansion", 10);
        assert_eq!(all.positions.len(), cat.len());
        assert_eq!(*all.positions.last().unwrap(), 5);
        let again = fc.recommend(&cat, "haunted mansion", 2);
        assert_eq!(again.positions, r.positions);
    }

    #[test]
    fn full_category_samples_only_its_members() {
        let cat = catalog();
        let fc = classifier(&cat);
        let r = fc.recommend(&cat, "a soldier at war", 2);
        let mut got = r.positions.clone();
        got.sort();
        assert_eq!(got, vec![0, 1]);
    }
}
