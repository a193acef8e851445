mod common;

use std::collections::HashSet;

use proptest::prelude::*;

use common::fixtures;
use synopsis_recommender::catalog::retrieval::rank_diverse;
use synopsis_recommender::cluster::confidence;
use synopsis_recommender::{Catalog, Method, RecommendationEngine, RecommendationRequest};

const WORDS: &[&str] = &[
    "prison", "hope", "redemption", "heist", "vault", "thieves", "romance", "aristocrat", "estate",
    "astronauts", "planet", "alien", "ghost", "haunted", "demon", "the", "and", "banana", "zeppelin",
];

const GENRES: &[&str] = &["Drama", "Crime", "Horror", "Comedy", "Romance"];

fn engine() -> &'static RecommendationEngine {
    static ENGINE: std::sync::OnceLock<RecommendationEngine> = std::sync::OnceLock::new();
    ENGINE.get_or_init(fixtures::engine)
}

fn synopsis() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), 1..12).prop_map(|w| w.join(" "))
}

fn genre_catalog(genres: &[usize], ratings: &[u8]) -> Catalog {
    let records = genres
        .iter()
        .zip(ratings)
        .enumerate()
        .map(|(i, (&g, &r))| {
            fixtures::movie(&format!("m{i}"), "T", 2000, f64::from(r) / 10.0, GENRES[g], "")
        })
        .collect();
    Catalog::new(records).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn pt_confidence_in_unit_interval(distance in 0.0_f64..1e6) {
        let c = confidence(distance);
        prop_assert!(c > 0.0 && c <= 1.0);
        prop_assert!(confidence(distance + 1.0) < c);
    }

    #[test]
    fn pt_response_length_and_confidence(text in synopsis(), use_b in any::<bool>(), n in 1_usize..40) {
        let method = if use_b { Method::VectorB } else { Method::VectorA };
        let engine = engine();
        let mut config = engine.config().clone();
        config.recommendations = n;
        let engine = fixtures::engine_with(config);
        let resp = engine.recommend(&RecommendationRequest::new(text).with_method(method)).unwrap();
        prop_assert_eq!(resp.recommendations.len(), n.min(30));
        prop_assert!(resp.confidence > 0.0 && resp.confidence <= 1.0);
        prop_assert!(resp.cluster.unwrap() < 5);
        let ids: HashSet<&str> = resp.recommendations.iter().map(|m| m.id.as_str()).collect();
        prop_assert_eq!(ids.len(), resp.recommendations.len());
    }

    #[test]
    fn pt_same_request_same_cluster(text in synopsis()) {
        let engine = engine();
        let request = RecommendationRequest::new(text);
        let a = engine.recommend(&request).unwrap();
        let b = engine.recommend(&request).unwrap();
        prop_assert_eq!(a.cluster, b.cluster);
        prop_assert_eq!(a.confidence, b.confidence);
    }

    #[test]
    fn pt_diversity_law(
        cells in prop::collection::vec((0_usize..GENRES.len(), 0_u8..=100), 1..25),
        n in 1_usize..10,
    ) {
        let (genres, ratings): (Vec<usize>, Vec<u8>) = cells.into_iter().unzip();
        let catalog = genre_catalog(&genres, &ratings);
        let all: Vec<usize> = (0..catalog.len()).collect();
        let candidates = catalog.sort_by_rating(&all);
        let picked = rank_diverse(&catalog, &candidates, n, 3);

        prop_assert_eq!(picked.len(), n.min(candidates.len()));
        let unique: HashSet<usize> = picked.iter().copied().collect();
        prop_assert_eq!(unique.len(), picked.len());

        let primary = |p: usize| catalog.get(p).unwrap().primary_genre().to_string();
        let distinct: HashSet<String> = candidates.iter().map(|&p| primary(p)).collect();
        if distinct.len() >= 3 {
            let lead = n.min(distinct.len());
            let lead_genres: HashSet<String> = picked[..lead].iter().map(|&p| primary(p)).collect();
            prop_assert_eq!(lead_genres.len(), lead);
            // the first pick is always the best rated candidate
            prop_assert_eq!(picked[0], candidates[0]);
        } else {
            prop_assert_eq!(&picked[..], &candidates[..picked.len()]);
        }
    }
}
