use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use synopsis_recommender::catalog::{parse_genres, ClusterLabels, Titles};
use synopsis_recommender::{
    Catalog, EngineConfig, Method, MovieRecord, RecommendationEngine, RecommendationRequest, Trainer,
    TrainingConfig,
};

const THEMES: &[(&str, &[&str])] = &[
    ("Drama", &["prison", "imprisoned", "redemption", "hope", "inmates", "years", "decency", "friendship"]),
    ("Thriller", &["heist", "vault", "thieves", "crew", "casino", "money", "robbery", "getaway"]),
    ("Romance", &["aristocrat", "love", "romance", "estate", "marriage", "ball", "letters", "century"]),
    ("Sci-Fi", &["astronauts", "planet", "alien", "galaxy", "orbit", "ship", "signal", "station"]),
    ("Horror", &["ghost", "haunted", "demon", "house", "night", "curse", "family", "spirit"]),
];

// 決定的な合成カタログ (テーマごとに語彙を分ける)
fn synthetic_catalog(size: usize) -> Catalog {
    let records = (0..size)
        .map(|i| {
            let (genre, words) = THEMES[i % THEMES.len()];
            let synopsis: Vec<&str> = (0..12).map(|j| words[(i * 7 + j * 3) % words.len()]).collect();
            MovieRecord {
                id: format!("m{i}"),
                rank: i as u32 + 1,
                titles: Titles { en: format!("Movie {i}"), pt: None },
                year: 1970 + (i % 50) as i32,
                rating: 5.0 + (i % 50) as f64 / 10.0,
                genre: parse_genres(genre),
                synopsis: synopsis.join(" "),
                director: String::new(),
                cast: String::new(),
                duration: String::new(),
                clusters: ClusterLabels::default(),
            }
        })
        .collect();
    Catalog::new(records).expect("synthetic catalog")
}

fn train_benchmark(c: &mut Criterion) {
    let catalog = synthetic_catalog(500);
    let trainer = Trainer::new(TrainingConfig {
        n_init: 3,
        ..TrainingConfig::default()
    });
    c.bench_function("train_500", |b| {
        b.iter(|| trainer.train(black_box(&catalog)).expect("train"))
    });
}

fn recommend_benchmark(c: &mut Criterion) {
    let catalog = synthetic_catalog(500);
    let bundle = Trainer::default().train(&catalog).expect("train");
    let engine = RecommendationEngine::from_handle(Arc::new(bundle), EngineConfig::default());
    let request_a = RecommendationRequest::new(
        "Two imprisoned men bond over years, finding redemption through common decency.",
    );
    let request_b = request_a.clone().with_method(Method::VectorB);

    c.bench_function("recommend_vector_a", |b| {
        b.iter(|| engine.recommend(black_box(&request_a)).expect("recommend"))
    });
    c.bench_function("recommend_vector_b", |b| {
        b.iter(|| engine.recommend(black_box(&request_b)).expect("recommend"))
    });
}

criterion_group!(benches, train_benchmark, recommend_benchmark);
criterion_main!(benches);
