use std::{env, io::Read, path::PathBuf, process::ExitCode, time::Instant};

use synopsis_recommender::{
    catalog::io::read_catalog, logging::init_tracing, EngineConfig, ModelStore, RecommendationEngine,
    Trainer, TrainingConfig,
};

fn main() -> ExitCode {
    let engine_config = EngineConfig::from_env();
    init_tracing(&engine_config.log);

    let mut args = env::args().skip(1);
    let command = match args.next() {
        Some(c) => c,
        None => {
            print_usage();
            return ExitCode::FAILURE;
        }
    };
    let rest: Vec<String> = args.collect();
    match command.as_str() {
        "train" => match rest.as_slice() {
            [catalog, root] => run_train(PathBuf::from(catalog), PathBuf::from(root)),
            _ => {
                eprintln!("[error] train requires <catalog> <bundle_root>");
                ExitCode::FAILURE
            }
        },
        "recommend" => match rest.as_slice() {
            [root] => run_recommend(engine_config, PathBuf::from(root), None),
            [root, json] => run_recommend(engine_config, PathBuf::from(root), Some(json.clone())),
            _ => {
                eprintln!("[error] recommend requires <bundle_root> [request-json]");
                ExitCode::FAILURE
            }
        },
        "-h" | "--help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        other => {
            eprintln!("[error] unknown command: {other}");
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    eprintln!("Usage: synopsis-recommender train <catalog.csv|catalog.json> <bundle_root>");
    eprintln!("       synopsis-recommender recommend <bundle_root> [request-json]");
    eprintln!("If request-json is omitted, stdin is read. The response is printed as JSON.");
}

fn run_train(catalog_path: PathBuf, root: PathBuf) -> ExitCode {
    let start = Instant::now();
    let catalog = match read_catalog(&catalog_path) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(path = %catalog_path.display(), error = %e, "failed to read catalog");
            return ExitCode::FAILURE;
        }
    };
    let trainer = Trainer::new(TrainingConfig::from_env());
    let bundle = match trainer.train(&catalog) {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(error = %e, "training failed");
            return ExitCode::FAILURE;
        }
    };
    match ModelStore::new(&root).save(&bundle) {
        Ok(version) => {
            tracing::info!(
                version = %version,
                root = %root.display(),
                elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                "bundle saved"
            );
            println!("{version}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to save bundle");
            ExitCode::FAILURE
        }
    }
}

fn run_recommend(mut config: EngineConfig, root: PathBuf, json: Option<String>) -> ExitCode {
    config.bundle_root = root;
    let json = match json {
        Some(j) => j,
        None => {
            let mut buf = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut buf) {
                eprintln!("[error] failed to read stdin: {e}");
                return ExitCode::FAILURE;
            }
            buf
        }
    };
    let engine = match RecommendationEngine::start(config) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!(error = %e, "engine could not start");
            return ExitCode::FAILURE;
        }
    };
    let start = Instant::now();
    let response = engine.recommend_json(&json);
    tracing::debug!(elapsed_ms = start.elapsed().as_secs_f64() * 1000.0, "request answered");
    match serde_json::to_string_pretty(&response) {
        Ok(out) => {
            println!("{out}");
            if response.is_error() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("[error] failed to encode response: {e}");
            ExitCode::FAILURE
        }
    }
}
