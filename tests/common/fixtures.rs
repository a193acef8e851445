use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use synopsis_recommender::catalog::io::write_catalog;
use synopsis_recommender::catalog::{parse_genres, ClusterLabels, Titles};
use synopsis_recommender::{
    Catalog, EngineConfig, ModelBundle, MovieRecord, RecommendationEngine, Trainer, TrainingConfig,
};

pub const SHAWSHANK: &str = "Two imprisoned men bond over a number of years, finding solace and \
    eventual redemption through acts of common decency.";
/// A plot summary phrased the way a user would type it.
pub const WRONGLY_CONVICTED: &str = "A banker wrongly convicted of murder forms a decades-long \
    friendship with a hardened convict";
pub const HEIST: &str = "A crew of thieves plans an elaborate heist to rob a casino vault.";
pub const ROMANCE: &str = "An aristocrat falls in love at a ball, a forbidden romance and an \
    arranged marriage on a vast estate.";
pub const HORROR: &str = "A ghost haunts the house every night and a demon follows the family.";

pub fn movie(id: &str, title: &str, year: i32, rating: f64, genre: &str, synopsis: &str) -> MovieRecord {
    MovieRecord {
        id: id.to_string(),
        rank: 0,
        titles: Titles {
            en: title.to_string(),
            pt: None,
        },
        year,
        rating,
        genre: parse_genres(genre),
        synopsis: synopsis.to_string(),
        director: "Unknown".to_string(),
        cast: "Ensemble".to_string(),
        duration: "2h".to_string(),
        clusters: ClusterLabels::default(),
    }
}

/// Thirty movies in five groups with disjoint vocabularies:
/// prison drama, heist thriller, historical romance, space, haunted house.
pub fn catalog() -> Catalog {
    let mut records = vec![
        movie("p1", "The Long Sentence", 1994, 9.3, "Drama",
            "Two imprisoned men bond over years in a brutal prison, finding hope and redemption through common decency."),
        movie("p2", "Walls of Hope", 1999, 8.6, "Drama, Crime",
            "An imprisoned banker, wrongly convicted of murder, endures years behind prison walls, where hope, friendship and decency lead to redemption."),
        movie("p3", "The Yard", 2003, 8.2, "Crime, Drama",
            "Inmates in a prison yard bond over years of hardship; a hardened convict and an imprisoned banker share a decades-long friendship and seek redemption."),
        movie("p4", "Hurricane Years", 1999, 7.9, "Biography, Drama",
            "A boxer wrongly convicted of murder spends decades in prison, holding on to hope and fighting for redemption."),
        movie("p5", "Cell Block Nine", 2001, 7.5, "Drama",
            "Prison guards and a hardened convict bond on the cell block over years, finding decency, hope and a quiet redemption."),
        movie("p6", "Camp Nineteen", 2008, 7.2, "Drama, History",
            "An imprisoned writer survives years in a prison camp, where common decency and hope become redemption."),

        movie("h1", "Vault Eleven", 2001, 8.0, "Thriller, Crime",
            "A crew of thieves plans an elaborate heist to rob a casino vault full of money."),
        movie("h2", "Last Score", 1995, 7.8, "Crime, Thriller",
            "Professional thieves recruit a crew for a final heist on a bank vault and its money."),
        movie("h3", "Getaway", 2011, 7.4, "Action, Crime",
            "A getaway driver joins a crew of thieves whose heist on an armored vault goes wrong."),
        movie("h4", "House Edge", 2007, 7.1, "Thriller",
            "The heist crew needs to crack a casino vault before the thieves turn on each other over the money."),
        movie("h5", "Diamond Gala", 2004, 6.9, "Comedy, Crime",
            "A clumsy crew of thieves attempts a heist on a diamond vault during a casino gala."),
        movie("h6", "Night Train Job", 2013, 6.5, "Thriller, Drama",
            "Thieves plan a heist on a train carrying money, but the crew hides a traitor."),

        movie("r1", "The Winter Ball", 2005, 8.1, "Romance, Drama",
            "An aristocrat falls in love at a ball, and a forbidden romance threatens her marriage and estate."),
        movie("r2", "Letters Home", 1995, 7.7, "Romance",
            "A governess and an aristocrat exchange love letters across the estate, a romance their century forbids."),
        movie("r3", "The Painter", 2009, 7.3, "Drama, Romance",
            "In the nineteenth century a forbidden romance blooms between an aristocrat and a painter, defying marriage."),
        movie("r4", "Heiress", 2012, 7.0, "Romance, History",
            "Love letters reveal a secret romance between an heiress and an aristocrat on a country estate."),
        movie("r5", "Convenience", 2016, 6.8, "Romance",
            "A marriage of convenience on a grand estate turns into love and romance in the Regency century."),
        movie("r6", "Suitors", 2019, 6.4, "Romance, Comedy",
            "A witty aristocrat and a suitor spar at each ball until romance and love prevail."),

        movie("s1", "Wormhole", 2014, 8.4, "Sci-Fi",
            "Astronauts travel through a wormhole near a dying planet in search of a home in the galaxy."),
        movie("s2", "Stranded", 2015, 7.9, "Sci-Fi, Adventure",
            "A stranded astronaut on a hostile planet holds out until a rescue ship reaches orbit."),
        movie("s3", "Distress", 1979, 7.6, "Sci-Fi, Horror",
            "The astronauts of a mining ship in deep space answer a distress signal from an alien planet."),
        movie("s4", "Outpost", 2010, 7.2, "Sci-Fi, Action",
            "Astronauts defend an orbital station from an alien fleet at the rim of the galaxy."),
        movie("s5", "First Signal", 2016, 6.9, "Sci-Fi",
            "A ship of astronauts explores a distant planet where an alien signal waits in orbit."),
        movie("s6", "Cargo", 2018, 6.3, "Sci-Fi, Comedy",
            "Bumbling astronauts steer a cargo ship through the galaxy while an alien stowaway lurks aboard."),

        movie("g1", "The Haunting", 2013, 7.8, "Horror",
            "A family moves into a haunted house where a demon ghost stalks them every night."),
        movie("g2", "Investigators", 2016, 7.5, "Horror, Mystery",
            "Paranormal investigators confront a ghost and a demon inside a haunted house."),
        movie("g3", "The Tape", 2002, 7.1, "Horror, Thriller",
            "A cursed videotape unleashes a vengeful ghost that haunts viewers every night."),
        movie("g4", "Sleepover", 2008, 6.8, "Horror",
            "Teenagers spend the night in a haunted house and awaken an ancient demon."),
        movie("g5", "Grief", 2018, 6.4, "Horror, Drama",
            "A grieving mother senses a ghost in the haunted house as her family unravels at night."),
        movie("g6", "Roommates", 2020, 6.0, "Horror, Comedy",
            "Roommates discover their rented house is haunted by a ghost and a prankster demon."),
    ];
    for (i, r) in records.iter_mut().enumerate() {
        r.rank = i as u32 + 1;
    }
    Catalog::new(records).expect("fixture catalog is valid")
}

pub fn training_config() -> TrainingConfig {
    TrainingConfig {
        n_clusters: 5,
        ..TrainingConfig::default()
    }
}

pub fn train() -> ModelBundle {
    Trainer::new(training_config())
        .train(&catalog())
        .expect("fixture catalog trains")
}

/// One trained bundle shared by every test in a binary.
pub fn shared_bundle() -> Arc<ModelBundle> {
    static BUNDLE: OnceLock<Arc<ModelBundle>> = OnceLock::new();
    BUNDLE.get_or_init(|| Arc::new(train())).clone()
}

pub fn engine() -> RecommendationEngine {
    RecommendationEngine::from_handle(shared_bundle(), EngineConfig::default())
}

pub fn engine_with(config: EngineConfig) -> RecommendationEngine {
    RecommendationEngine::from_handle(shared_bundle(), config)
}

/// Write the fixture catalog as a raw producer CSV under `dir`.
pub fn write_fixture_csv(dir: &Path) -> PathBuf {
    let path = dir.join("catalog.csv");
    write_catalog(&catalog(), &path).expect("write fixture catalog");
    path
}
