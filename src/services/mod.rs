pub mod fuzzy;
pub mod recommender;

pub use fuzzy::{ApproximateMatcher, FuzzyMatch, WeightedRatio};
pub use recommender::{
    MatchTier, Recommender, Resolution, DEFAULT_TOP_K, FUZZY_MATCH_THRESHOLD,
};
