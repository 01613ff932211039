use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path to the movie catalog CSV (movieId, normalized_title, genres, mode_rating)
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Path to the precomputed similarity matrix CSV.
    /// When unset the matrix is derived from catalog genres at start-up.
    #[serde(default)]
    pub similarity_path: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of movies returned when a request does not ask for a specific count
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
}

fn default_catalog_path() -> String {
    "data/movies_with_mode.csv".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_top_k() -> usize {
    crate::services::DEFAULT_TOP_K
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
