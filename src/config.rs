use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path to the JSON catalog snapshot (movies + embeddings)
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Redis connection URL, used for poster caching
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// TMDB API read access token; posters are disabled when unset
    #[serde(default)]
    pub tmdb_token: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// TMDB poster size segment (e.g. "w500")
    #[serde(default = "default_tmdb_poster_size")]
    pub tmdb_poster_size: String,

    /// Number of recommendations when the request does not specify one
    #[serde(default = "default_top_n")]
    pub default_top_n: usize,

    /// Upper bound on requested recommendations
    #[serde(default = "default_max_top_n")]
    pub max_top_n: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_catalog_path() -> String {
    "data/catalog.json".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_poster_size() -> String {
    "w500".to_string()
}

fn default_top_n() -> usize {
    6
}

fn default_max_top_n() -> usize {
    10
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.default_top_n == 0 || self.default_top_n > self.max_top_n {
            anyhow::bail!(
                "DEFAULT_TOP_N must be between 1 and MAX_TOP_N ({}), got {}",
                self.max_top_n,
                self.default_top_n
            );
        }
        Ok(())
    }

    /// Address string for binding the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
