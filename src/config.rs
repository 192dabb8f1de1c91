use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the trained model artifacts
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    #[serde(default = "default_catalog_file")]
    pub catalog_file: String,

    #[serde(default = "default_similarity_file")]
    pub similarity_file: String,

    #[serde(default = "default_vectorizer_file")]
    pub vectorizer_file: String,

    #[serde(default = "default_classifier_file")]
    pub classifier_file: String,

    /// Number of similar titles returned per request
    #[serde(default = "default_recommendation_count")]
    pub recommendation_count: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("./models")
}

fn default_catalog_file() -> String {
    "catalog.json".to_string()
}

fn default_similarity_file() -> String {
    "similarity.json".to_string()
}

fn default_vectorizer_file() -> String {
    "vectorizer.json".to_string()
}

fn default_classifier_file() -> String {
    "classifier.json".to_string()
}

fn default_recommendation_count() -> usize {
    5
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.model_dir.join(&self.catalog_file)
    }

    pub fn similarity_path(&self) -> PathBuf {
        self.model_dir.join(&self.similarity_file)
    }

    pub fn vectorizer_path(&self) -> PathBuf {
        self.model_dir.join(&self.vectorizer_file)
    }

    pub fn classifier_path(&self) -> PathBuf {
        self.model_dir.join(&self.classifier_file)
    }
}
