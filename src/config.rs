use crate::error::ConfigurationError;
use crate::util;
use std::env;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

fn default_mongodb_uri() -> String {
    env::var("MONGODB_URI").unwrap_or("mongodb://localhost:27017".to_string())
}

fn default_mongodb_db() -> String {
    env::var("MONGODB_DB_NAME").unwrap_or("clipchart".to_string())
}

fn default_class_collection() -> String {
    env::var("CLASS_COLLECTION").unwrap_or(crate::data::class::CLASS_COLLECTION_NAME.to_string())
}

fn default_storage() -> Storage {
    env::var("ROSTER_STORAGE")
        .ok()
        .and_then(|s| Storage::from_str(&s).ok())
        .unwrap_or(Storage::MongoDb)
}

/// Document store holding the class collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Storage {
    MongoDb,
    /// Process local store. Everything is lost on shutdown.
    Memory,
}

impl FromStr for Storage {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(Storage::MongoDb),
            "memory" => Ok(Storage::Memory),
            other => Err(ConfigurationError::UnknownStorage(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    file_path: PathBuf,

    #[serde(default = "default_storage")]
    pub storage: Storage,

    #[serde(default = "default_mongodb_uri")]
    pub mongodb_uri: String,
    #[serde(default = "default_mongodb_db")]
    pub mongodb_db: String,

    #[serde(default = "default_class_collection")]
    pub class_collection: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            file_path: config_dir().join("settings.yml"),
            storage: default_storage(),
            mongodb_uri: default_mongodb_uri(),
            mongodb_db: default_mongodb_db(),
            class_collection: default_class_collection(),
        }
    }
}

#[inline]
fn config_dir() -> PathBuf {
    PathBuf::from(env::var("CONFIG_DIR").unwrap_or("./config".to_string()))
}

impl Config {
    pub fn load() -> Result<Config, ConfigurationError> {
        Config::load_from(config_dir())
    }

    pub fn load_from(dir: impl AsRef<Path>) -> Result<Config, ConfigurationError> {
        let config_file = util::find_first_subpath(
            dir.as_ref(),
            &["settings.yml", "settings.yaml"],
            Path::exists,
        )
        .ok_or_else(|| ConfigurationError::NotFound(dir.as_ref().to_path_buf()))?;

        let file = File::open(&config_file)?;
        let mut config: Config = serde_yaml::from_reader(BufReader::new(file))?;
        config.file_path = config_file;

        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigurationError> {
        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.file_path)?;
        let mut out = BufWriter::new(file);
        serde_yaml::to_writer(&mut out, self)?;
        out.flush()?;
        Ok(())
    }

    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Config {
        self.file_path = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("clipchart-{}-{}", name, uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_file() {
        let dir = temp_dir("missing");
        assert!(matches!(
            Config::load_from(&dir),
            Err(ConfigurationError::NotFound(_))
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = temp_dir("saved");
        let mut config = Config::default().with_file_path(dir.join("settings.yml"));
        config.storage = Storage::Memory;
        config.class_collection = "rooms".to_string();
        config.save().unwrap();

        let loaded = Config::load_from(&dir).unwrap();
        assert_eq!(loaded.storage, Storage::Memory);
        assert_eq!(loaded.class_collection, "rooms");
        assert_eq!(loaded.mongodb_db, config.mongodb_db);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let dir = temp_dir("partial");
        std::fs::write(dir.join("settings.yaml"), "storage: memory\n").unwrap();

        let loaded = Config::load_from(&dir).unwrap();
        assert_eq!(loaded.storage, Storage::Memory);
        assert!(!loaded.mongodb_uri.is_empty());
    }

    #[test]
    fn storage_names() {
        assert_eq!(Storage::from_str("MongoDB").unwrap(), Storage::MongoDb);
        assert_eq!(Storage::from_str("memory").unwrap(), Storage::Memory);
        assert!(Storage::from_str("firestore").is_err());
    }
}
