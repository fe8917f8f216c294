extern crate tracing_futures;

#[macro_use]
extern crate rocket;
#[macro_use]
extern crate serde;

use mongodb::Client;
use rocket::http::Method;
use rocket::Rocket;
use rocket_cors::{AllowedHeaders, AllowedOrigins};
use tokio::sync::Mutex;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::{Config, Storage};
use crate::error::{BackendError, ConfigurationError};
use crate::roster::Roster;
use crate::route::mount_api;
use crate::session::Session;
use crate::store::{AnyStore, MemoryStore, MongoStore};

pub mod config;
pub mod data;
pub mod error;
pub mod resp;
pub mod roster;
pub mod route;
pub mod search;
pub mod session;
pub mod store;
pub mod util;
pub mod view;

pub async fn create(log_level: Option<Level>) -> Result<Rocket<rocket::Build>, BackendError> {
    if let Some(l) = log_level {
        let subscriber = FmtSubscriber::builder().with_max_level(l).finish();

        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Unable to set global logger: {}", err);
        };
        if let Err(err) = tracing_log::LogTracer::init() {
            eprintln!("Unable to forward log records: {}", err);
        }
    }

    tracing::info!("Reading .env file...");
    if dotenv::dotenv().is_err() {
        tracing::warn!("Unable to load .env file.");
    }

    tracing::info!("Loading configuration...");
    let c = match Config::load() {
        Ok(c) => {
            tracing::info!("Configuration loaded.");
            c
        }
        Err(ConfigurationError::NotFound(_)) => {
            let c = Config::default();
            if c.save().is_err() {
                tracing::warn!("Unable to save generated configuration.");
            }
            c
        }
        Err(other) => {
            tracing::error!("Configuration error: {}", other);
            return Err(other.into());
        }
    };

    let store = match c.storage {
        Storage::MongoDb => AnyStore::from(connect_mongodb(&c).await?),
        Storage::Memory => {
            tracing::warn!("Using in-memory storage. Roster won't survive a restart.");
            AnyStore::from(MemoryStore::new())
        }
    };

    build(c, store)
}

async fn connect_mongodb(c: &Config) -> Result<MongoStore, BackendError> {
    tracing::info!("Connecting to MongoDB: {}", c.mongodb_uri);
    let client = Client::with_uri_str(c.mongodb_uri.as_str()).await?;

    tracing::info!("Using MongoDB database: {}", c.mongodb_db);
    let db = client.database(c.mongodb_db.as_str());

    if let Err(err) = db.list_collection_names(None).await {
        tracing::error!("Unable to connect to MongoDB.");
        return Err(err.into());
    }

    Ok(MongoStore::new(db))
}

/// Assembles the HTTP server around an already connected store.
pub fn build(c: Config, store: AnyStore) -> Result<Rocket<rocket::Build>, BackendError> {
    let roster = Roster::with_collection(store, c.class_collection.clone());
    let session = Mutex::new(Session::new(roster));

    tracing::info!("Starting HTTP server...");
    let mut r = rocket::build().manage(c).manage(session);

    tracing::info!("Setting up CORS...");
    let allowed_origins = AllowedOrigins::All;

    let cors = rocket_cors::CorsOptions {
        allowed_origins,
        allowed_methods: vec![
            Method::Get,
            Method::Put,
            Method::Post,
            Method::Patch,
            Method::Delete,
        ]
        .into_iter()
        .map(From::from)
        .collect(),
        allowed_headers: AllowedHeaders::All,
        allow_credentials: true,
        ..Default::default()
    }
    .to_cors()?;

    r = r.attach(cors);
    r = mount_api(r);

    Ok(r)
}
