//! mudcore - object registry and persistence core for a multi-user text world
//!
//! Every world entity (area, room, character, item, exit, event) is a
//! uniquely identified [`objects::GameObject`] owned by the process-wide
//! [`realm::Realm`]. Other code refers to entities only through
//! [`objects::GameObjectRef`] handles that resolve lazily and heal to null
//! when their target is destroyed. Mutations mark an object modified and
//! enqueue it with a background sync worker that serializes it to disk
//! without ever blocking the simulation.

pub mod objects;
pub mod persist;
pub mod realm;
pub mod sync;
pub mod world;

use std::path::PathBuf;

use anyhow::Result;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub use objects::{
    GameObject, GameObjectId, GameObjectRef, GameObjectType, Value, ValueKind, Vector3D,
};
pub use realm::Realm;

/// Realm configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Realm-scoped save directory; object records live in `<save_dir>/objects`
    pub save_dir: PathBuf,
    /// Bounded wait for the sync worker to drain its queue on shutdown
    pub sync_shutdown_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("world"),
            sync_shutdown_timeout_secs: 5,
        }
    }
}

impl Config {
    /// Load configuration from `mudcore.toml` with `MUDCORE_`-prefixed
    /// environment overrides on top of the defaults
    pub fn load() -> Result<Self> {
        let config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("mudcore.toml"))
            .merge(Env::prefixed("MUDCORE_"))
            .extract()?;
        Ok(config)
    }

    /// Config rooted at the given save directory, defaults elsewhere
    pub fn with_save_dir(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.save_dir, PathBuf::from("world"));
        assert_eq!(config.sync_shutdown_timeout_secs, 5);
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string("save_dir = \"/srv/realm\""))
            .extract()
            .unwrap();
        assert_eq!(config.save_dir, PathBuf::from("/srv/realm"));
        // untouched keys keep their defaults
        assert_eq!(config.sync_shutdown_timeout_secs, 5);
    }
}
