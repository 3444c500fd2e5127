use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::app::{PlapriceError, Result};
use crate::domain::Shop;
use crate::store::Store;

#[derive(Deserialize)]
struct ShopFile {
    #[serde(default)]
    shops: Vec<Shop>,
}

#[derive(Serialize)]
struct ShopFileRef<'a> {
    shops: &'a [Shop],
}

/// Shop list kept in a pretty-printed `{"shops": [...]}` JSON file.
///
/// Every change is written through immediately. Shops keep insertion order.
pub struct JsonStore {
    path: Option<PathBuf>,
    shops: Mutex<Vec<Shop>>,
}

impl JsonStore {
    /// Open the store at `path`. A missing file is an empty store and is
    /// created on the first change.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let shops = Self::load(&path)?;
        tracing::debug!("Loaded {} shops from {}", shops.len(), path.display());

        Ok(Self {
            path: Some(path),
            shops: Mutex::new(shops),
        })
    }

    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            shops: Mutex::new(Vec::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn load(path: &Path) -> Result<Vec<Shop>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path)?;
        match serde_json::from_str::<ShopFile>(&content) {
            Ok(file) => Ok(file.shops),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable shop file {}: {}",
                    path.display(),
                    e
                );
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, shops: &[Shop]) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&ShopFileRef { shops })?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Shop>>> {
        self.shops
            .lock()
            .map_err(|e| PlapriceError::Other(format!("shop store lock poisoned: {e}")))
    }

    /// Apply `change` to a copy of the list and keep it only if it saves.
    fn commit<T>(&self, change: impl FnOnce(&mut Vec<Shop>) -> Result<T>) -> Result<T> {
        let mut shops = self.lock()?;
        let mut next = shops.clone();
        let value = change(&mut next)?;
        self.save(&next)?;
        *shops = next;
        Ok(value)
    }
}

impl Store for JsonStore {
    fn add_shop(&self, shop: &Shop) -> Result<()> {
        shop.validate()?;
        self.commit(|shops| {
            if shops.iter().any(|s| s.id == shop.id) {
                return Err(PlapriceError::DuplicateShop(shop.id.clone()));
            }
            shops.push(shop.clone());
            Ok(())
        })
    }

    fn get_shop(&self, id: &str) -> Result<Option<Shop>> {
        Ok(self.lock()?.iter().find(|s| s.id == id).cloned())
    }

    fn update_shop(&self, shop: &Shop) -> Result<Shop> {
        shop.validate()?;
        self.commit(|shops| {
            let slot = shops
                .iter_mut()
                .find(|s| s.id == shop.id)
                .ok_or_else(|| PlapriceError::ShopNotFound(shop.id.clone()))?;

            let mut updated = shop.clone();
            updated.created_at = slot.created_at;
            updated.updated_at = Utc::now();
            *slot = updated.clone();
            Ok(updated)
        })
    }

    fn remove_shop(&self, id: &str) -> Result<bool> {
        self.commit(|shops| {
            let before = shops.len();
            shops.retain(|s| s.id != id);
            Ok(shops.len() != before)
        })
    }

    fn set_enabled(&self, id: &str, enabled: bool) -> Result<bool> {
        self.commit(|shops| match shops.iter_mut().find(|s| s.id == id) {
            Some(shop) => {
                shop.enabled = enabled;
                shop.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        })
    }

    fn list_shops(&self) -> Result<Vec<Shop>> {
        Ok(self.lock()?.clone())
    }
}
