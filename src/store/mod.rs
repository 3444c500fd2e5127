pub mod json;

use crate::app::Result;
use crate::domain::Shop;

pub use json::JsonStore;

pub trait Store {
    /// Validate and append a shop. Fails on an invalid shop or a reused id.
    fn add_shop(&self, shop: &Shop) -> Result<()>;
    fn get_shop(&self, id: &str) -> Result<Option<Shop>>;
    /// Validate and replace the shop with the same id, returning the stored copy.
    fn update_shop(&self, shop: &Shop) -> Result<Shop>;
    fn remove_shop(&self, id: &str) -> Result<bool>;
    fn set_enabled(&self, id: &str, enabled: bool) -> Result<bool>;
    fn list_shops(&self) -> Result<Vec<Shop>>;

    fn list_enabled_shops(&self) -> Result<Vec<Shop>> {
        Ok(self
            .list_shops()?
            .into_iter()
            .filter(|shop| shop.enabled)
            .collect())
    }
}
