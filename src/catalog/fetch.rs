use thiserror::Error;

use crate::catalog::Catalog;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("catalog request failed: {0}")]
    Http(#[from] ureq::Error),
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// Where the catalog document comes from. The one production implementation
/// is an HTTPS GET; tests inject counting or failing sources.
pub trait CatalogSource: Send + Sync {
    fn fetch(&self) -> Result<Catalog>;
}

/// Fetches the catalog JSON document over HTTPS. A non-2xx status or a body
/// that fails to parse as a pack array both surface as `FetchError`.
pub struct HttpCatalogSource {
    url: String,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl CatalogSource for HttpCatalogSource {
    fn fetch(&self) -> Result<Catalog> {
        log::debug!("Fetching catalog from {}", self.url);
        let catalog: Catalog = ureq::get(&self.url).call()?.body_mut().read_json()?;
        log::info!(
            "Fetched catalog: {} packs, {} loops",
            catalog.packs.len(),
            catalog.loop_count()
        );
        Ok(catalog)
    }
}
