use crate::error::CleanError;
use crate::record::CatalogEntry;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Synonym table for catalog headers. Input must already be lowercased
/// with spaces collapsed to underscores.
fn catalog_alias(name: &str) -> &str {
    match name {
        "id" | "id_produit" | "produit_id" => "product_id",
        "product" | "nom_produit" | "name" => "product_name",
        "categorie" | "catégorie" => "category",
        other => other,
    }
}

/// Read-only product reference data, keyed by `product_id`.
///
/// Pre-deduplicated on load (first row wins), so the left join can never
/// multiply transaction rows.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    entries: HashMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load and normalize the catalog. A missing file yields an empty
    /// catalog, and joins then proceed with empty name/category on every
    /// record. Name and category columns absent from the source default
    /// to the empty string.
    pub fn load(path: &Path) -> Result<Self, CleanError> {
        if !path.exists() {
            warn!(path = %path.display(), "catalog file not found, enrichment will be empty");
            return Ok(Self::empty());
        }

        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|source| CleanError::Csv {
                file: file.clone(),
                source,
            })?;

        let header = reader
            .headers()
            .map_err(|source| CleanError::Csv {
                file: file.clone(),
                source,
            })?
            .clone();
        let mut id_col = None;
        let mut name_col = None;
        let mut category_col = None;
        for (i, raw) in header.iter().enumerate() {
            let canonical = catalog_alias(&raw.trim().to_lowercase().replace(' ', "_")).to_string();
            match canonical.as_str() {
                "product_id" => id_col.get_or_insert(i),
                "product_name" => name_col.get_or_insert(i),
                "category" => category_col.get_or_insert(i),
                _ => continue,
            };
        }

        let mut entries: HashMap<String, CatalogEntry> = HashMap::new();
        for record in reader.records() {
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    warn!(file = %file, error = %e, "skipping unreadable catalog row");
                    continue;
                }
            };
            let field = |col: Option<usize>| {
                col.and_then(|i| record.get(i))
                    .unwrap_or_default()
                    .trim()
                    .to_string()
            };
            let product_id = field(id_col);
            if product_id.is_empty() {
                continue;
            }
            entries
                .entry(product_id.clone())
                .or_insert_with(|| CatalogEntry {
                    product_id,
                    product_name: field(name_col),
                    category: field(category_col),
                });
        }

        info!(file = %file, products = entries.len(), "catalog loaded");
        Ok(Self { entries })
    }

    pub fn get(&self, product_id: &str) -> Option<&CatalogEntry> {
        self.entries.get(product_id.trim())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_catalog(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn normalizes_french_catalog_headers() {
        let file = write_catalog("id_produit,nom_produit,categorie\nP1,Clavier,Informatique\n");
        let catalog = Catalog::load(file.path()).unwrap();
        let entry = catalog.get("P1").unwrap();
        assert_eq!(entry.product_name, "Clavier");
        assert_eq!(entry.category, "Informatique");
    }

    #[test]
    fn missing_file_yields_empty_catalog() {
        let catalog = Catalog::load(Path::new("/nonexistent/catalogue.csv")).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn missing_columns_default_to_empty_strings() {
        let file = write_catalog("id\nP1\nP2\n");
        let catalog = Catalog::load(file.path()).unwrap();
        let entry = catalog.get("P2").unwrap();
        assert_eq!(entry.product_name, "");
        assert_eq!(entry.category, "");
    }

    #[test]
    fn duplicate_product_ids_keep_the_first_row() {
        let file = write_catalog("id,name,category\nP1,First,A\nP1,Second,B\n");
        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("P1").unwrap().product_name, "First");
    }
}
