use crate::catalog::schema::ChartCatalog;
use crate::catalog::validate_catalog;
use crate::error::KpiError;

const NETWORK_JSON: &str = include_str!("../../../../catalogs/network.json");

/// Available predefined catalogs.
pub const PRESETS: &[&str] = &["network"];

/// Load a predefined catalog by name.
pub fn load_preset(name: &str) -> Result<ChartCatalog, KpiError> {
    match name {
        "network" => {
            let catalog: ChartCatalog = serde_json::from_str(NETWORK_JSON)?;
            validate_catalog(&catalog)?;
            Ok(catalog)
        }
        _ => Err(KpiError::CatalogInvalid(format!(
            "unknown preset '{}'. Available: {}",
            name,
            PRESETS.join(", ")
        ))),
    }
}
