use kpiscan_core::error::KpiError;
use kpiscan_core::parsing::region::RegionStrategy;
use kpiscan_core::parsing::subject::detect_subject;
use kpiscan_core::registry::CodeRegistry;
use kpiscan_core::ExtractOptions;
use std::path::PathBuf;

use crate::commands::{read_layout, resolve_catalog};
use crate::output;

pub struct MaskArgs {
    pub input_file: PathBuf,
    pub chart: String,
    pub subject: Option<String>,
    pub subject_from: Option<PathBuf>,
    pub output_format: String,
    pub catalog: Option<PathBuf>,
    pub preset: String,
    pub strategy: RegionStrategy,
}

pub fn run(args: MaskArgs) -> Result<(), KpiError> {
    let catalog = resolve_catalog(args.catalog, &args.preset)?;
    let pages = read_layout(&args.input_file)?;

    let subject = match args.subject {
        Some(code) => code.trim().to_uppercase(),
        None => {
            let prefix = catalog.subject_prefix.as_deref().ok_or_else(|| {
                KpiError::CatalogInvalid(format!(
                    "catalog '{}' has no subject_prefix; pass --subject instead",
                    catalog.name
                ))
            })?;
            let registry = CodeRegistry::from_catalog(&catalog);
            // Without --subject-from the report itself may carry the heading.
            let (path, code) = match args.subject_from {
                Some(path) => {
                    let station = read_layout(&path)?;
                    let code = detect_subject(&station, prefix, &registry);
                    (path, code)
                }
                None => {
                    let code = detect_subject(&pages, prefix, &registry);
                    (args.input_file.clone(), code)
                }
            };
            let code = code.ok_or_else(|| KpiError::SubjectNotFound(path.clone()))?;
            eprintln!("Detected subject {} from {}", code, path.display());
            code
        }
    };

    let options = ExtractOptions {
        strategy: args.strategy,
    };
    let result = kpiscan_core::extract_layout(&pages, &catalog, &options)?;
    let masked = kpiscan_core::mask_chart(&result, &args.chart, &subject, &catalog.alias_prefix)?;

    match args.output_format.as_str() {
        "json" => output::json::print(&masked)?,
        _ => {
            // mask_chart succeeded, so the chart is present
            if let Some(chart) = result.chart(&args.chart) {
                output::table::print_masked(chart, &masked, &subject);
            }
        }
    }

    Ok(())
}
