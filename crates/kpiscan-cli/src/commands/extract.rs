use kpiscan_core::error::KpiError;
use kpiscan_core::parsing::region::RegionStrategy;
use kpiscan_core::ExtractOptions;
use std::path::PathBuf;

use crate::commands::{read_layout, resolve_catalog};
use crate::output;
use crate::output::table::TableOptions;

pub struct ExtractArgs {
    pub input_file: PathBuf,
    pub output_format: String,
    pub catalog: Option<PathBuf>,
    pub preset: String,
    pub strategy: RegionStrategy,
    pub debug: bool,
    pub subject: Option<String>,
    pub mask: bool,
}

pub fn run(args: ExtractArgs) -> Result<(), KpiError> {
    let catalog = resolve_catalog(args.catalog, &args.preset)?;
    let pages = read_layout(&args.input_file)?;
    let options = ExtractOptions {
        strategy: args.strategy,
    };
    let result = kpiscan_core::extract_layout(&pages, &catalog, &options)?;

    match (args.output_format.as_str(), args.subject.as_deref()) {
        ("json", Some(subject)) if args.mask => {
            let masked = kpiscan_core::mask_result(&result, subject, &catalog.alias_prefix);
            output::json::print(&masked)?
        }
        ("json", _) => output::json::print(&result)?,
        _ => output::table::print(
            &result,
            &TableOptions {
                subject: args.subject.as_deref(),
                mask: args.mask,
                alias_prefix: &catalog.alias_prefix,
                debug: args.debug,
            },
        ),
    }

    Ok(())
}
