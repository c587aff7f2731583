//! Inspect command
//!
//! Table models are read metadata-only. File models have to be unpacked
//! to reach their sidecar, so they go through a scratch directory that is
//! removed afterwards.

use super::CommonArgs;
use clap::Args;
use modelzoo_core::destination::{resolve, Backend, Direction};
use modelzoo_store::ModelHandle;
use tempfile::TempDir;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Destination the model was saved to
    #[arg(long)]
    pub from: String,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn execute(args: InspectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.common.load_config()?;
    let backend = resolve(&args.from, Direction::Load, &config.resolver)?.backend();

    let loaded = match backend {
        Backend::Filesystem => {
            let scratch = TempDir::new()?;
            ModelHandle::load(&args.from, Some(scratch.path()), None, &config)?
        }
        Backend::TableBlob => {
            let db = args.common.connect()?;
            ModelHandle::load(&args.from, None, db.as_ref(), &config)?
        }
    };

    if args.json {
        let out = serde_json::json!({
            "destination": args.from,
            "backend": backend.as_str(),
            "format_version": loaded.metadata.format_version(),
            "train_select": loaded.train_select(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", loaded.train_select());
    }
    Ok(())
}
