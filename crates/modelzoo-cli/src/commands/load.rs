//! Load command

use super::CommonArgs;
use clap::Args;
use modelzoo_core::destination::{resolve, Backend, Direction};
use modelzoo_store::ModelHandle;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Destination the model was saved to
    #[arg(long)]
    pub from: String,

    /// Directory to unpack the model into (created if missing)
    #[arg(long)]
    pub dir: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn execute(args: LoadArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.common.load_config()?;
    // Rejected destinations must fail before --db is opened (and created)
    let backend = resolve(&args.from, Direction::Load, &config.resolver)?.backend();
    let db = match backend {
        Backend::TableBlob => args.common.connect()?,
        Backend::Filesystem => None,
    };

    let loaded = ModelHandle::load(&args.from, Some(args.dir.as_path()), db.as_ref(), &config)?;

    println!("Loaded model from {} into {}", args.from, args.dir.display());
    println!("train_select: {}", loaded.train_select());
    Ok(())
}
