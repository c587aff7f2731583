//! Save command

use super::CommonArgs;
use clap::Args;
use modelzoo_core::Session;
use modelzoo_store::ModelHandle;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct SaveArgs {
    /// Staging directory holding the trained model's files
    #[arg(long)]
    pub dir: PathBuf,

    /// Training statement recorded with the model
    #[arg(long)]
    pub train_select: String,

    /// Destination: file://<path>, or a table name
    #[arg(long)]
    pub to: String,

    /// User recorded on the session
    #[arg(long, default_value = "")]
    pub user: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn execute(args: SaveArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.common.load_config()?;
    let session = Session::new(args.common.db.clone().unwrap_or_default()).with_user(args.user);

    ModelHandle::new(args.dir, args.train_select).save(&args.to, &session, &config)?;

    println!("Saved model to {}", args.to);
    Ok(())
}
