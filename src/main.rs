// Entrypoint for the uploader.
// - Keeps `main` small: parse arguments, build the client with an empty
//   token store and hand both to the UI layer.

use clap::Parser;
use rcs_uploader::{api::UploadClient, cli::Args, logging, token_store::TokenStore, ui};

fn main() -> anyhow::Result<()> {
    logging::init();
    let args = Args::parse();

    // One store for the life of the process; nothing is persisted.
    let client = UploadClient::new(TokenStore::new());

    ui::run(&client, args)?;
    Ok(())
}
