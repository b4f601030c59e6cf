use clap::Parser;
use lamport_mutex::{
    config::{self, ResourceArgs},
    log,
    resource::SharedResource,
};
use std::process::exit;

#[tokio::main]
async fn main() {
    let args = ResourceArgs::parse();
    log::set_verbose(args.verbose);

    let address = match config::resolve(&args.address).await {
        Ok(address) => address,
        Err(e) => {
            log::error(&format!("{e}"));
            exit(1);
        }
    };

    if let Err(e) = SharedResource::new(address).run().await {
        log::error(&format!("{e}"));
        exit(1);
    }
}
