use clap::Parser;
use color_print::cformat;
use futures::StreamExt;
use lamport_mutex::{
    command,
    config::{self, PeerArgs},
    link::{self, UdpLink},
    log,
    poisson::{self, Poisson},
    Process,
};
use std::{error::Error, process::exit, sync::Arc};

async fn run(args: PeerArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let endpoints = config::resolve_all(&args.peers).await?;
    let registry = link::connect_registry(args.id, &endpoints).await?;
    let own_address = endpoints[args.id as usize - 1];
    let incoming = link::listen(own_address).await?;
    let resource = UdpLink::connect(config::resolve(&args.resource).await?).await?;

    log::info(&cformat!(
        "Peer <bold>{}</bold> listening on <bold>{}</bold> with <bold>{}</bold> other peers, shared resource at <bold>{}</bold>.",
        args.id,
        own_address,
        registry.quorum(),
        resource.address()
    ));

    let process = Arc::new(Process::new(registry, resource, args.hold()));

    let dispatch_thread = tokio::spawn(
        Arc::clone(&process).serve(incoming.map(|item| item.map(|(message, _)| message))),
    );

    if let Some(rate) = args.rate {
        tokio::spawn(poisson::generate_requests(
            Arc::clone(&process),
            Poisson::from_os_rng(rate),
        ));
    }

    command::listen_for_input(&process, tokio::io::stdin()).await;

    if dispatch_thread.await.is_err() {
        log::error("Dispatch Thread failed.");
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = PeerArgs::parse();
    log::set_verbose(args.verbose);

    if let Err(e) = run(args).await {
        log::error(&format!("{e}"));
        exit(1);
    }
}
