//! Command line configuration of the peer and of the shared resource.

use crate::{error::Error, registry::PeerId, DEFAULT_HOLD_MS, DEFAULT_RESOURCE_ADDRESS};
use clap::Parser;
use std::{net::SocketAddr, time::Duration};
use tokio::net::lookup_host;

/// A peer of the Ricart-Agrawala group.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct PeerArgs {
    /// Identity of this peer, the 1-based position of its address in `--peers`.
    #[arg(long)]
    pub id: PeerId,

    /// Addresses of every peer, this one included, in identity order.
    #[arg(long, num_args = 1.., required = true)]
    pub peers: Vec<String>,

    /// Address of the shared resource.
    #[arg(long, default_value = DEFAULT_RESOURCE_ADDRESS)]
    pub resource: String,

    /// How long the shared resource is held, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_HOLD_MS)]
    pub hold_ms: u64,

    /// Request the resource automatically, this many times per second on average.
    #[arg(long, value_parser = parse_rate)]
    pub rate: Option<f64>,

    #[arg(long, short)]
    pub verbose: bool,
}

impl PeerArgs {
    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }
}

/// The shared resource that logs which peer holds it.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct ResourceArgs {
    /// Address to listen on.
    #[arg(long, default_value = DEFAULT_RESOURCE_ADDRESS)]
    pub address: String,

    #[arg(long, short)]
    pub verbose: bool,
}

/// Function that parses a request rate, which must be a finite positive number.
fn parse_rate(value: &str) -> Result<f64, String> {
    let rate: f64 = value
        .parse()
        .map_err(|_| format!("`{value}` isn't a number"))?;
    if !rate.is_finite() || rate <= 0.0 {
        return Err(format!("the rate must be a finite positive number, got `{value}`"));
    }
    Ok(rate)
}

/// Function that resolves a `host:port` string to its first socket address.
pub async fn resolve(address: &str) -> Result<SocketAddr, Error> {
    lookup_host(address)
        .await
        .map_err(|_| Error::Resolve(address.to_string()))?
        .next()
        .ok_or_else(|| Error::Resolve(address.to_string()))
}

/// Function that resolves every address, keeping their order.
pub async fn resolve_all(addresses: &[String]) -> Result<Vec<SocketAddr>, Error> {
    let mut resolved = Vec::with_capacity(addresses.len());
    for address in addresses {
        resolved.push(resolve(address).await?);
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peer_args_defaults() {
        let args = PeerArgs::parse_from([
            "peer",
            "--id",
            "2",
            "--peers",
            "127.0.0.1:10001",
            "127.0.0.1:10002",
        ]);

        assert_eq!(args.id, 2);
        assert_eq!(args.peers.len(), 2);
        assert_eq!(args.resource, DEFAULT_RESOURCE_ADDRESS);
        assert_eq!(args.hold(), Duration::from_secs(2));
        assert_eq!(args.rate, None);
        assert!(!args.verbose);
    }

    #[test]
    fn rate_must_be_positive_and_finite() {
        let parse = |rate: &str| {
            let flag = format!("--rate={rate}");
            PeerArgs::try_parse_from([
                "peer",
                "--id",
                "1",
                "--peers",
                "127.0.0.1:10001",
                flag.as_str(),
            ])
        };

        assert!(parse("0").is_err());
        assert!(parse("-1.5").is_err());
        assert!(parse("inf").is_err());
        assert!(parse("NaN").is_err());
        assert!(parse("fast").is_err());
        assert_eq!(parse("2.5").unwrap().rate, Some(2.5));
    }

    #[test]
    fn peer_args_require_peers() {
        assert!(PeerArgs::try_parse_from(["peer", "--id", "1"]).is_err());
    }

    #[tokio::test]
    async fn resolves_in_order() {
        let addresses = vec!["127.0.0.1:10002".to_string(), "127.0.0.1:10001".to_string()];
        let resolved = resolve_all(&addresses).await.unwrap();
        assert_eq!(resolved[0].port(), 10002);
        assert_eq!(resolved[1].port(), 10001);
    }

    #[tokio::test]
    async fn bad_address_is_a_resolve_error() {
        assert!(matches!(
            resolve("not an address").await,
            Err(Error::Resolve(_))
        ));
    }
}
