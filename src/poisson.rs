//! Automatic requests for the shared resource, arriving as a Poisson process.

use crate::{
    link::Link,
    log,
    process::{Process, Trigger},
};
use color_print::cformat;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::{sync::Arc, time::Duration};
use tokio::time::sleep;

pub struct Poisson<R: Rng + ?Sized> {
    pub rng: Box<R>,
    pub rate: f64,
}

impl Poisson<SmallRng> {
    pub fn new(rate: f64, seed: &[u8; 32]) -> Self {
        Self {
            rng: Box::new(SmallRng::from_seed(*seed)),
            rate,
        }
    }

    pub fn from_os_rng(rate: f64) -> Self {
        Self {
            rng: Box::new(SmallRng::from_os_rng()),
            rate,
        }
    }
}

impl<R: Rng + ?Sized> Poisson<R> {
    /// Function that samples the exponentially distributed wait before the next event.
    pub fn time_for_next_event(&mut self) -> Duration {
        let seconds = -(1.0f64 - self.rng.random::<f64>()).ln() / self.rate;
        Duration::from_secs_f64(seconds)
    }
}

/// Function that requests the shared resource forever, at the arrival times of `poisson`.
///
/// Arrivals that find the peer busy are ignored like a manual request would be.
pub async fn generate_requests<L, R, G>(process: Arc<Process<L, R>>, mut poisson: Poisson<G>)
where
    L: Link,
    R: Link,
    G: Rng + ?Sized,
{
    log::info(&cformat!(
        "Requesting the <yellow, bold>shared resource</yellow, bold> <bold>{}</bold> times per second on average.",
        poisson.rate
    ));

    loop {
        sleep(poisson.time_for_next_event()).await;
        if let Trigger::Requested(timestamp) = process.request_resource().await {
            log::debug(&cformat!(
                "Generated a request on timestamp <bold>{timestamp}</bold>."
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_gives_same_arrivals() {
        let mut a = Poisson::new(2.0, &[7; 32]);
        let mut b = Poisson::new(2.0, &[7; 32]);
        for _ in 0..16 {
            assert_eq!(a.time_for_next_event(), b.time_for_next_event());
        }
    }

    #[test]
    fn mean_wait_follows_rate() {
        let mut poisson = Poisson::new(4.0, &[1; 32]);
        let samples = 20_000;
        let total: f64 = (0..samples)
            .map(|_| poisson.time_for_next_event().as_secs_f64())
            .sum();
        let mean = total / samples as f64;
        assert!((mean - 0.25).abs() < 0.02, "mean wait was {mean}");
    }
}
