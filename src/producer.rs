//! Producer loop: filler events out, beacons into the log.
//!
//! Each step generates one noise event, counts it as produced, writes it
//! as a JSON line to the output, then ticks the seeking controller and
//! appends any beacon it returns.

use crate::noise::{NoiseGenerator, NoiseRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seekbeacon_core::{unix_now, Beacon, SeekingConfig};
use seekbeacon_seeking::SeekingController;
use seekbeacon_store::{BeaconStore, SubscriptionStore};
use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct Producer<W: Write> {
    controller: SeekingController<SubscriptionStore>,
    generator: NoiseGenerator,
    beacons: BeaconStore,
    rng: StdRng,
    out: W,
}

impl<W: Write> Producer<W> {
    pub fn new(
        config: SeekingConfig,
        generator: NoiseGenerator,
        beacons: BeaconStore,
        subscriptions: SubscriptionStore,
        out: W,
    ) -> Self {
        Self {
            controller: SeekingController::new(config, subscriptions),
            generator,
            beacons,
            rng: StdRng::from_entropy(),
            out,
        }
    }

    /// Replace the random source, e.g. with a seeded one.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn controller(&self) -> &SeekingController<SubscriptionStore> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SeekingController<SubscriptionStore> {
        &mut self.controller
    }

    pub fn generator(&self) -> &NoiseGenerator {
        &self.generator
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Random sleep inside the configured tempo range.
    pub fn next_interval(&mut self) -> Duration {
        let [lo, hi] = self.controller.config().tempo_range;
        let secs = if hi > lo { self.rng.gen_range(lo..=hi) } else { lo };
        Duration::try_from_secs_f64(secs).unwrap_or_default()
    }

    /// One production cycle at `now`. Only an output write failure is an
    /// error; a failed beacon append is logged and the step continues.
    pub fn step(&mut self, interval_s: f64, now: f64) -> io::Result<Option<Beacon>> {
        let event = self.generator.event(&mut self.rng, interval_s, now);
        let hints = event.beacon_hints();
        self.controller.record_production();
        self.emit(&NoiseRecord::NoiseMeta(event))?;

        let beacon = self.controller.tick(now, hints);
        if let Some(b) = &beacon {
            match self.beacons.append(b) {
                Ok(()) => info!(
                    stream = %b.stream_id,
                    state = %b.state,
                    beacon_n = b.beacon_n,
                    ratio = b.loneliness_ratio,
                    "beacon emitted"
                ),
                Err(e) => warn!(
                    stream = %b.stream_id,
                    path = %self.beacons.path().display(),
                    error = %e,
                    "beacon append failed"
                ),
            }
        }
        Ok(beacon)
    }

    /// Produce until `shutdown` resolves, bracketed by start/stop records.
    pub async fn run_until<F>(mut self, shutdown: F) -> io::Result<Self>
    where
        F: Future<Output = ()>,
    {
        let config = self.controller.config();
        info!(
            stream = %config.stream_id,
            session = self.generator.session(),
            mode = %self.generator.config().mode,
            beacon_path = %self.beacons.path().display(),
            "producer started"
        );
        self.emit(&self.generator.start_record(unix_now()))?;

        tokio::pin!(shutdown);
        loop {
            let interval = self.next_interval();
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = &mut shutdown => break,
            }
            let beacon = self.step(interval.as_secs_f64(), unix_now())?;
            debug!(
                state = %self.controller.state(),
                produced = self.controller.data().produced_ticks,
                beacon = beacon.is_some(),
                "production step"
            );
        }

        self.emit(&self.generator.stop_record(unix_now()))?;
        let data = self.controller.data();
        info!(
            produced = data.produced_ticks,
            beacons = data.beacon_count,
            state = %data.state,
            "producer exit"
        );
        Ok(self)
    }

    /// Produce until Ctrl-C.
    pub async fn run(self) -> io::Result<Self> {
        self.run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
    }

    fn emit(&mut self, record: &NoiseRecord) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}
