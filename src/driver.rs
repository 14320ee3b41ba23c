/// IP-100 driver: startup probe and the poll loop.
///
/// The loop:
/// 1. Waits for the next wall-clock multiple of the poll interval
/// 2. Fetches `status.xml` from the station
/// 3. Parses and maps it into a `Packet`
/// 4. Yields the packet, or on a failed fetch sleeps `retry_wait` and tries
///    again, giving up after `max_tries` consecutive failures

use crate::config::DriverConfig;
use crate::ingest::{HttpStation, StationSource, parse_status};
use crate::mapping::build_packet;
use crate::model::{FetchError, Packet, PollError};
use crate::rain::RainState;
use crate::sensor_map::SensorMap;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::time::Duration;

const LOG_TARGET: &str = "ip100::driver";

pub const DRIVER_NAME: &str = "IP100";
pub const DRIVER_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const HARDWARE_NAME: &str = "IP-100";

/// Startup probe: a freshly rebooted host often has no name resolution for
/// the first few seconds.
const PROBE_ATTEMPTS: u32 = 5;
const PROBE_WAIT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Time source
// ---------------------------------------------------------------------------

/// Wall clock and sleeping, injected so the loop can run against a fake.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
    fn sleep(&self, duration: Duration);
}

/// The real clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Time from `now` to the next multiple of `interval` since the epoch.
///
/// Always in `(0, interval]`: sitting exactly on a boundary waits a full
/// interval. A zero interval never waits, and neither does one too large to
/// count in milliseconds.
pub fn time_to_next_poll(now: DateTime<Utc>, interval: Duration) -> Duration {
    let interval_ms = match i64::try_from(interval.as_millis()) {
        Ok(0) => return Duration::ZERO,
        Ok(ms) => ms,
        Err(_) => {
            warn!(
                target: LOG_TARGET,
                "poll interval {:?} too large to align, not waiting",
                interval
            );
            return Duration::ZERO;
        }
    };

    let now_ms = now.timestamp_millis();
    let next_ms = (now_ms.div_euclid(interval_ms) + 1) * interval_ms;
    Duration::from_millis((next_ms - now_ms) as u64)
}

/// Packet timestamp: epoch seconds rounded to the nearest second.
pub fn packet_timestamp(now: DateTime<Utc>) -> i64 {
    (now.timestamp_millis() + 500).div_euclid(1000)
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// One station, its effective sensor map and its rain baseline.
pub struct Ip100Driver<S = HttpStation, C = SystemClock> {
    config: DriverConfig,
    sensor_map: SensorMap,
    source: S,
    clock: C,
    rain: RainState,
}

impl Ip100Driver<HttpStation, SystemClock> {
    /// Driver polling the configured station over HTTP in real time.
    pub fn new(config: DriverConfig) -> Self {
        let source = HttpStation::new(config.station_url());
        Self::with_source(config, source, SystemClock)
    }
}

impl<S: StationSource, C: Clock> Ip100Driver<S, C> {
    /// Driver reading from an arbitrary source and clock.
    pub fn with_source(config: DriverConfig, source: S, clock: C) -> Self {
        let sensor_map = SensorMap::with_overrides(&config.sensor_map);

        info!(target: LOG_TARGET, "{} driver version is {}", DRIVER_NAME, DRIVER_VERSION);
        info!(target: LOG_TARGET, "station url is {}", source.url());
        info!(target: LOG_TARGET, "poll interval is {}", config.poll_interval);
        info!(target: LOG_TARGET, "sensor map: {:?}", sensor_map);

        Self {
            config,
            sensor_map,
            source,
            clock,
            rain: RainState::new(),
        }
    }

    pub fn hardware_name(&self) -> &'static str {
        HARDWARE_NAME
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn sensor_map(&self) -> &SensorMap {
        &self.sensor_map
    }

    pub fn rain_state(&self) -> &RainState {
        &self.rain
    }

    /// Checks the station answers before polling starts.
    ///
    /// Tries up to five times, five seconds apart.
    ///
    /// # Errors
    /// The last `FetchError` if every attempt failed.
    pub fn probe(&self) -> Result<(), FetchError> {
        let mut attempt = 1;
        loop {
            match self.source.fetch() {
                Ok(_) => return Ok(()),
                Err(e) => {
                    debug!(target: LOG_TARGET, "probe attempt {} failed: {}", attempt, e);
                    if attempt >= PROBE_ATTEMPTS {
                        return Err(e);
                    }
                    info!(target: LOG_TARGET, "{}: Retrying.", e);
                    self.clock.sleep(PROBE_WAIT);
                    attempt += 1;
                }
            }
        }
    }

    /// How long until the next aligned poll.
    pub fn time_to_next_poll(&self) -> Duration {
        let now = self.clock.now();
        let wait = time_to_next_poll(now, self.config.poll_interval());
        debug!(
            target: LOG_TARGET,
            "now: {}, poll_interval: {}, next poll in {:?}",
            now,
            self.config.poll_interval,
            wait
        );
        wait
    }

    /// One fetch → parse → map cycle, no waiting and no retry.
    ///
    /// Only a fetch failure is an error; a bad document maps to a packet
    /// with whatever fields could be read. The rain baseline advances only
    /// when a packet is produced.
    pub fn poll_once(&mut self) -> Result<Packet, FetchError> {
        let data = self.source.fetch()?;
        debug!(target: LOG_TARGET, "data: {}", String::from_utf8_lossy(&data));

        let reading = parse_status(&data);
        debug!(target: LOG_TARGET, "raw packet: {:?}", reading);

        let date_time = packet_timestamp(self.clock.now());
        let packet = build_packet(&reading, &self.sensor_map, &mut self.rain, date_time);
        debug!(target: LOG_TARGET, "packet: {:?}", packet);

        Ok(packet)
    }

    /// Endless sequence of packets, one per poll.
    ///
    /// Ends with a single `PollError` after `max_tries` consecutive failed
    /// fetches; every call after that returns `None`.
    pub fn loop_packets(&mut self) -> LoopPackets<'_, S, C> {
        LoopPackets {
            driver: self,
            tries: 0,
            last_error: None,
            failed: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Poll loop
// ---------------------------------------------------------------------------

/// Iterator driving the poll/retry state machine.
pub struct LoopPackets<'a, S, C> {
    driver: &'a mut Ip100Driver<S, C>,
    tries: u32,
    last_error: Option<FetchError>,
    failed: bool,
}

impl<S, C> LoopPackets<'_, S, C> {
    /// Consecutive failed fetches since the last packet.
    pub fn consecutive_failures(&self) -> u32 {
        self.tries
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }
}

impl<S: StationSource, C: Clock> Iterator for LoopPackets<'_, S, C> {
    type Item = Result<Packet, PollError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let max_tries = self.driver.config.max_tries;
        loop {
            if self.tries >= max_tries {
                self.failed = true;
                warn!(target: LOG_TARGET, "max tries {} exceeded", max_tries);
                return Some(Err(PollError::MaxTriesExceeded {
                    max_tries,
                    last: self.last_error.take(),
                }));
            }
            self.tries += 1;

            if self.driver.config.poll_interval != 0 {
                let wait = self.driver.time_to_next_poll();
                self.driver.clock.sleep(wait);
            }

            match self.driver.poll_once() {
                Ok(packet) => {
                    self.tries = 0;
                    self.last_error = None;
                    return Some(Ok(packet));
                }
                Err(e) => {
                    info!(
                        target: LOG_TARGET,
                        "failed attempt {} of {}: {}",
                        self.tries,
                        max_tries,
                        e
                    );
                    self.last_error = Some(e);
                    self.driver.clock.sleep(self.driver.config.retry_wait());
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
