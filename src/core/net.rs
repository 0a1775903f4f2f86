// src/core/net.rs
//! Paced, retrying HTTP GET.
//!
//! One request at a time. Before each `fetch` the client waits until at least
//! `min_interval` has passed since the start of the previous request. Failed
//! attempts back off (`Retry-After` on 429, otherwise `2^attempt` seconds) and
//! retry the same URL up to `max_attempts` times.

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::options::FetchOptions;
use crate::errors::{Result, ScrapeError};

/// What the transport saw on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Raw `Retry-After` header, if the server sent one.
    pub retry_after: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self { status: 200, retry_after: None, body: body.into() }
    }
}

/// Connection-level failure (DNS, reset, timeout, body decode).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

pub trait Transport {
    fn get(&self, url: &str) -> std::result::Result<RawResponse, TransportError>;
}

/// Time source and sleeper. The only two places the pipeline blocks go through here.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant { Instant::now() }
    fn sleep(&self, d: Duration) { std::thread::sleep(d) }
}

/// reqwest blocking client.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(opts: &FetchOptions) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(opts.user_agent.clone())
            .timeout(opts.timeout())
            .build()
            .map_err(|e| ScrapeError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> std::result::Result<RawResponse, TransportError> {
        let resp = self.client.get(url).send().map_err(|e| TransportError(e.to_string()))?;
        let status = resp.status().as_u16();
        let retry_after = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.text().map_err(|e| TransportError(e.to_string()))?;
        Ok(RawResponse { status, retry_after, body })
    }
}

/// Outcome of a single attempt.
enum Attempt {
    Succeeded(String),
    RateLimited(Option<Duration>),
    Transient(String),
}

/// Retry loop states.
enum State {
    Attempting(u32),
    Backoff { next: u32, wait: Duration },
    Succeeded(String),
    Exhausted,
}

pub struct Fetcher<T = HttpTransport, C = SystemClock> {
    transport: T,
    clock: C,
    min_interval: Duration,
    max_attempts: u32,
    last_start: Option<Instant>,
    requests_sent: u64,
}

impl Fetcher<HttpTransport, SystemClock> {
    pub fn from_options(opts: &FetchOptions) -> Result<Self> {
        Ok(Self::new(HttpTransport::new(opts)?, SystemClock, opts))
    }
}

impl<T: Transport, C: Clock> Fetcher<T, C> {
    pub fn new(transport: T, clock: C, opts: &FetchOptions) -> Self {
        Self {
            transport,
            clock,
            min_interval: opts.min_interval(),
            max_attempts: opts.max_attempts.max(1),
            last_start: None,
            requests_sent: 0,
        }
    }

    pub fn clock(&self) -> &C { &self.clock }
    pub fn transport(&self) -> &T { &self.transport }
    pub fn now(&self) -> Instant { self.clock.now() }

    /// Attempts issued so far, retries included.
    pub fn requests_sent(&self) -> u64 { self.requests_sent }

    /// GET `url`, returning the body of the first 2xx response.
    pub fn fetch(&mut self, url: &str) -> Result<String> {
        self.pace();

        let mut last_error = s!();
        let mut state = State::Attempting(1);
        loop {
            state = match state {
                State::Attempting(n) => match self.attempt(url) {
                    Attempt::Succeeded(doc) => State::Succeeded(doc),
                    Attempt::RateLimited(hint) => {
                        let wait = hint.unwrap_or_else(|| backoff(n));
                        last_error = s!("HTTP 429 Too Many Requests");
                        warn!(url, attempt = n, wait_secs = wait.as_secs_f64(), "rate limited");
                        self.next_state(n, wait)
                    }
                    Attempt::Transient(err) => {
                        let wait = backoff(n);
                        warn!(url, attempt = n, error = %err, "request failed");
                        last_error = err;
                        self.next_state(n, wait)
                    }
                },
                State::Backoff { next, wait } => {
                    self.clock.sleep(wait);
                    State::Attempting(next)
                }
                State::Succeeded(doc) => return Ok(doc),
                State::Exhausted => {
                    return Err(ScrapeError::FetchFailed {
                        url: url.to_string(),
                        attempts: self.max_attempts,
                        last: last_error,
                    });
                }
            }
        }
    }

    fn next_state(&self, attempt: u32, wait: Duration) -> State {
        if attempt >= self.max_attempts {
            State::Exhausted
        } else {
            State::Backoff { next: attempt + 1, wait }
        }
    }

    /// Sleep until `min_interval` has elapsed since the previous request started.
    fn pace(&mut self) {
        if let Some(prev) = self.last_start {
            let since = self.clock.now().saturating_duration_since(prev);
            if since < self.min_interval {
                self.clock.sleep(self.min_interval - since);
            }
        }
    }

    fn attempt(&mut self, url: &str) -> Attempt {
        self.last_start = Some(self.clock.now());
        self.requests_sent += 1;
        debug!(url, "GET");

        match self.transport.get(url) {
            Ok(resp) if (200..300).contains(&resp.status) => Attempt::Succeeded(resp.body),
            Ok(resp) if resp.status == 429 => {
                Attempt::RateLimited(resp.retry_after.as_deref().and_then(parse_retry_after))
            }
            Ok(resp) => Attempt::Transient(format!("HTTP {}", resp.status)),
            Err(e) => Attempt::Transient(e.0),
        }
    }
}

/// `2^attempt` seconds.
pub fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(16))
}

/// `Retry-After` in delta-seconds form. HTTP-date values are not honored.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let v = value.trim();
    if let Ok(secs) = v.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    match v.parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => Some(Duration::from_secs_f64(secs)),
        _ => None,
    }
}
