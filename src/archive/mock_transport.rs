//! Scripted [`Transport`] used by the unit tests.

use crate::archive::error::BoxError;
use crate::archive::transport::{RawResponse, Transport};
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Responder = dyn Fn(&str, &[(&'static str, String)]) -> Result<RawResponse, BoxError> + Send + Sync;

/// Answers every request through a closure and counts the round trips.
#[derive(Clone)]
pub struct MockTransport {
    responder: Arc<Responder>,
    calls: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<Vec<(&'static str, String)>>>>,
}

impl MockTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, &[(&'static str, String)]) -> Result<RawResponse, BoxError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            responder: Arc::new(responder),
            calls: Arc::new(AtomicUsize::new(0)),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replays `script` in order; panics if more requests arrive than were scripted.
    pub fn scripted(script: Vec<Result<RawResponse, BoxError>>) -> Self {
        let script = Mutex::new(VecDeque::from(script));
        Self::new(move |_, _| {
            script
                .lock()
                .unwrap()
                .pop_front()
                .expect("mock transport ran out of scripted responses")
        })
    }

    pub fn status(code: u16, body: &str) -> Result<RawResponse, BoxError> {
        Ok(RawResponse::new(
            StatusCode::from_u16(code).unwrap(),
            body.to_string(),
        ))
    }

    pub fn timeout() -> Result<RawResponse, BoxError> {
        Err(Box::new(io::Error::new(
            io::ErrorKind::TimedOut,
            "operation timed out",
        )))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn recorded_queries(&self) -> Vec<Vec<(&'static str, String)>> {
        self.queries.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(&'static str, String)],
        _timeout: Duration,
    ) -> Result<RawResponse, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_vec());
        (self.responder)(url, query)
    }
}

/// Builds an archive JSON body covering `start..=end` with deterministic values.
pub fn daily_payload(start: chrono::NaiveDate, end: chrono::NaiveDate, t_max: f64) -> String {
    let days: Vec<chrono::NaiveDate> = start.iter_days().take_while(|d| *d <= end).collect();
    let time: Vec<String> = days.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();
    let n = days.len();
    serde_json::json!({
        "latitude": 43.3,
        "longitude": 5.4,
        "daily": {
            "time": time,
            "temperature_2m_max": vec![t_max; n],
            "temperature_2m_min": vec![t_max - 10.0; n],
            "precipitation_sum": vec![1.5; n],
            "wind_speed_10m_max": vec![20.0; n],
        }
    })
    .to_string()
}
