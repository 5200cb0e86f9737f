// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;
use url::Url;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{DirectoryError, Result};
use crate::presenter::{CallInitiator, LinkOpener};
use crate::remote::DirectoryClient;
use crate::store::{Airline, AirlineStore};
use crate::sync::ProjectionObserver;

/// A record carrying only its code.
pub fn record(code: &str) -> Airline {
    Airline {
        code: code.to_string(),
        ..Airline::default()
    }
}

pub fn airline(code: &str, name: &str) -> Airline {
    let mut airline = record(code);
    airline.name = Some(name.to_string());
    airline
}

pub fn favorite(code: &str, name: &str) -> Airline {
    let mut airline = airline(code, name);
    airline.is_favorite = true;
    airline
}

/// Create a test configuration with temporary paths
pub fn create_test_config() -> Config {
    use std::net::SocketAddr;
    use std::str::FromStr;

    let temp_dir = std::env::temp_dir().join(format!("airlines-test-{}", uuid::Uuid::new_v4()));

    Config {
        directory_url: "http://localhost:3000/airlines".to_string(),
        logo_base_url: "https://logos.example.com/".to_string(),
        store_db_path: temp_dir.join("test_airlines.db"),
        local_api_bind: SocketAddr::from_str("127.0.0.1:0").unwrap(), // Use port 0 to auto-assign
        request_timeout_secs: 5,
        load_on_startup: false,
        log_level: "error".to_string(), // Reduce log noise in tests
        log_json: false,
    }
}

/// Vec-backed store with switchable read/write failures.
///
/// List reads can also be held after taking their snapshot, to line up a
/// concurrent write behind a reload.
#[derive(Default)]
pub struct MemoryStore {
    airlines: Mutex<Vec<Airline>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    hold_reads: AtomicBool,
    held_reads: AtomicUsize,
    read_gate: Notify,
}

impl MemoryStore {
    pub fn with_airlines(airlines: Vec<Airline>) -> Self {
        Self {
            airlines: Mutex::new(airlines),
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> Vec<Airline> {
        self.airlines.lock().unwrap().clone()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Park `get_all`/`get_favorites` until `release_reads`.
    pub fn hold_reads(&self) {
        self.hold_reads.store(true, Ordering::SeqCst);
    }

    pub fn release_reads(&self) {
        self.hold_reads.store(false, Ordering::SeqCst);
        self.read_gate.notify_one();
    }

    /// Number of list reads that have been parked so far.
    pub fn held_reads(&self) -> usize {
        self.held_reads.load(Ordering::SeqCst)
    }

    async fn list(&self) -> Result<Vec<Airline>> {
        self.check_read()?;
        let snapshot = self.snapshot();
        if self.hold_reads.load(Ordering::SeqCst) {
            self.held_reads.fetch_add(1, Ordering::SeqCst);
            self.read_gate.notified().await;
        }
        Ok(snapshot)
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DirectoryError::StoreRead("injected read failure".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DirectoryError::StoreWrite("injected write failure".to_string()));
        }
        Ok(())
    }

    fn write(&self, airlines: &[Airline], keep_favorite: bool) -> Result<()> {
        self.check_write()?;
        let mut stored = self.airlines.lock().unwrap();
        for airline in airlines {
            match stored.iter_mut().find(|a| a.code == airline.code) {
                Some(existing) => {
                    let is_favorite = existing.is_favorite;
                    *existing = airline.clone();
                    if keep_favorite {
                        existing.is_favorite = is_favorite;
                    }
                }
                None => stored.push(airline.clone()),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AirlineStore for MemoryStore {
    async fn get_all(&self) -> Result<Vec<Airline>> {
        self.list().await
    }

    async fn get_favorites(&self) -> Result<Vec<Airline>> {
        Ok(self.list().await?.into_iter().filter(|a| a.is_favorite).collect())
    }

    async fn get(&self, code: &str) -> Result<Option<Airline>> {
        self.check_read()?;
        Ok(self.snapshot().into_iter().find(|a| a.code == code))
    }

    async fn upsert(&self, airlines: &[Airline]) -> Result<()> {
        self.write(airlines, false)
    }

    async fn merge_remote(&self, airlines: &[Airline]) -> Result<()> {
        self.write(airlines, true)
    }

    async fn set_favorite(&self, code: &str, is_favorite: bool) -> Result<()> {
        self.check_write()?;
        let mut stored = self.airlines.lock().unwrap();
        let airline = stored
            .iter_mut()
            .find(|a| a.code == code)
            .ok_or_else(|| DirectoryError::NotFound(code.to_string()))?;
        airline.is_favorite = is_favorite;
        Ok(())
    }
}

/// Directory client returning a canned response, optionally held until released.
pub struct ScriptedClient {
    response: Option<Vec<Airline>>,
    gate: Option<Notify>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn returning(airlines: Vec<Airline>) -> Self {
        Self {
            response: Some(airlines),
            gate: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every fetch fails with a decode error.
    pub fn failing() -> Self {
        Self {
            response: None,
            gate: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Hold each fetch until `release` is called.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Notify::new());
        self
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DirectoryClient for ScriptedClient {
    async fn fetch_all(&self) -> Result<Vec<Airline>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.response {
            Some(airlines) => Ok(airlines.clone()),
            None => Err(serde_json::from_str::<Vec<Airline>>("{").unwrap_err().into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverEvent {
    LoadingStarted,
    LoadingFinished,
    Reloaded(usize),
    RowChanged(usize),
    LoadFailed(String),
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObserverEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<ObserverEvent> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: ObserverEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl ProjectionObserver for RecordingObserver {
    fn loading_started(&self) {
        self.record(ObserverEvent::LoadingStarted);
    }

    fn loading_finished(&self) {
        self.record(ObserverEvent::LoadingFinished);
    }

    fn projection_reloaded(&self, count: usize) {
        self.record(ObserverEvent::Reloaded(count));
    }

    fn row_changed(&self, index: usize) {
        self.record(ObserverEvent::RowChanged(index));
    }

    fn load_failed(&self, message: &str) {
        self.record(ObserverEvent::LoadFailed(message.to_string()));
    }
}

/// Call initiator and link opener that record what they were asked to do.
#[derive(Default)]
pub struct RecordingActions {
    calls: Mutex<Vec<(Uuid, String)>>,
    opened: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl RecordingActions {
    pub fn calls(&self) -> Vec<(Uuid, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CallInitiator for RecordingActions {
    async fn start_call(&self, handle: &str) -> anyhow::Result<Uuid> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("telephony unavailable");
        }
        let call_id = Uuid::new_v4();
        self.calls.lock().unwrap().push((call_id, handle.to_string()));
        Ok(call_id)
    }
}

#[async_trait]
impl LinkOpener for RecordingActions {
    async fn open(&self, url: &Url) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("no browser");
        }
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Create a temporary directory for tests
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::TempDir::new().expect("Failed to create temp directory")
}

/// Path for a fresh SQLite file inside `dir`
pub fn db_path_in(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("airlines.db")
}
