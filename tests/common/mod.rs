//! Fault-injecting in-memory browser engine.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use printd_lib::cdp::{BrowserEngine, ProtocolError, TargetChannel, TargetInfo};
use serde_json::{json, Value};
use tokio::time::Instant;

pub const FAKE_PDF: &[u8] = b"%PDF-1.4\n% fake engine output\n%%EOF\n";

/// Faults and timings the fake engine applies.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub unreachable: bool,
    pub connect_fails: bool,
    pub reject_emulation: bool,
    pub navigation_error: Option<String>,
    pub never_loads: bool,
    pub load_after: Duration,
    pub capture_fails: bool,
    pub empty_capture: bool,
    /// How long releasing a target takes.
    pub close_after: Duration,
}

/// What the engine saw.
#[derive(Debug, Default)]
pub struct EngineLog {
    opens: AtomicUsize,
    closes: AtomicUsize,
    active: AtomicUsize,
    peak: AtomicUsize,
    commands: Mutex<Vec<(String, Value, Instant)>>,
    loads: Mutex<Vec<Instant>>,
}

impl EngineLog {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Most targets alive at the same time.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn methods(&self) -> Vec<String> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .map(|(method, _, _)| method.clone())
            .collect()
    }

    pub fn params(&self, method: &str) -> Option<Value> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .find(|(m, _, _)| m == method)
            .map(|(_, params, _)| params.clone())
    }

    pub fn sent_at(&self, method: &str) -> Option<Instant> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .find(|(m, _, _)| m == method)
            .map(|(_, _, at)| *at)
    }

    pub fn first_load(&self) -> Option<Instant> {
        self.loads.lock().unwrap().first().copied()
    }
}

pub struct FakeEngine {
    faults: Faults,
    log: Arc<EngineLog>,
    next_target: AtomicUsize,
}

impl FakeEngine {
    pub fn new(faults: Faults) -> Self {
        Self {
            faults,
            log: Arc::new(EngineLog::default()),
            next_target: AtomicUsize::new(1),
        }
    }

    pub fn healthy() -> Self {
        Self::new(Faults::default())
    }

    pub fn log(&self) -> Arc<EngineLog> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl BrowserEngine for FakeEngine {
    type Channel = FakeChannel;

    async fn create_target(&self) -> Result<TargetInfo, ProtocolError> {
        if self.faults.unreachable {
            return Err(ProtocolError::endpoint(
                "http://127.0.0.1:9/json/new",
                "connection refused",
            ));
        }
        let id = format!("T{}", self.next_target.fetch_add(1, Ordering::SeqCst));
        self.log.opens.fetch_add(1, Ordering::SeqCst);
        let active = self.log.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.log.peak.fetch_max(active, Ordering::SeqCst);
        Ok(TargetInfo {
            web_socket_debugger_url: format!("ws://fake/devtools/page/{id}"),
            id,
            target_type: "page".to_string(),
        })
    }

    async fn connect(&self, target: &TargetInfo) -> Result<FakeChannel, ProtocolError> {
        if self.faults.connect_fails {
            return Err(ProtocolError::ConnectionFailed {
                url: target.web_socket_debugger_url.clone(),
                reason: "handshake refused".to_string(),
            });
        }
        Ok(FakeChannel {
            faults: self.faults.clone(),
            log: Arc::clone(&self.log),
        })
    }

    async fn close_target(&self, _target: &TargetInfo) -> Result<(), ProtocolError> {
        tokio::time::sleep(self.faults.close_after).await;
        self.log.closes.fetch_add(1, Ordering::SeqCst);
        self.log.active.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeChannel {
    faults: Faults,
    log: Arc<EngineLog>,
}

fn rejected(message: &str) -> ProtocolError {
    ProtocolError::Command {
        code: -32000,
        message: message.to_string(),
        data: None,
    }
}

#[async_trait]
impl TargetChannel for FakeChannel {
    async fn call(&self, method: &str, params: Value) -> Result<Value, ProtocolError> {
        self.log
            .commands
            .lock()
            .unwrap()
            .push((method.to_string(), params, Instant::now()));

        match method {
            "Emulation.setDeviceMetricsOverride" if self.faults.reject_emulation => {
                Err(rejected("Invalid parameters"))
            }
            "Page.navigate" => match &self.faults.navigation_error {
                Some(text) => Ok(json!({ "frameId": "F1", "errorText": text })),
                None => Ok(json!({ "frameId": "F1", "loaderId": "L1" })),
            },
            "Page.printToPDF" if self.faults.capture_fails => Err(rejected("Printing failed")),
            "Page.printToPDF" if self.faults.empty_capture => Ok(json!({ "data": "" })),
            "Page.printToPDF" => Ok(json!({ "data": STANDARD.encode(FAKE_PDF) })),
            _ => Ok(json!({})),
        }
    }

    async fn wait_event(&mut self, method: &str) -> Result<Value, ProtocolError> {
        assert_eq!(method, "Page.loadEventFired");
        if self.faults.never_loads {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(self.faults.load_after).await;
        self.log.loads.lock().unwrap().push(Instant::now());
        Ok(json!({ "timestamp": 1.0 }))
    }

    async fn shutdown(&mut self) {}
}
