//! In-process fakes shared by unit tests

use crate::auth::{Clock, CredentialBroker, Credentials, ManualClock, Token};
use crate::error::{Error, Result};
use crate::http::{RequestDescriptor, ResponseBody, ResponseEnvelope, Transport};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Fixed starting instant for deterministic clocks
pub fn t0() -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

pub fn credentials() -> Credentials {
    Credentials::new("tenant", "client", "secret", "api://records/.default")
}

/// Broker that mints `token-1`, `token-2`, ... and counts calls
pub struct CountingBroker {
    calls: AtomicUsize,
    clock: ManualClock,
    lifetime_secs: i64,
    failure: Option<(i32, String)>,
    delay: Option<std::time::Duration>,
    closes: AtomicUsize,
}

impl CountingBroker {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            clock,
            lifetime_secs: 3600,
            failure: None,
            delay: None,
            closes: AtomicUsize::new(0),
        }
    }

    pub fn failing(clock: ManualClock, status: i32, message: &str) -> Self {
        Self {
            failure: Some((status, message.to_string())),
            ..Self::new(clock)
        }
    }

    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialBroker for CountingBroker {
    async fn fetch_token(&self, credentials: &Credentials) -> Result<Token> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some((status, message)) = &self.failure {
            return Err(Error::auth(*status, message.clone()));
        }
        Ok(Token::new(
            format!("token-{n}"),
            "Bearer",
            self.clock.now() + Duration::seconds(self.lifetime_secs),
            credentials.scope(),
        ))
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// What a scripted transport saw for one request
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: reqwest::Method,
    pub url: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// Canned response for the scripted transport
pub enum Scripted {
    Respond {
        status: u16,
        content_type: Option<&'static str>,
        body: &'static str,
    },
    Fail(&'static str),
}

pub fn respond(status: u16, content_type: Option<&'static str>, body: &'static str) -> Scripted {
    Scripted::Respond {
        status,
        content_type,
        body,
    }
}

/// Transport replaying scripted responses in order and recording requests
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    seen: Mutex<Vec<SeenRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn sends(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, mut request: RequestDescriptor) -> Result<ResponseEnvelope> {
        let body = match request.body.take() {
            Some(body) => Some(body.into_bytes().await?.to_vec()),
            None => None,
        };
        self.seen.lock().unwrap().push(SeenRequest {
            method: request.method.clone(),
            url: request.url.clone(),
            authorization: request.header_value("Authorization").map(str::to_string),
            content_type: request.content_type.clone(),
            headers: request.headers.clone(),
            body,
        });

        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted transport ran out of responses");

        match next {
            Scripted::Respond {
                status,
                content_type,
                body,
            } => {
                let mut headers = Vec::new();
                if let Some(ct) = content_type {
                    headers.push(("Content-Type".to_string(), ct.to_string()));
                }
                Ok(ResponseEnvelope::new(
                    status,
                    headers,
                    ResponseBody::from_bytes(body.as_bytes().to_vec()),
                ))
            }
            Scripted::Fail(message) => Err(Error::transport(message)),
        }
    }
}
