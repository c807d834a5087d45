//! Testing utilities for TCK workspace
//!
//! Stub backends, probe scenarios and descriptor helpers.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tck_backend::{
    Backend, BackendDescriptor, BackendHandle, BackendId, CapabilitySet, ConstructionError,
    FrontEnd, FrontEndError, ReusePolicy, SourceUnit,
};
use tck_scenario::{AssertionFailure, Scenario, ScenarioError, ScenarioResult};

pub fn capabilities(names: &[&str]) -> CapabilitySet {
    names.iter().copied().collect()
}

pub fn descriptor(name: &str, version: &str, caps: &[&str]) -> BackendDescriptor {
    BackendDescriptor::new(BackendId::new(name, version)).with_capabilities(capabilities(caps))
}

/// Front end that keeps every line as body text
#[derive(Debug)]
pub struct StubFrontEnd {
    id: BackendId,
}

impl StubFrontEnd {
    pub fn new(id: BackendId) -> Self {
        Self { id }
    }
}

impl FrontEnd for StubFrontEnd {
    fn backend_id(&self) -> &BackendId {
        &self.id
    }

    fn parse(&self, source: &str) -> Result<SourceUnit, FrontEndError> {
        Ok(SourceUnit {
            body: source.lines().map(str::to_string).collect(),
            ..SourceUnit::default()
        })
    }

    fn print(&self, unit: &SourceUnit) -> String {
        unit.body_text()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubConstruction {
    Succeed,
    Fail,
    Panic,
    /// Block the constructing thread, then succeed
    Stall(Duration),
}

/// Backend with scripted construction and a construction counter
#[derive(Debug, Clone)]
pub struct StubBackend {
    descriptor: BackendDescriptor,
    construction: StubConstruction,
    constructions: Arc<AtomicUsize>,
}

impl StubBackend {
    pub fn new(descriptor: BackendDescriptor) -> Self {
        Self {
            descriptor,
            construction: StubConstruction::Succeed,
            constructions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(descriptor: BackendDescriptor) -> Self {
        Self {
            construction: StubConstruction::Fail,
            ..Self::new(descriptor)
        }
    }

    pub fn panicking(descriptor: BackendDescriptor) -> Self {
        Self {
            construction: StubConstruction::Panic,
            ..Self::new(descriptor)
        }
    }

    pub fn stalling(descriptor: BackendDescriptor, delay: Duration) -> Self {
        Self {
            construction: StubConstruction::Stall(delay),
            ..Self::new(descriptor)
        }
    }

    pub fn shared(descriptor: BackendDescriptor) -> Self {
        Self::new(descriptor.with_reuse(ReusePolicy::SharedStateless))
    }

    pub fn descriptor(&self) -> BackendDescriptor {
        self.descriptor.clone()
    }

    /// Shared counter, survives registering the backend by value
    pub fn construction_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.constructions)
    }
}

impl Backend for StubBackend {
    fn describe(&self) -> BackendDescriptor {
        self.descriptor.clone()
    }

    fn construct(&self) -> Result<BackendHandle, ConstructionError> {
        self.constructions.fetch_add(1, Ordering::SeqCst);
        match self.construction {
            StubConstruction::Succeed => Ok(Arc::new(StubFrontEnd::new(self.descriptor.id.clone()))),
            StubConstruction::Fail => Err(ConstructionError::MissingResource(format!(
                "toolchain for {}",
                self.descriptor.id
            ))),
            StubConstruction::Panic => panic!("stub backend {} exploded", self.descriptor.id),
            StubConstruction::Stall(delay) => {
                std::thread::sleep(delay);
                Ok(Arc::new(StubFrontEnd::new(self.descriptor.id.clone())))
            }
        }
    }
}

/// What a [`ProbeScenario`] does when run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeAction {
    Pass,
    Fail(String),
    Fault(String),
    Panic(String),
}

/// Scenario that counts invocations and records the backends it saw
#[derive(Debug, Clone)]
pub struct ProbeScenario {
    name: String,
    required: CapabilitySet,
    action: ProbeAction,
    delay: Duration,
    invocations: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<BackendId>>>,
}

impl ProbeScenario {
    pub fn new(name: &str, required: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            required: capabilities(required),
            action: ProbeAction::Pass,
            delay: Duration::ZERO,
            invocations: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_action(mut self, action: ProbeAction) -> Self {
        self.action = action;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn seen_backends(&self) -> Vec<BackendId> {
        self.seen.lock().clone()
    }

    pub fn into_arc(self) -> Arc<dyn Scenario> {
        Arc::new(self)
    }
}

#[async_trait]
impl Scenario for ProbeScenario {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_capabilities(&self) -> &CapabilitySet {
        &self.required
    }

    async fn run(&self, handle: BackendHandle) -> ScenarioResult {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(handle.backend_id().clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match &self.action {
            ProbeAction::Pass => Ok(()),
            ProbeAction::Fail(detail) => Err(AssertionFailure::new(detail.clone(), "pass", "fail").into()),
            ProbeAction::Fault(detail) => Err(ScenarioError::Backend(detail.clone())),
            ProbeAction::Panic(message) => panic!("{message}"),
        }
    }
}
