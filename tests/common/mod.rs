//! Shared test components for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::Level;

use service_bootstrap::component::{Component, Dependency, Initializer, Logger, Role};
use service_bootstrap::{ComponentError, Context};

/// Ordered record of lifecycle events shared between components.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn contains(&self, event: &str) -> bool {
        self.events().iter().any(|e| e == event)
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }
}

/// Logger that writes into a journal.
///
/// Carries an initializer that declares it cannot run, so the runner must
/// skip it.
pub struct JournalLogger {
    lifecycle: Arc<LoggerLifecycle>,
}

struct LoggerLifecycle {
    journal: Journal,
}

impl JournalLogger {
    pub fn new(journal: &Journal) -> Self {
        Self {
            lifecycle: Arc::new(LoggerLifecycle {
                journal: journal.clone(),
            }),
        }
    }
}

impl Logger for JournalLogger {
    fn log(&self, level: Level, component: &str, message: &str) {
        self.lifecycle
            .journal
            .record(format!("log:{level}:{component}:{message}"));
    }
}

impl Component for JournalLogger {
    fn initializer(&self) -> Option<Arc<dyn Initializer>> {
        Some(self.lifecycle.clone())
    }

    fn dependency(self: Arc<Self>) -> Dependency {
        Dependency::Logger(self)
    }
}

#[async_trait]
impl Initializer for LoggerLifecycle {
    fn can_run(&self) -> bool {
        false
    }

    async fn run(&self, _ctx: Context) -> Result<(), ComponentError> {
        self.journal.record("logger:run");
        Ok(())
    }
}

#[derive(Clone, Copy)]
pub enum RunMode {
    Succeed,
    Fail,
    Panic,
    /// Block until the context is cancelled.
    UntilCancelled,
}

#[derive(Clone, Copy)]
pub enum StopMode {
    Succeed,
    Fail,
    Hang,
}

/// Configurable component that journals every lifecycle call.
pub struct Probe {
    lifecycle: Arc<ProbeLifecycle>,
}

struct ProbeLifecycle {
    name: String,
    journal: Journal,
    wants: Vec<String>,
    run: Option<RunMode>,
    stop: Option<StopMode>,
    logger: Mutex<Option<Arc<dyn Logger>>>,
    injected: Mutex<Vec<Option<Role>>>,
}

impl Probe {
    pub fn new(name: &str, journal: &Journal) -> Self {
        Self {
            lifecycle: Arc::new(ProbeLifecycle {
                name: name.to_string(),
                journal: journal.clone(),
                wants: Vec::new(),
                run: None,
                stop: None,
                logger: Mutex::new(None),
                injected: Mutex::new(Vec::new()),
            }),
        }
    }

    fn edit(mut self, f: impl FnOnce(&mut ProbeLifecycle)) -> Self {
        f(Arc::get_mut(&mut self.lifecycle).expect("probe configured before sharing"));
        self
    }

    pub fn depends_on(self, names: &[&str]) -> Self {
        let names = names.iter().map(|n| n.to_string()).collect();
        self.edit(|l| l.wants = names)
    }

    pub fn runs(self, mode: RunMode) -> Self {
        self.edit(|l| l.run = Some(mode))
    }

    pub fn stops(self, mode: StopMode) -> Self {
        self.edit(|l| l.stop = Some(mode))
    }

    /// Roles injected so far, `None` for missing names.
    pub fn injected(&self) -> Vec<Option<Role>> {
        self.lifecycle.injected.lock().unwrap().clone()
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Component for Probe {
    fn initializer(&self) -> Option<Arc<dyn Initializer>> {
        Some(self.lifecycle.clone())
    }

    fn dependency(self: Arc<Self>) -> Dependency {
        Dependency::Component {
            role: Role::Database,
            component: self,
        }
    }
}

#[async_trait]
impl Initializer for ProbeLifecycle {
    fn dependencies(&self) -> Vec<String> {
        self.wants.clone()
    }

    fn add_dependency(&self, dependency: Dependency) -> Result<(), ComponentError> {
        self.journal.record(format!("{}:inject", self.name));
        self.injected.lock().unwrap().push(dependency.role());
        if let Dependency::Logger(logger) = dependency {
            *self.logger.lock().unwrap() = Some(logger);
        }
        Ok(())
    }

    fn can_run(&self) -> bool {
        self.run.is_some()
    }

    async fn run(&self, ctx: Context) -> Result<(), ComponentError> {
        self.journal.record(format!("{}:run", self.name));
        let logger = self.logger.lock().unwrap().clone();
        if let Some(logger) = logger {
            logger.info(&self.name, "running");
        }

        match self.run {
            Some(RunMode::Fail) => Err(ComponentError::msg(format!("{} broke", self.name))),
            Some(RunMode::Panic) => panic!("{} panicked", self.name),
            Some(RunMode::UntilCancelled) => {
                ctx.cancelled().await;
                self.journal.record(format!("{}:cancelled", self.name));
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn can_stop(&self) -> bool {
        self.stop.is_some()
    }

    async fn stop(&self, _ctx: Context) -> Result<(), ComponentError> {
        self.journal.record(format!("{}:stop", self.name));
        match self.stop {
            Some(StopMode::Fail) => Err(ComponentError::msg(format!("{} refused to stop", self.name))),
            Some(StopMode::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
