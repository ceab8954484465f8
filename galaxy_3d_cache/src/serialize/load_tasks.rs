/// Load jobs, their registry and the load session.
///
/// A load job handles every element of a document whose tag matches its
/// root tag. Jobs declare the jobs they need to run first (materials need
/// textures and effects to be addressable by name); the registry orders
/// them topologically, falling back to registration order between
/// independent jobs.

use std::sync::Arc;
use parking_lot::RwLock;
use crate::error::Result;
use crate::parameter::ParameterSet;
use crate::xml::XmlNode;
use crate::{engine_bail, engine_debug, engine_trace};
use super::save_queue::SessionState;

pub trait LoadJob: Send + Sync {
    /// Unique job name, used in prerequisite lists
    fn name(&self) -> &'static str;

    /// Tag of the elements this job loads
    fn root_tag(&self) -> &'static str;

    /// Jobs that must run before this one
    fn prerequisites(&self) -> &'static [&'static str] {
        &[]
    }

    /// Load one matching element. Returns the number of resources it added.
    fn load(&self, node: &XmlNode, params: &ParameterSet) -> Result<usize>;
}

// ===== REGISTRY =====

#[derive(Default)]
pub struct LoadTaskRegistry {
    jobs: RwLock<Vec<Arc<dyn LoadJob>>>,
}

impl LoadTaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in jobs
    pub fn with_builtin() -> Result<Self> {
        let registry = Self::new();
        for job in super::loaders::builtin_load_jobs() {
            registry.register(job)?;
        }
        Ok(registry)
    }

    /// # Errors
    ///
    /// `AlreadyExists` when a job with the same name is registered.
    pub fn register(&self, job: Arc<dyn LoadJob>) -> Result<()> {
        let mut jobs = self.jobs.write();
        if jobs.iter().any(|existing| existing.name() == job.name()) {
            engine_bail!(AlreadyExists => "galaxy3d::LoadTaskRegistry",
                "Load job '{}' is already registered", job.name());
        }
        engine_debug!("galaxy3d::LoadTaskRegistry", "Registered load job '{}' (<{}>, after {:?})",
            job.name(), job.root_tag(), job.prerequisites());
        jobs.push(job);
        Ok(())
    }

    pub fn job(&self, name: &str) -> Option<Arc<dyn LoadJob>> {
        self.jobs.read().iter().find(|job| job.name() == name).cloned()
    }

    /// Jobs in registration order
    pub fn jobs(&self) -> Vec<Arc<dyn LoadJob>> {
        self.jobs.read().clone()
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }

    /// Jobs in execution order
    ///
    /// Each job comes after its prerequisites; among ready jobs the earliest
    /// registered goes first.
    ///
    /// # Errors
    ///
    /// `InitializationFailed` when a prerequisite is not registered or the
    /// prerequisites form a cycle.
    pub fn ordered(&self) -> Result<Vec<Arc<dyn LoadJob>>> {
        let jobs = self.jobs();
        for job in &jobs {
            for prerequisite in job.prerequisites() {
                if !jobs.iter().any(|other| other.name() == *prerequisite) {
                    engine_bail!(InitializationFailed => "galaxy3d::LoadTaskRegistry",
                        "Load job '{}' needs unregistered job '{}'", job.name(), prerequisite);
                }
            }
        }

        let mut placed = vec![false; jobs.len()];
        let mut ordered = Vec::with_capacity(jobs.len());
        while ordered.len() < jobs.len() {
            let ready = (0..jobs.len()).find(|&i| {
                !placed[i]
                    && jobs[i].prerequisites().iter().all(|prerequisite| {
                        jobs.iter()
                            .zip(&placed)
                            .any(|(job, &done)| done && job.name() == *prerequisite)
                    })
            });
            match ready {
                Some(i) => {
                    placed[i] = true;
                    ordered.push(jobs[i].clone());
                }
                None => {
                    let stuck: Vec<&str> = jobs
                        .iter()
                        .zip(&placed)
                        .filter(|(_, &done)| !done)
                        .map(|(job, _)| job.name())
                        .collect();
                    engine_bail!(InitializationFailed => "galaxy3d::LoadTaskRegistry",
                        "Load job prerequisites form a cycle among {:?}", stuck);
                }
            }
        }
        Ok(ordered)
    }
}

// ===== SESSION =====

/// Summary of a finished load session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    /// Matching elements processed
    pub elements: usize,
    /// Resources added to caches
    pub resources: usize,
}

/// One load session: walk the document, then run the collected work
pub struct LoadSession {
    jobs: Vec<Arc<dyn LoadJob>>,
    state: SessionState,
}

impl LoadSession {
    pub fn new(registry: &LoadTaskRegistry) -> Result<Self> {
        Ok(Self {
            jobs: registry.ordered()?,
            state: SessionState::Idle,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Load every element of `root` handled by a registered job
    ///
    /// All matching elements are gathered in one walk, then each job runs
    /// over its elements in execution order. The first failure stops the
    /// session; resources loaded before it stay cached.
    pub fn run(&mut self, root: &XmlNode, params: &ParameterSet) -> Result<LoadReport> {
        if self.state != SessionState::Idle {
            engine_bail!(InvalidParameter => "galaxy3d::LoadSession",
                "Load session already used ({:?})", self.state);
        }

        self.state = SessionState::Walking;
        let mut work: Vec<Vec<&XmlNode>> = vec![Vec::new(); self.jobs.len()];
        root.walk(&mut |node| {
            if let Some(index) = self.jobs.iter().position(|job| job.root_tag() == node.tag()) {
                work[index].push(node);
            }
        });

        self.state = SessionState::Draining;
        let mut report = LoadReport::default();
        for (job, nodes) in self.jobs.iter().zip(&work) {
            for node in nodes {
                engine_trace!("galaxy3d::LoadSession", "Running load job '{}'", job.name());
                let result = job.load(node, params);
                match result {
                    Ok(count) => {
                        report.elements += 1;
                        report.resources += count;
                    }
                    Err(err) => {
                        self.state = SessionState::Done;
                        return Err(err);
                    }
                }
            }
        }

        self.state = SessionState::Done;
        engine_debug!("galaxy3d::LoadSession", "Load session done: {} element(s), {} resource(s)",
            report.elements, report.resources);
        Ok(report)
    }
}

/// Run a complete load session over `root`
pub fn load_document(root: &XmlNode, params: &ParameterSet, registry: &LoadTaskRegistry) -> Result<LoadReport> {
    LoadSession::new(registry)?.run(root, params)
}

#[cfg(test)]
#[path = "load_tasks_tests.rs"]
mod tests;
