/// Deferred save jobs and the session that drains them.
///
/// A save session installs a `SaveQueue` in the `SaveQueue` slot of the
/// caller's `ParameterSet`. While the document is walked, code that wants
/// to emit an aggregate block finds the single job of that kind through its
/// own slot (creating and queueing it on first use) and hands it work. Once
/// the walk ends the queue is drained: every job writes its block, and may
/// hand work to further jobs, until nothing is pending.

use std::collections::VecDeque;
use std::sync::Arc;
use parking_lot::Mutex;
use crate::error::Result;
use crate::parameter::{builtin, ParamId, ParameterLayout, ParameterSet};
use crate::xml::XmlNode;
use crate::{engine_bail, engine_debug, engine_trace};

/// Progress of one save or load session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// The document tree is being walked and jobs collected
    Walking,
    /// Collected jobs are running; they may queue more
    Draining,
    Done,
}

// ===== JOBS =====

/// Deferred unit of save work
pub trait SaveJob: Send + Sync {
    /// Label used in log messages
    fn kind(&self) -> &'static str;

    /// Write this job's output under `root`
    ///
    /// Runs once per time the job was queued. The session queue is reachable
    /// through `params`, so a job may hand work to other jobs.
    fn save(&mut self, root: &mut XmlNode, params: &mut ParameterSet) -> Result<()>;
}

/// Save jobs that exist at most once per session
pub trait SingletonJob: SaveJob + Default + 'static {
    /// Name of the parameter slot holding the session's instance
    const SLOT: &'static str;
}

pub type SharedJob<J> = Arc<Mutex<J>>;

// ===== QUEUE =====

pub struct SaveQueue {
    state: Mutex<SessionState>,
    pending: Mutex<VecDeque<Arc<Mutex<dyn SaveJob>>>>,
    /// Job slots filled during this session, emptied when it ends
    slots: Mutex<Vec<ParamId>>,
    executed: Mutex<usize>,
}

impl SaveQueue {
    fn new() -> Self {
        Self {
            state: Mutex::new(SessionState::Idle),
            pending: Mutex::new(VecDeque::new()),
            slots: Mutex::new(Vec::new()),
            executed: Mutex::new(0),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    fn set_state(&self, state: SessionState) {
        *self.state.lock() = state;
    }

    /// Queue a job; a job already waiting is not queued twice
    pub fn push(&self, job: Arc<Mutex<dyn SaveJob>>) -> bool {
        let mut pending = self.pending.lock();
        if pending.iter().any(|queued| Arc::ptr_eq(queued, &job)) {
            return false;
        }
        pending.push_back(job);
        true
    }

    fn pop(&self) -> Option<Arc<Mutex<dyn SaveJob>>> {
        self.pending.lock().pop_front()
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Number of job runs so far
    pub fn executed(&self) -> usize {
        *self.executed.lock()
    }

    /// The queue of the session running in `params`
    pub fn of(params: &ParameterSet) -> Result<Arc<SaveQueue>> {
        params.value_checked::<Arc<SaveQueue>>(builtin::SAVE_QUEUE).cloned()
    }
}

/// The session's instance of job `J`, created and queued on first use
///
/// Later calls return the same instance and queue it again if it already
/// ran, so work handed to it late is still written.
///
/// # Errors
///
/// `InvalidParameter` when no save session is running in `params`.
pub fn find_or_create<J: SingletonJob>(params: &mut ParameterSet) -> Result<SharedJob<J>> {
    let queue = SaveQueue::of(params)?;
    let slot = ParameterLayout::global().register(J::SLOT);

    let job = match params.get::<SharedJob<J>>(slot) {
        Some(job) => job.clone(),
        None => {
            let job: SharedJob<J> = Arc::new(Mutex::new(J::default()));
            params.set(slot, job.clone());
            queue.slots.lock().push(slot);
            engine_trace!("galaxy3d::SaveQueue", "Created save job '{}'", J::SLOT);
            job
        }
    };
    queue.push(job.clone());
    Ok(job)
}

// ===== SESSION =====

/// One save session over a `ParameterSet`
pub struct SaveSession {
    queue: Arc<SaveQueue>,
}

impl SaveSession {
    /// Install a fresh queue in `params` and start walking
    ///
    /// # Errors
    ///
    /// `AlreadyExists` when a session is already running in `params`.
    pub fn begin(params: &mut ParameterSet) -> Result<Self> {
        if params.contains(builtin::SAVE_QUEUE) {
            engine_bail!(AlreadyExists => "galaxy3d::SaveQueue", "A save session is already running");
        }
        let queue = Arc::new(SaveQueue::new());
        queue.set_state(SessionState::Walking);
        params.set(builtin::SAVE_QUEUE, queue.clone());
        Ok(Self { queue })
    }

    pub fn state(&self) -> SessionState {
        self.queue.state()
    }

    pub fn queue(&self) -> &Arc<SaveQueue> {
        &self.queue
    }

    /// Drain every queued job into `root` and end the session
    ///
    /// The job slots and the queue are removed from `params` whether or
    /// not a job fails. Returns the number of job runs.
    pub fn finish(self, root: &mut XmlNode, params: &mut ParameterSet) -> Result<usize> {
        self.queue.set_state(SessionState::Draining);
        let result = self.drain(root, params);

        for slot in self.queue.slots.lock().drain(..) {
            params.remove(slot);
        }
        params.remove(builtin::SAVE_QUEUE);
        self.queue.pending.lock().clear();
        self.queue.set_state(SessionState::Done);

        let executed = result?;
        engine_debug!("galaxy3d::SaveQueue", "Save session done: {} job run(s)", executed);
        Ok(executed)
    }

    fn drain(&self, root: &mut XmlNode, params: &mut ParameterSet) -> Result<usize> {
        while let Some(job) = self.queue.pop() {
            let mut job = job.lock();
            engine_trace!("galaxy3d::SaveQueue", "Running save job '{}'", job.kind());
            job.save(root, params)?;
            *self.queue.executed.lock() += 1;
        }
        Ok(self.queue.executed())
    }
}

/// Run a complete save session
///
/// `walk` writes the primary document and hands aggregate work to jobs;
/// the jobs then write their blocks under `root`.
pub fn save_document<F>(root: &mut XmlNode, params: &mut ParameterSet, walk: F) -> Result<usize>
where
    F: FnOnce(&mut XmlNode, &mut ParameterSet) -> Result<()>,
{
    let session = SaveSession::begin(params)?;
    if let Err(err) = walk(root, params) {
        // Still end the session so the set can be reused
        let _ = session.finish(&mut XmlNode::new("discarded"), params);
        return Err(err);
    }
    session.finish(root, params)
}

#[cfg(test)]
#[path = "save_queue_tests.rs"]
mod tests;
