/// Tests for SaveQueue and SaveSession

use super::*;
use crate::error::Error;

// ============================================================================
// Helpers
// ============================================================================

/// Writes one `<note>` per queued line
#[derive(Default)]
struct NoteJob {
    lines: Vec<String>,
    written: usize,
}

impl SaveJob for NoteJob {
    fn kind(&self) -> &'static str {
        "notes"
    }

    fn save(&mut self, root: &mut XmlNode, _params: &mut ParameterSet) -> Result<()> {
        for line in &self.lines[self.written..] {
            root.child_or_insert("notes").push_child(XmlNode::new("note").with_attribute("text", line));
        }
        self.written = self.lines.len();
        Ok(())
    }
}

impl SingletonJob for NoteJob {
    const SLOT: &'static str = "SaveJob::Test::Notes";
}

/// Hands a line to `NoteJob` while draining
#[derive(Default)]
struct ForwardJob;

impl SaveJob for ForwardJob {
    fn kind(&self) -> &'static str {
        "forward"
    }

    fn save(&mut self, _root: &mut XmlNode, params: &mut ParameterSet) -> Result<()> {
        find_or_create::<NoteJob>(params)?.lock().lines.push("forwarded".to_string());
        Ok(())
    }
}

impl SingletonJob for ForwardJob {
    const SLOT: &'static str = "SaveJob::Test::Forward";
}

#[derive(Default)]
struct FailingJob;

impl SaveJob for FailingJob {
    fn kind(&self) -> &'static str {
        "failing"
    }

    fn save(&mut self, _root: &mut XmlNode, _params: &mut ParameterSet) -> Result<()> {
        Err(Error::Io("disk full".to_string()))
    }
}

impl SingletonJob for FailingJob {
    const SLOT: &'static str = "SaveJob::Test::Failing";
}

fn notes(root: &XmlNode) -> Vec<String> {
    root.child("notes")
        .map(|block| {
            block.children().iter()
                .filter_map(|note| note.attribute("text").map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// Tests: Session lifecycle
// ============================================================================

#[test]
fn test_session_states() {
    let mut params = ParameterSet::new();
    let session = SaveSession::begin(&mut params).unwrap();
    assert_eq!(session.state(), SessionState::Walking);
    assert!(params.contains(builtin::SAVE_QUEUE));

    let queue = session.queue().clone();
    let runs = session.finish(&mut XmlNode::new("scene"), &mut params).unwrap();
    assert_eq!(runs, 0);
    assert_eq!(queue.state(), SessionState::Done);
    assert!(!params.contains(builtin::SAVE_QUEUE));
}

#[test]
fn test_nested_session_rejected() {
    let mut params = ParameterSet::new();
    let _session = SaveSession::begin(&mut params).unwrap();
    assert!(matches!(SaveSession::begin(&mut params), Err(Error::AlreadyExists(_))));
}

#[test]
fn test_find_or_create_outside_session() {
    let mut params = ParameterSet::new();
    let result = find_or_create::<NoteJob>(&mut params);
    assert!(matches!(result, Err(Error::InvalidParameter(_))));
}

// ============================================================================
// Tests: Singleton jobs
// ============================================================================

#[test]
fn test_singleton_per_session() {
    let mut params = ParameterSet::new();
    let session = SaveSession::begin(&mut params).unwrap();

    let first = find_or_create::<NoteJob>(&mut params).unwrap();
    let second = find_or_create::<NoteJob>(&mut params).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(session.queue().pending(), 1);

    let mut root = XmlNode::new("scene");
    session.finish(&mut root, &mut params).unwrap();

    // A new session starts with a fresh job
    let _session = SaveSession::begin(&mut params).unwrap();
    let third = find_or_create::<NoteJob>(&mut params).unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
}

#[test]
fn test_job_slots_cleared_after_session() {
    let mut params = ParameterSet::new();
    save_document(&mut XmlNode::new("scene"), &mut params, |_, params| {
        find_or_create::<NoteJob>(params)?;
        Ok(())
    })
    .unwrap();

    let slot = ParameterLayout::global().id(NoteJob::SLOT).unwrap();
    assert!(!params.contains(slot));
    assert!(params.is_empty());
}

// ============================================================================
// Tests: Draining
// ============================================================================

#[test]
fn test_walk_then_drain() {
    let mut params = ParameterSet::new();
    let mut root = XmlNode::new("scene");

    let runs = save_document(&mut root, &mut params, |root, params| {
        root.push_child(XmlNode::new("entity"));
        let job = find_or_create::<NoteJob>(params)?;
        job.lock().lines.push("a".to_string());
        find_or_create::<NoteJob>(params)?.lock().lines.push("b".to_string());
        Ok(())
    })
    .unwrap();

    assert_eq!(runs, 1);
    assert_eq!(root.children()[0].tag(), "entity");
    assert_eq!(notes(&root), vec!["a", "b"]);
}

#[test]
fn test_job_queues_more_work_while_draining() {
    let mut params = ParameterSet::new();
    let mut root = XmlNode::new("scene");

    let runs = save_document(&mut root, &mut params, |_, params| {
        find_or_create::<NoteJob>(params)?.lock().lines.push("walked".to_string());
        find_or_create::<ForwardJob>(params)?;
        Ok(())
    })
    .unwrap();

    // NoteJob ran before ForwardJob and was queued again by it
    assert_eq!(runs, 3);
    assert_eq!(notes(&root), vec!["walked", "forwarded"]);
    assert_eq!(root.children_named("notes").count(), 1);
}

#[test]
fn test_failing_job_ends_session() {
    let mut params = ParameterSet::new();
    let result = save_document(&mut XmlNode::new("scene"), &mut params, |_, params| {
        find_or_create::<FailingJob>(params)?;
        find_or_create::<NoteJob>(params)?;
        Ok(())
    });

    assert!(matches!(result, Err(Error::Io(_))));
    assert!(params.is_empty());
    assert!(SaveSession::begin(&mut params).is_ok());
}

#[test]
fn test_failing_walk_ends_session() {
    let mut params = ParameterSet::new();
    let mut root = XmlNode::new("scene");
    let result = save_document(&mut root, &mut params, |_, params| {
        find_or_create::<NoteJob>(params)?.lock().lines.push("lost".to_string());
        Err(Error::InvalidParameter("bad entity".to_string()))
    });

    assert!(matches!(result, Err(Error::InvalidParameter(_))));
    assert!(root.children().is_empty());
    assert!(!params.contains(builtin::SAVE_QUEUE));
}
