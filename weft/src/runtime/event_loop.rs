use crate::error::{Error, Result};
use crate::runtime::context::enter_context;
use crate::runtime::injector::InjectorHandle;
use crate::runtime::outcome::{Notify, Submitter};
use crate::task::{JoinCounter, Kind, Observer, Sequence, Settle, Step, TaskHandle, TaskId};

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

/// Payload of a panic raised by a user callback.
type Panic = Box<dyn Any + Send>;

/// A started task, owned by the event loop until it is disposed.
struct Node {
    /// Composite this task reports to.
    parent: Option<TaskId>,

    /// Completion observers registered on the handle.
    observers: Vec<Observer>,

    state: NodeState,
}

enum NodeState {
    /// Waiting for its work item.
    Leaf(Settle),

    /// Waiting for its children to report.
    Weave(JoinCounter),

    /// Waiting for its running child; holds the ones not started yet.
    Queue(Sequence),
}

/// Follow-up work posted to the loop's own queue.
///
/// These run on a later turn, never on the stack that triggered them.
enum Event {
    /// Start the next child of a queue.
    Launch { task: TaskHandle, parent: TaskId },

    /// Complete a weave or queue.
    Settle { id: TaskId, success: bool },
}

/// State of an owner context.
///
/// Everything here is touched only by the thread that owns the loop. Worker
/// threads talk to it solely through the completion channel, by sending the
/// id of the task whose work has finished.
pub(crate) struct Owner {
    /// Job queue of the pool work is submitted to.
    injector: InjectorHandle,

    /// Cloned into every submitted job.
    sender: Sender<TaskId>,

    /// Ids of leaves whose work has finished.
    receiver: Receiver<TaskId>,

    /// Started tasks that have not completed yet.
    nodes: RefCell<HashMap<TaskId, Node>>,

    events: RefCell<VecDeque<Event>>,

    next_id: Cell<u64>,

    /// Started tasks not yet disposed.
    live: Cell<usize>,
}

impl Owner {
    fn new(injector: InjectorHandle) -> Self {
        let (sender, receiver) = mpsc::channel();

        Self {
            injector,
            sender,
            receiver,
            nodes: RefCell::new(HashMap::new()),
            events: RefCell::new(VecDeque::new()),
            next_id: Cell::new(0),
            live: Cell::new(0),
        }
    }

    fn allocate(&self) -> TaskId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        TaskId(id)
    }

    fn register(&self, id: TaskId, node: Node) {
        self.nodes.borrow_mut().insert(id, node);
        self.live.set(self.live.get() + 1);
    }

    fn post(&self, event: Event) {
        self.events.borrow_mut().push_back(event);
    }

    /// Starts `task`, reporting to `parent` when it completes.
    ///
    /// Leaf work is submitted immediately. A weave starts all its children, a
    /// queue only its first one. Nothing completes here: completions are
    /// delivered by later turns of the loop.
    pub(crate) fn launch(&self, task: TaskHandle, parent: Option<TaskId>) {
        let id = self.allocate();
        let (kind, observers) = task.into_parts();

        match kind {
            Kind::Leaf(leaf) => {
                tracing::debug!(task = %id, parent = ?parent, "starting leaf");

                let notify = Notify::new(id, self.sender.clone());
                let settle = leaf.launch(Submitter::new(self.injector.clone(), notify));

                self.register(
                    id,
                    Node {
                        parent,
                        observers,
                        state: NodeState::Leaf(settle),
                    },
                );
            }
            Kind::Weave(children) => {
                tracing::debug!(
                    task = %id,
                    parent = ?parent,
                    children = children.len(),
                    "starting weave"
                );

                let empty = children.is_empty();

                self.register(
                    id,
                    Node {
                        parent,
                        observers,
                        state: NodeState::Weave(JoinCounter::new(children.len())),
                    },
                );

                if empty {
                    self.post(Event::Settle { id, success: true });
                }

                for child in children {
                    self.launch(child, Some(id));
                }
            }
            Kind::Queue(children) => {
                tracing::debug!(
                    task = %id,
                    parent = ?parent,
                    children = children.len(),
                    "starting queue"
                );

                let (sequence, first) = Sequence::new(children);

                self.register(
                    id,
                    Node {
                        parent,
                        observers,
                        state: NodeState::Queue(sequence),
                    },
                );

                match first {
                    Some(first) => self.launch(first, Some(id)),
                    None => self.post(Event::Settle { id, success: true }),
                }
            }
        }
    }

    /// Handles the completion message of a leaf.
    fn resolve(&self, id: TaskId) {
        let node = {
            let mut nodes = self.nodes.borrow_mut();

            let is_leaf = matches!(
                nodes.get(&id),
                Some(Node {
                    state: NodeState::Leaf(_),
                    ..
                })
            );

            if is_leaf { nodes.remove(&id) } else { None }
        };

        let Some(Node {
            parent,
            observers,
            state: NodeState::Leaf(settle),
        }) = node
        else {
            tracing::warn!(task = %id, "completion for a task that is not a live leaf");
            return;
        };

        // A panicking success or failure callback counts as a failed task.
        let (success, panicked) = match panic::catch_unwind(AssertUnwindSafe(settle)) {
            Ok(success) => (success, None),
            Err(payload) => {
                tracing::error!(task = %id, "task callback panicked");
                (false, Some(payload))
            }
        };

        let observed = self.complete(id, parent, observers, success);
        self.dispose(id);

        if let Some(payload) = panicked.or(observed) {
            panic::resume_unwind(payload);
        }
    }

    /// Completes a weave or queue.
    fn finish(&self, id: TaskId, success: bool) {
        let node = self.nodes.borrow_mut().remove(&id);

        let Some(Node {
            parent,
            observers,
            state,
        }) = node
        else {
            tracing::warn!(task = %id, "settle for a task that is not live");
            return;
        };

        let observed = self.complete(id, parent, observers, success);

        // Queue children cut off by a failure are released here, unstarted.
        drop(state);
        self.dispose(id);

        if let Some(payload) = observed {
            panic::resume_unwind(payload);
        }
    }

    /// Raises the completion event: observers first, then the parent.
    ///
    /// A panicking observer does not stop the others or the report to the
    /// parent. The first panic payload is returned so the caller can resume
    /// it once the task is disposed.
    fn complete(
        &self,
        id: TaskId,
        parent: Option<TaskId>,
        observers: Vec<Observer>,
        success: bool,
    ) -> Option<Panic> {
        tracing::debug!(task = %id, success, "task completed");

        let mut panicked = None;

        for observer in observers {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| observer(success))) {
                tracing::error!(task = %id, "completion observer panicked");
                panicked.get_or_insert(payload);
            }
        }

        if let Some(parent) = parent {
            self.report(parent, success);
        }

        panicked
    }

    /// Folds a child's result into its parent.
    ///
    /// Only the bookkeeping happens here; the consequence (completing the
    /// parent, starting the next child) is posted for a later turn.
    fn report(&self, parent: TaskId, success: bool) {
        let event = {
            let mut nodes = self.nodes.borrow_mut();

            match nodes.get_mut(&parent).map(|node| &mut node.state) {
                Some(NodeState::Weave(join)) => {
                    let all = join.record(success);

                    tracing::trace!(
                        task = %parent,
                        success,
                        remaining = join.remaining(),
                        "weave child reported"
                    );

                    all.map(|success| Event::Settle { id: parent, success })
                }
                Some(NodeState::Queue(sequence)) => {
                    tracing::trace!(
                        task = %parent,
                        success,
                        pending = sequence.pending(),
                        "queue child reported"
                    );

                    Some(match sequence.report(success) {
                        Step::Start(task) => Event::Launch { task, parent },
                        Step::Finish(success) => Event::Settle { id: parent, success },
                    })
                }
                Some(NodeState::Leaf(_)) | None => {
                    tracing::warn!(
                        task = %parent,
                        "child reported to a task that is not a live composite"
                    );
                    None
                }
            }
        };

        if let Some(event) = event {
            self.post(event);
        }
    }

    fn dispose(&self, id: TaskId) {
        self.live.set(self.live.get() - 1);
        tracing::trace!(task = %id, "task disposed");
    }

    fn dispatch(&self, event: Event) {
        match event {
            Event::Launch { task, parent } => self.launch(task, Some(parent)),
            Event::Settle { id, success } => self.finish(id, success),
        }
    }

    /// Handles every message available right now, without blocking.
    fn turn(&self) -> usize {
        let mut handled = 0;

        loop {
            let event = self.events.borrow_mut().pop_front();

            if let Some(event) = event {
                self.dispatch(event);
                handled += 1;
                continue;
            }

            match self.receiver.try_recv() {
                Ok(id) => {
                    self.resolve(id);
                    handled += 1;
                }
                Err(_) => return handled,
            }
        }
    }

    fn is_idle(&self) -> bool {
        self.live.get() == 0 && self.events.borrow().is_empty()
    }

    /// Drives the loop until no task is live, or until `deadline`.
    fn drive(&self, deadline: Option<Instant>) -> Result<()> {
        loop {
            self.turn();

            if self.is_idle() {
                return Ok(());
            }

            let received = match deadline {
                None => self.receiver.recv().map_err(|_| Error::Disconnected),
                Some(deadline) => {
                    let wait = deadline.saturating_duration_since(Instant::now());

                    self.receiver.recv_timeout(wait).map_err(|err| match err {
                        RecvTimeoutError::Timeout => Error::Timeout {
                            live: self.live.get(),
                        },
                        RecvTimeoutError::Disconnected => Error::Disconnected,
                    })
                }
            };

            self.resolve(received?);
        }
    }
}

impl Drop for Owner {
    fn drop(&mut self) {
        let live = self.live.get();

        if live > 0 {
            tracing::warn!(live, "event loop dropped with live tasks; disposing them uncompleted");
        }
    }
}

/// An owner context.
///
/// The event loop owns every task started on it. Work runs on the pool;
/// callbacks, completion observers and all task bookkeeping run on the thread
/// driving the loop, one message at a time. The loop is `!Send`, so tasks and
/// their callbacks stay on that thread.
///
/// Cloning an `EventLoop` yields another handle to the same loop.
///
/// # Examples
///
/// ```rust,ignore
/// let runtime = RuntimeBuilder::new().build()?;
/// let event_loop = runtime.event_loop();
///
/// event_loop.start(weft::task(|| 6 * 7).on_done(|v| println!("{v}")));
/// event_loop.run()?;
/// ```
#[derive(Clone)]
pub struct EventLoop {
    owner: Rc<Owner>,
}

impl EventLoop {
    pub(crate) fn new(injector: InjectorHandle) -> Self {
        Self {
            owner: Rc::new(Owner::new(injector)),
        }
    }

    /// Runs `f` with this loop installed as the current thread's owner
    /// context, so [`TaskHandle::start`] inside `f` starts tasks here.
    ///
    /// Tasks started inside `f` only make progress once the loop is driven.
    pub fn enter<R>(&self, f: impl FnOnce() -> R) -> R {
        enter_context(self.owner.clone(), f)
    }

    /// Starts a task on this loop.
    pub fn start(&self, task: impl Into<TaskHandle>) {
        self.owner.launch(task.into(), None);
    }

    /// Drives the loop until every started task has completed and been
    /// disposed.
    ///
    /// Returns immediately if nothing is live. Blocks if a work item never
    /// returns; see [`run_timeout`](Self::run_timeout).
    ///
    /// # Panics
    ///
    /// Resumes the panic of a callback or observer. The task that raised it
    /// is disposed first and its parent is told it failed, so the loop can be
    /// driven again afterwards.
    pub fn run(&self) -> Result<()> {
        self.enter(|| self.owner.drive(None))
    }

    /// Like [`run`](Self::run), but gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if tasks are still live when the timeout
    /// elapses. They stay owned by the loop and can be driven further.
    pub fn run_timeout(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now().checked_add(timeout);
        self.enter(|| self.owner.drive(deadline))
    }

    /// Handles every message available right now and returns how many there
    /// were. Never blocks.
    ///
    /// Useful when the loop is embedded in another one, e.g. a UI frame loop.
    pub fn run_pending(&self) -> usize {
        self.enter(|| self.owner.turn())
    }

    /// Returns the number of started tasks not yet disposed, composites
    /// included.
    pub fn live_tasks(&self) -> usize {
        self.owner.live.get()
    }

    /// Returns `true` if no task is live.
    pub fn is_idle(&self) -> bool {
        self.owner.is_idle()
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoop")
            .field("live_tasks", &self.live_tasks())
            .finish()
    }
}
