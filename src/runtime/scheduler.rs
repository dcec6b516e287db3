//! Cooperative single-thread scheduler for deferred action steps.
//!
//! Async actions queue their continuation here. Nothing runs between
//! [`Scheduler::tick`] calls, so the host (an event loop, a test) decides
//! exactly when deferred work may touch the document.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;

pub(crate) struct Scheduler {
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
    in_flight: Rc<Cell<usize>>,
}

impl Scheduler {
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            pool: RefCell::new(pool),
            spawner,
            in_flight: Rc::new(Cell::new(0)),
        }
    }

    /// Queue a task. It starts running on the next tick.
    pub fn spawn(&self, task: impl Future<Output = ()> + 'static) {
        let counter = Rc::clone(&self.in_flight);
        counter.set(counter.get() + 1);
        let guarded = async move {
            task.await;
            counter.set(counter.get() - 1);
        };
        if let Err(error) = self.spawner.spawn_local(guarded) {
            self.in_flight.set(self.in_flight.get() - 1);
            tracing::error!(%error, "failed to queue deferred action");
        }
    }

    /// Drive every queued task until all are finished or suspended.
    pub fn tick(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    /// Tasks spawned but not yet finished.
    pub fn in_flight(&self) -> usize {
        self.in_flight.get()
    }
}
