//! Bounded worker pool for node-level work (hierarchy pages, point fetches).
//!
//! A fixed set of worker threads drains one FIFO queue of boxed tasks. The
//! queue has a fixed capacity: once it is full, [`Pool::submit`] blocks
//! until a worker pops an entry, so a traversal over millions of nodes never
//! buffers more than `queue_size` closures.
//!
//! # Lifecycle
//!
//! ```text
//!   new()/start()            stop()
//! Stopped ─────────► Running ─────────► Stopped
//!                      ▲  cycle()/resize() │
//!                      └───────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let pool = Pool::new(8, 16)?;
//! for key in keys {
//!     pool.submit(move || fetch_and_decode(key))?;
//! }
//! pool.await_idle();
//! for message in pool.errors() {
//!     tracing::warn!("{message}");
//! }
//! ```
//!
//! A failing task never stops the pool. Its error (or panic message) is
//! stored and the worker moves on to the next task.

use std::collections::VecDeque;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use serde::Deserialize;
use web_time::Instant;

use crate::error::{EptError, Result};

/// Unit of work accepted by the pool.
pub type Task = Box<dyn FnOnce() -> anyhow::Result<()> + Send + 'static>;

// =============================================================================
// PoolConfig
// =============================================================================

/// Pool sizing, deserializable from a reader's options.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
  /// Worker thread count (clamped to at least 1)
  pub threads: usize,
  /// Tasks that may wait for a worker before `submit` blocks (at least 1)
  pub queue_size: usize,
  /// Log every task failure at `warn` instead of `debug`
  pub verbose: bool,
}

impl Default for PoolConfig {
  fn default() -> Self {
    Self {
      threads: thread::available_parallelism().map_or(1, |n| n.get()),
      queue_size: 1,
      verbose: true,
    }
  }
}

// =============================================================================
// Shared state
// =============================================================================

/// Everything guarded by the pool lock.
struct State {
  tasks: VecDeque<Task>,
  /// Tasks popped from the queue and not yet finished
  outstanding: usize,
  running: bool,
  errors: Vec<String>,
}

struct Shared {
  state: Mutex<State>,
  /// Producers: queue has room (or the pool stopped)
  has_room: Condvar,
  /// Workers: queue non-empty (or the pool stopped)
  has_work: Condvar,
  /// `await_idle`: queue empty and nothing outstanding
  idle: Condvar,
  queue_size: usize,
  verbose: bool,
}

impl Shared {
  // Tasks run with the lock released and panics are caught, so the lock can
  // only be poisoned by a bug in the pool itself; the state stays usable.
  fn lock(&self) -> MutexGuard<'_, State> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

// =============================================================================
// Pool
// =============================================================================

/// Fixed-size thread pool with a bounded FIFO queue.
///
/// `submit` and `await_idle` take `&self` and may be called from several
/// threads at once. Lifecycle changes take `&mut self`, so no submission can
/// race a shutdown.
pub struct Pool {
  shared: Arc<Shared>,
  threads: Vec<JoinHandle<()>>,
  num_threads: usize,
}

impl Pool {
  /// Create and start a pool. Zero sizes are clamped to 1.
  pub fn new(num_threads: usize, queue_size: usize) -> Result<Self> {
    Self::from_config(&PoolConfig {
      threads: num_threads,
      queue_size,
      ..PoolConfig::default()
    })
  }

  pub fn from_config(config: &PoolConfig) -> Result<Self> {
    let mut pool = Self {
      shared: Arc::new(Shared {
        state: Mutex::new(State {
          tasks: VecDeque::new(),
          outstanding: 0,
          running: false,
          errors: Vec::new(),
        }),
        has_room: Condvar::new(),
        has_work: Condvar::new(),
        idle: Condvar::new(),
        queue_size: config.queue_size.max(1),
        verbose: config.verbose,
      }),
      threads: Vec::new(),
      num_threads: config.threads.max(1),
    };
    pool.start()?;
    Ok(pool)
  }

  /// Spawn the worker threads. No-op if already running.
  ///
  /// If a worker cannot be spawned, the ones already started are shut down
  /// again and the pool is left stopped.
  pub fn start(&mut self) -> Result<()> {
    self.start_with(spawn_worker)
  }

  fn start_with<F>(&mut self, mut spawn: F) -> Result<()>
  where
    F: FnMut(usize, Arc<Shared>) -> io::Result<JoinHandle<()>>,
  {
    {
      let mut state = self.shared.lock();
      if state.running {
        return Ok(());
      }
      state.running = true;
    }

    for i in 0..self.num_threads {
      match spawn(i, Arc::clone(&self.shared)) {
        Ok(handle) => self.threads.push(handle),
        Err(err) => {
          tracing::error!(started = self.threads.len(), "failed to spawn pool worker: {err}");
          self.stop();
          return Err(err.into());
        }
      }
    }

    tracing::debug!(
      threads = self.num_threads,
      queue_size = self.shared.queue_size,
      "pool started"
    );
    Ok(())
  }

  /// Refuse new tasks, let the workers drain everything already queued, and
  /// wait for every worker to exit. No-op if already stopped.
  pub fn stop(&mut self) {
    {
      let mut state = self.shared.lock();
      if !state.running {
        return;
      }
      state.running = false;
    }

    self.shared.has_work.notify_all();
    self.shared.has_room.notify_all();

    for handle in self.threads.drain(..) {
      if handle.join().is_err() {
        tracing::error!("pool worker exited by panic");
      }
    }

    tracing::debug!("pool stopped");
  }

  /// Stop and restart with the same thread count.
  pub fn cycle(&mut self) -> Result<()> {
    self.stop();
    self.start()
  }

  /// Stop, change the thread count (at least 1) and restart.
  pub fn resize(&mut self, num_threads: usize) -> Result<()> {
    self.stop();
    self.num_threads = num_threads.max(1);
    tracing::debug!(threads = self.num_threads, "pool resized");
    self.start()
  }

  /// Queue `task`, blocking while the queue is full.
  ///
  /// Fails with [`EptError::StoppedPool`] if the pool is not running.
  pub fn submit<F>(&self, task: F) -> Result<()>
  where
    F: FnOnce() -> anyhow::Result<()> + Send + 'static,
  {
    let shared = &*self.shared;
    let mut state = shared.lock();
    if !state.running {
      return Err(EptError::StoppedPool);
    }

    state = shared
      .has_room
      .wait_while(state, |s| s.running && s.tasks.len() >= shared.queue_size)
      .unwrap_or_else(PoisonError::into_inner);
    if !state.running {
      return Err(EptError::StoppedPool);
    }

    state.tasks.push_back(Box::new(task));
    drop(state);

    shared.has_work.notify_one();
    Ok(())
  }

  /// Block until the queue is empty and no task is executing.
  ///
  /// Other threads may keep submitting meanwhile; this only observes a
  /// moment at which the pool was idle.
  pub fn await_idle(&self) {
    let state = self.shared.lock();
    let _state = self
      .shared
      .idle
      .wait_while(state, |s| s.outstanding > 0 || !s.tasks.is_empty())
      .unwrap_or_else(PoisonError::into_inner);
  }

  /// Messages of every failed task since the last [`Pool::clear_errors`],
  /// in no particular order.
  ///
  /// The list is only complete once the pool is idle or stopped.
  pub fn errors(&self) -> Vec<String> {
    self.shared.lock().errors.clone()
  }

  pub fn clear_errors(&self) {
    self.shared.lock().errors.clear();
  }

  pub fn is_running(&self) -> bool {
    self.shared.lock().running
  }

  /// Tasks waiting for a worker.
  pub fn queued(&self) -> usize {
    self.shared.lock().tasks.len()
  }

  /// Queue capacity.
  pub fn queue_size(&self) -> usize {
    self.shared.queue_size
  }

  /// Configured worker count.
  pub fn size(&self) -> usize {
    self.num_threads
  }

  pub fn num_threads(&self) -> usize {
    self.num_threads
  }
}

impl Drop for Pool {
  fn drop(&mut self) {
    self.stop();
  }
}

// =============================================================================
// Worker
// =============================================================================

fn spawn_worker(i: usize, shared: Arc<Shared>) -> io::Result<JoinHandle<()>> {
  thread::Builder::new()
    .name(format!("ept-pool-{i}"))
    .spawn(move || work(&shared))
}

/// Worker loop: run tasks until the pool is stopped and the queue is empty.
fn work(shared: &Shared) {
  loop {
    let mut state = shared
      .has_work
      .wait_while(shared.lock(), |s| s.running && s.tasks.is_empty())
      .unwrap_or_else(PoisonError::into_inner);

    // Woken with nothing queued means the pool is stopping.
    let Some(task) = state.tasks.pop_front() else {
      return;
    };
    state.outstanding += 1;
    drop(state);

    // A slot opened up for a blocked submit().
    shared.has_room.notify_one();

    let start = Instant::now();
    let outcome = run(task);
    tracing::trace!(elapsed_us = start.elapsed().as_micros() as u64, ok = outcome.is_ok(), "pool task finished");

    let mut state = shared.lock();
    state.outstanding -= 1;
    if let Err(message) = outcome {
      if shared.verbose {
        tracing::warn!("Exception in pool task: {message}");
      } else {
        tracing::debug!("Exception in pool task: {message}");
      }
      state.errors.push(message);
    }
    let idle = state.outstanding == 0 && state.tasks.is_empty();
    drop(state);

    if idle {
      shared.idle.notify_all();
    }
  }
}

/// Run one task, reducing an error or panic to its message.
fn run(task: Task) -> std::result::Result<(), String> {
  match panic::catch_unwind(AssertUnwindSafe(task)) {
    Ok(Ok(())) => Ok(()),
    Ok(Err(err)) => Err(format!("{err:#}")),
    Err(payload) => Err(
      payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "Unknown error".to_string()),
    ),
  }
}

#[cfg(test)]
#[path = "pool_test.rs"]
mod pool_test;
