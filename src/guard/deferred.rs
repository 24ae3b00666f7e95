use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::ReentrantMutex;
use tracing::{debug, warn};

use super::error::AcquireError;
use super::metrics;
use super::pool::{PoolError, PooledResource};
use super::sink::LogSink;

#[derive(Debug, Default)]
struct InitState {
    initialized: bool,
    // set while the pending sink is pushed into the pool
    assigning_sink: bool,
    pending_sink: Option<LogSink>,
    pending_abandoned_sink: Option<LogSink>,
}

type Push<P> = fn(&P, LogSink) -> Result<(), PoolError>;

/// Wraps a pool handle so that attaching a log sink does not realize the
/// pool. The sink (and the abandoned-connection sink) is held back until the
/// first `acquire`, which pushes it into the pool exactly once.
///
/// The transition lock is reentrant: a pool whose `set_sink` calls back into
/// this guard on the same thread sees the transition as already underway
/// (and its nested `set_sink` is ignored), while other threads block until
/// the transition is finished.
pub struct DeferredInitGuard<P: PooledResource> {
    pool: P,
    initialized: AtomicBool,
    state: ReentrantMutex<RefCell<InitState>>,
}

impl<P: PooledResource> DeferredInitGuard<P> {
    pub fn new(pool: P) -> Self {
        Self {
            pool,
            initialized: AtomicBool::new(false),
            state: ReentrantMutex::new(RefCell::new(InitState::default())),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    pub fn inner(&self) -> &P {
        &self.pool
    }

    pub fn set_sink(&self, sink: LogSink) -> Result<(), PoolError> {
        self.assign(sink, |state| &mut state.pending_sink, P::set_sink)
    }

    pub fn set_abandoned_sink(&self, sink: LogSink) -> Result<(), PoolError> {
        self.assign(
            sink,
            |state| &mut state.pending_abandoned_sink,
            P::set_abandoned_sink,
        )
    }

    fn assign(
        &self,
        sink: LogSink,
        slot: fn(&mut InitState) -> &mut Option<LogSink>,
        push: Push<P>,
    ) -> Result<(), PoolError> {
        if self.is_initialized() {
            return push(&self.pool, sink);
        }

        let lock = self.state.lock();
        {
            let mut state = lock.borrow_mut();
            if state.assigning_sink {
                debug!("Ignoring nested sink assignment during pool initialization");
                return Ok(());
            }
            if !state.initialized {
                *slot(&mut *state) = Some(sink);
                return Ok(());
            }
        }
        push(&self.pool, sink)
    }

    pub fn sink(&self) -> Result<Option<LogSink>, PoolError> {
        if self.is_initialized() {
            return self.pool.sink();
        }

        let lock = self.state.lock();
        {
            let state = lock.borrow();
            if !state.initialized {
                return Ok(state.pending_sink.clone());
            }
        }
        self.pool.sink()
    }

    pub fn acquire(&self) -> Result<P::Connection, AcquireError> {
        if !self.is_initialized() {
            self.initialize()?;
        }

        match self.pool.acquire() {
            Ok(conn) => {
                metrics::inc_acquired("ok");
                Ok(conn)
            }
            Err(err) => {
                let err = AcquireError::classify(err);
                match &err {
                    AcquireError::Transient { cause, diagnostic } => {
                        metrics::inc_acquired("transient");
                        warn!(cause = %cause, sql_state = ?diagnostic.sql_state, "Timed out waiting for a connection");
                    }
                    AcquireError::NonTransient { cause, diagnostic } => {
                        metrics::inc_acquired("non_transient");
                        warn!(cause = %cause, sql_state = ?diagnostic.sql_state, "Cannot obtain a connection");
                    }
                    AcquireError::Pool(_) => metrics::inc_acquired("error"),
                }
                Err(err)
            }
        }
    }

    fn initialize(&self) -> Result<(), AcquireError> {
        let lock = self.state.lock();
        let pending = {
            let mut state = lock.borrow_mut();
            if state.initialized {
                // lost the race, or re-entered from inside the push
                return Ok(());
            }
            state.initialized = true;
            state.assigning_sink = true;
            (state.pending_sink.take(), state.pending_abandoned_sink.take())
        };
        let (mut sink, mut abandoned) = pending;
        let had_sink = sink.is_some();

        // no RefCell borrow may be held here: the pool can call back in
        let pushed = self
            .deliver(&mut sink, P::set_sink)
            .and_then(|()| self.deliver(&mut abandoned, P::set_abandoned_sink));

        let mut state = lock.borrow_mut();
        state.assigning_sink = false;
        if let Err(err) = pushed {
            // whatever was not delivered stays pending for the next attempt
            state.initialized = false;
            state.pending_sink = sink;
            state.pending_abandoned_sink = abandoned;
            warn!(error = %err, "Pending log sink rejected by pool");
            return Err(err.into());
        }
        drop(state);

        self.initialized.store(true, Ordering::Release);
        metrics::inc_initialized();
        debug!(sink = had_sink, "Pool initialized on first acquisition");
        Ok(())
    }

    fn deliver(&self, pending: &mut Option<LogSink>, push: Push<P>) -> Result<(), PoolError> {
        if let Some(sink) = pending.clone() {
            push(&self.pool, sink)?;
            *pending = None;
        }
        Ok(())
    }
}

impl<P: PooledResource> fmt::Debug for DeferredInitGuard<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredInitGuard")
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}
