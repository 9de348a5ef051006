//! Background thread that executes gateway calls.
//!
//! The UI loop submits [`Job`]s and drains [`Completion`]s with
//! [`FetchWorker::try_recv`], which never blocks. Jobs run one at a time in
//! submission order, so completions arrive in issue order.

use super::FetchGateway;
use crate::model::{FetchError, LinkInfo, LinkKey, LinkSummary, LogRecord};
use crate::stream::FetchTicket;
use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// The worker thread has exited and can no longer take jobs.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Fetch worker '{0}' stopped")]
pub struct WorkerStopped(pub &'static str);

/// A request for the worker.
#[derive(Debug, Clone)]
pub enum Job {
    /// One event-log page for the stream engine.
    Events(FetchTicket),
    /// `GET /links`.
    Links,
    /// `GET /links/{src}/{dst}`.
    LinkInfo(LinkKey),
    /// `GET /version`.
    Version,
}

/// Result of a finished [`Job`].
#[derive(Debug, Clone)]
pub enum Completion {
    /// Result of [`Job::Events`], tagged with the ticket it was issued under.
    Events {
        /// Ticket from the originating job.
        ticket: FetchTicket,
        /// Records or failure.
        result: Result<Vec<LogRecord>, FetchError>,
    },
    /// Result of [`Job::Links`].
    Links(Result<Vec<LinkSummary>, FetchError>),
    /// Result of [`Job::LinkInfo`].
    LinkInfo {
        /// Requested link direction.
        link: LinkKey,
        /// Snapshot or failure.
        result: Result<LinkInfo, FetchError>,
    },
    /// Result of [`Job::Version`].
    Version(Result<String, FetchError>),
}

/// Handle to a background gateway thread.
///
/// Dropping the handle closes the job channel; the thread exits after its
/// current request.
#[derive(Debug)]
pub struct FetchWorker {
    name: &'static str,
    jobs: Sender<Job>,
    completions: Receiver<Completion>,
}

impl FetchWorker {
    /// Spawn a named worker thread owning `gateway`.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn<G>(name: &'static str, gateway: G) -> io::Result<Self>
    where
        G: FetchGateway + Send + 'static,
    {
        let (jobs, job_rx) = mpsc::channel::<Job>();
        let (done_tx, completions) = mpsc::channel();

        thread::Builder::new()
            .name(format!("btp-{name}"))
            .spawn(move || {
                for job in job_rx {
                    if done_tx.send(execute(&gateway, job)).is_err() {
                        break;
                    }
                }
                debug!(worker = name, "fetch worker exiting");
            })?;

        Ok(Self {
            name,
            jobs,
            completions,
        })
    }

    /// Queue a job.
    ///
    /// # Errors
    ///
    /// Returns `WorkerStopped` if the thread has exited.
    pub fn submit(&self, job: Job) -> Result<(), WorkerStopped> {
        self.jobs.send(job).map_err(|_| WorkerStopped(self.name))
    }

    /// Take one finished job without blocking.
    ///
    /// # Errors
    ///
    /// Returns `WorkerStopped` if the thread has exited and nothing is left to drain.
    pub fn try_recv(&self) -> Result<Option<Completion>, WorkerStopped> {
        match self.completions.try_recv() {
            Ok(completion) => Ok(Some(completion)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(WorkerStopped(self.name)),
        }
    }

    /// Wait up to `timeout` for one finished job.
    ///
    /// # Errors
    ///
    /// Returns `WorkerStopped` if the thread has exited.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<Completion>, WorkerStopped> {
        match self.completions.recv_timeout(timeout) {
            Ok(completion) => Ok(Some(completion)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(WorkerStopped(self.name)),
        }
    }
}

fn execute<G: FetchGateway>(gateway: &G, job: Job) -> Completion {
    match job {
        Job::Events(ticket) => {
            let result = gateway.fetch_events(&ticket.filter, ticket.page);
            Completion::Events { ticket, result }
        }
        Job::Links => Completion::Links(gateway.fetch_links()),
        Job::LinkInfo(link) => {
            let result = gateway.fetch_link_info(&link);
            Completion::LinkInfo { link, result }
        }
        Job::Version => Completion::Version(gateway.fetch_version()),
    }
}
