//! Resolves a transaction hash into the smart-contract notification it emitted.
//!
//! The node only knows about a transaction once it is in a block, so the poller
//! asks on a fixed interval until the target contract's notification shows up.
//! Each poll is bounded by an optional deadline and attempt budget and can be
//! cancelled through its [`NotifyPollHandle`]. The interval timer lives inside
//! the polling future, so it is dropped on every exit path.

use std::future::{Future, pending};
use std::sync::Arc;
use std::time::Duration;

use ontbridge_explorer::{ExplorerClient, TxEvents};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::DapiError;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Option<Duration>,
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
            max_attempts: None,
        }
    }
}

impl PollPolicy {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }
}

/// Resolved invoke: the matched notification's states and the transaction hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyResult {
    pub result: Vec<Value>,
    pub transaction: String,
}

#[derive(Debug, Clone)]
pub struct NotifyPoller {
    client: ExplorerClient,
    policy: PollPolicy,
}

impl NotifyPoller {
    pub fn new(client: ExplorerClient, policy: PollPolicy) -> Self {
        let policy = PollPolicy {
            interval: policy.interval.max(MIN_POLL_INTERVAL),
            ..policy
        };
        Self { client, policy }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    pub fn with_policy(&self, policy: PollPolicy) -> Self {
        Self::new(self.client.clone(), policy)
    }

    /// Polls until `script_hash` shows up in the events of `txhash`.
    pub async fn get_notify(
        &self,
        txhash: &str,
        script_hash: &str,
    ) -> Result<NotifyResult, DapiError> {
        self.run(txhash, script_hash, pending()).await
    }

    /// Starts a poll on its own task.
    pub fn spawn(
        &self,
        txhash: impl Into<String>,
        script_hash: impl Into<String>,
    ) -> NotifyPollHandle {
        let txhash = txhash.into();
        let script_hash = script_hash.into();
        let cancel = Arc::new(Notify::new());

        let poller = self.clone();
        let task_txhash = txhash.clone();
        let task_cancel = cancel.clone();
        let join = tokio::spawn(async move {
            poller
                .run(&task_txhash, &script_hash, task_cancel.notified())
                .await
        });

        NotifyPollHandle {
            txhash,
            cancel,
            join,
        }
    }

    async fn run<C>(
        &self,
        txhash: &str,
        script_hash: &str,
        cancelled: C,
    ) -> Result<NotifyResult, DapiError>
    where
        C: Future<Output = ()>,
    {
        let txhash = txhash.trim();
        if txhash.is_empty() {
            return Err(DapiError::InvalidRequest(
                "txhash must not be empty".to_string(),
            ));
        }

        let started = Instant::now();
        let deadline = async {
            match self.policy.timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => pending::<()>().await,
            }
        };
        tokio::pin!(cancelled);
        tokio::pin!(deadline);

        let interval = self.policy.interval;
        let mut ticker = tokio::time::interval_at(started + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut attempts: u32 = 0;

        tracing::debug!(%txhash, %script_hash, ?interval, "notification poll started");

        loop {
            tokio::select! {
                biased;
                () = &mut cancelled => return Err(self.cancelled(txhash, attempts)),
                () = &mut deadline => return Err(timed_out(txhash, started)),
                _ = ticker.tick() => {}
            }

            attempts = attempts.saturating_add(1);
            let checked = tokio::select! {
                biased;
                () = &mut cancelled => return Err(self.cancelled(txhash, attempts)),
                () = &mut deadline => return Err(timed_out(txhash, started)),
                checked = self.check_once(txhash, script_hash) => checked,
            };

            if let Some(result) = checked? {
                tracing::info!(%txhash, %script_hash, attempts, "contract notification resolved");
                return Ok(result);
            }

            if self
                .policy
                .max_attempts
                .is_some_and(|max_attempts| attempts >= max_attempts)
            {
                return Err(DapiError::PollExhausted {
                    txhash: txhash.to_string(),
                    attempts,
                });
            }
        }
    }

    async fn check_once(
        &self,
        txhash: &str,
        script_hash: &str,
    ) -> Result<Option<NotifyResult>, DapiError> {
        let envelope = self.client.tx_events(txhash).await?;
        if !envelope.is_success() {
            tracing::debug!(%txhash, code = envelope.error, desc = %envelope.desc, "transaction events not available yet");
            return Ok(None);
        }

        let events = envelope.decode_result::<TxEvents>().map_err(|error| {
            tracing::warn!(%txhash, error = %error, "failed to parse transaction events");
            DapiError::from(error)
        })?;
        let Some(events) = events else {
            tracing::warn!(%txhash, "transaction events missing from successful response");
            return Err(DapiError::UnexpectedResponse(format!(
                "node returned no events for {txhash}"
            )));
        };

        Ok(match_notify(&events, script_hash))
    }

    fn cancelled(&self, txhash: &str, attempts: u32) -> DapiError {
        tracing::debug!(%txhash, attempts, "notification poll cancelled");
        DapiError::PollCancelled {
            txhash: txhash.to_string(),
        }
    }
}

fn timed_out(txhash: &str, started: Instant) -> DapiError {
    DapiError::PollTimeout {
        txhash: txhash.to_string(),
        elapsed_ms: started.elapsed().as_millis() as u64,
    }
}

/// Builds the result for the first notification emitted by `script_hash`.
pub fn match_notify(events: &TxEvents, script_hash: &str) -> Option<NotifyResult> {
    events.notify_for(script_hash).map(|record| NotifyResult {
        result: vec![record.states.clone()],
        transaction: events.tx_hash.clone(),
    })
}

/// Owner of a spawned poll. Dropping it aborts the poll.
#[derive(Debug)]
pub struct NotifyPollHandle {
    txhash: String,
    cancel: Arc<Notify>,
    join: JoinHandle<Result<NotifyResult, DapiError>>,
}

/// Cloneable cancel switch for a spawned poll.
#[derive(Debug, Clone)]
pub struct PollCanceller {
    cancel: Arc<Notify>,
}

impl PollCanceller {
    pub fn cancel(&self) {
        self.cancel.notify_one();
    }
}

impl NotifyPollHandle {
    pub fn txhash(&self) -> &str {
        &self.txhash
    }

    pub fn cancel(&self) {
        self.cancel.notify_one();
    }

    pub fn canceller(&self) -> PollCanceller {
        PollCanceller {
            cancel: self.cancel.clone(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    pub async fn wait(mut self) -> Result<NotifyResult, DapiError> {
        match (&mut self.join).await {
            Ok(result) => result,
            Err(error) if error.is_cancelled() => Err(DapiError::PollCancelled {
                txhash: self.txhash.clone(),
            }),
            Err(error) => Err(DapiError::Internal(format!(
                "notification poll task failed: {error}"
            ))),
        }
    }
}

impl Drop for NotifyPollHandle {
    fn drop(&mut self) {
        self.join.abort();
    }
}
