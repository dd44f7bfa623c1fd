use chrono::{DateTime, Utc};
use scout_logging::scout_debug;

use crate::{ApiError, ApplyOutcome, JobSnapshot, Progress, RemoteJobStatus, SearchKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// The single scrape job tracked by this client.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobStore {
    key: Option<SearchKey>,
    status: JobStatus,
    progress: Option<Progress>,
    total_found: u64,
    last_scraped_at: Option<DateTime<Utc>>,
    error: Option<ApiError>,
    /// Highest status-check sequence number applied for the current key.
    last_applied_seq: u64,
    /// Server answers (snapshots or failures) applied since the key was set.
    answers: u64,
}

impl JobStore {
    pub fn key(&self) -> Option<&SearchKey> {
        self.key.as_ref()
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn progress(&self) -> Option<Progress> {
        self.progress
    }

    pub fn total_found(&self) -> u64 {
        self.total_found
    }

    pub fn last_scraped_at(&self) -> Option<DateTime<Utc>> {
        self.last_scraped_at
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    /// Nonzero once the service has answered for the tracked key, even when
    /// the answer carried no progress.
    pub fn answers(&self) -> u64 {
        self.answers
    }

    /// Starts tracking `key`, replacing whatever was tracked before.
    pub fn record_job_started(&mut self, key: SearchKey) {
        *self = Self {
            key: Some(key),
            status: JobStatus::Running,
            ..Self::default()
        };
    }

    /// Applies a status snapshot tagged with the key it was requested for and
    /// its tick sequence number. `seq == 0` marks an untagged snapshot (the
    /// start-job echo) which never advances the sequence.
    pub fn record_status(
        &mut self,
        requested: &SearchKey,
        seq: u64,
        snapshot: JobSnapshot,
    ) -> ApplyOutcome {
        let Some(current) = self.key.as_ref() else {
            return ApplyOutcome::Stale;
        };
        if current != requested {
            scout_debug!("dropping status for {} while tracking {}", requested, current);
            return ApplyOutcome::Stale;
        }
        let echoes_key = !snapshot.keyword.is_empty() || !snapshot.location.is_empty();
        if echoes_key && !current.matches(&snapshot.keyword, &snapshot.location) {
            scout_debug!(
                "dropping snapshot echoing {:?}/{:?} while tracking {}",
                snapshot.keyword,
                snapshot.location,
                current
            );
            return ApplyOutcome::Stale;
        }
        if seq != 0 {
            if seq <= self.last_applied_seq {
                scout_debug!(
                    "dropping out-of-order status seq={} (last applied {})",
                    seq,
                    self.last_applied_seq
                );
                return ApplyOutcome::Stale;
            }
            self.last_applied_seq = seq;
        }

        let progress = snapshot.progress.map(Progress::normalized);
        self.status = derive_status(snapshot.status, progress);
        self.progress = progress;
        self.total_found = snapshot.total_found;
        self.last_scraped_at = snapshot.last_scraped;
        self.error = None;
        self.answers += 1;
        ApplyOutcome::Applied
    }

    /// Records a failed call for `requested`; progress is kept.
    pub fn record_failure(&mut self, requested: &SearchKey, seq: u64, err: ApiError) -> ApplyOutcome {
        if self.key.as_ref() != Some(requested) {
            return ApplyOutcome::Stale;
        }
        if seq != 0 {
            if seq <= self.last_applied_seq {
                return ApplyOutcome::Stale;
            }
            self.last_applied_seq = seq;
        }
        self.status = JobStatus::Failed;
        self.error = Some(err);
        self.answers += 1;
        ApplyOutcome::Applied
    }

    /// Starts a fresh tick sequence for the same key (a new observation).
    pub fn reset_sequence(&mut self) {
        self.last_applied_seq = 0;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn derive_status(remote: Option<RemoteJobStatus>, progress: Option<Progress>) -> JobStatus {
    match remote {
        Some(RemoteJobStatus::Completed) => JobStatus::Completed,
        Some(RemoteJobStatus::Failed) => JobStatus::Failed,
        Some(RemoteJobStatus::Pending | RemoteJobStatus::Running) => JobStatus::Running,
        Some(RemoteJobStatus::Unknown) | None => {
            if progress.is_some_and(|p| p.is_complete()) {
                JobStatus::Completed
            } else {
                JobStatus::Running
            }
        }
    }
}
