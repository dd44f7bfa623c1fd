use std::collections::BTreeSet;

use scout_logging::scout_debug;

use crate::{ApiError, ApplyOutcome, Business, BusinessPage, Pagination, SearchKey};

/// Which of the two collections is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveSet {
    Paginated,
    Scoped,
}

/// Scoped results are shown iff both search parameters are non-empty.
pub fn select_active(keyword: &str, location: &str) -> ActiveSet {
    if !keyword.trim().is_empty() && !location.trim().is_empty() {
        ActiveSet::Scoped
    } else {
        ActiveSet::Paginated
    }
}

/// Monotonic request tickets for one collection. A response is applied only
/// when it is newer than the last applied one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Tickets {
    issued: u64,
    applied: u64,
    in_flight: u32,
}

impl Tickets {
    fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.in_flight += 1;
        self.issued
    }

    /// Marks `ticket` resolved; returns whether its payload may be applied.
    fn resolve(&mut self, ticket: u64) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        if ticket <= self.applied {
            return false;
        }
        self.applied = ticket;
        true
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultStore {
    paginated: Vec<Business>,
    pagination: Pagination,
    paginated_error: Option<ApiError>,
    paginated_tickets: Tickets,

    scoped: Vec<Business>,
    scoped_key: Option<SearchKey>,
    scoped_error: Option<ApiError>,
    scoped_tickets: Tickets,

    pending_deletes: BTreeSet<String>,
    delete_error: Option<(String, ApiError)>,
}

impl ResultStore {
    pub fn paginated(&self) -> &[Business] {
        &self.paginated
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn scoped(&self) -> &[Business] {
        &self.scoped
    }

    pub fn scoped_key(&self) -> Option<&SearchKey> {
        self.scoped_key.as_ref()
    }

    pub fn paginated_error(&self) -> Option<&ApiError> {
        self.paginated_error.as_ref()
    }

    pub fn scoped_error(&self) -> Option<&ApiError> {
        self.scoped_error.as_ref()
    }

    pub fn delete_error(&self) -> Option<&(String, ApiError)> {
        self.delete_error.as_ref()
    }

    pub fn is_loading(&self, set: ActiveSet) -> bool {
        match set {
            ActiveSet::Paginated => self.paginated_tickets.in_flight > 0,
            ActiveSet::Scoped => self.scoped_tickets.in_flight > 0,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.paginated.iter().chain(&self.scoped).any(|b| b.id == id)
    }

    pub fn is_delete_pending(&self, id: &str) -> bool {
        self.pending_deletes.contains(id)
    }

    pub fn begin_paginated_load(&mut self) -> u64 {
        self.paginated_error = None;
        self.paginated_tickets.issue()
    }

    pub fn begin_scoped_load(&mut self) -> u64 {
        self.scoped_error = None;
        self.scoped_tickets.issue()
    }

    /// Replaces the paginated set and its metadata wholesale.
    pub fn load_paginated(&mut self, ticket: u64, result: Result<BusinessPage, ApiError>) -> ApplyOutcome {
        if !self.paginated_tickets.resolve(ticket) {
            scout_debug!("dropping paginated response ticket={}", ticket);
            return ApplyOutcome::Stale;
        }
        match result {
            Ok(page) => {
                self.paginated = page.items;
                self.pagination = page.pagination;
                self.paginated_error = None;
            }
            Err(err) => self.paginated_error = Some(err),
        }
        ApplyOutcome::Applied
    }

    /// Replaces the scoped set. `current` is the search the view currently
    /// shows; responses for any other key are dropped.
    pub fn load_scoped(
        &mut self,
        ticket: u64,
        key: &SearchKey,
        current: Option<&SearchKey>,
        result: Result<Vec<Business>, ApiError>,
    ) -> ApplyOutcome {
        let fresh = self.scoped_tickets.resolve(ticket);
        if !fresh || current != Some(key) {
            scout_debug!("dropping scoped response for {} ticket={}", key, ticket);
            return ApplyOutcome::Stale;
        }
        match result {
            Ok(items) => {
                self.scoped = items;
                self.scoped_key = Some(key.clone());
                self.scoped_error = None;
            }
            Err(err) => self.scoped_error = Some(err),
        }
        ApplyOutcome::Applied
    }

    pub fn begin_delete(&mut self, id: &str) -> bool {
        self.delete_error = None;
        self.pending_deletes.insert(id.to_string())
    }

    /// Settles a delete call: on success the record leaves both sets, on
    /// failure it stays and the error is recorded.
    pub fn finish_delete(&mut self, id: &str, result: Result<(), ApiError>) {
        self.pending_deletes.remove(id);
        match result {
            Ok(()) => self.remove_record(id),
            Err(err) => self.delete_error = Some((id.to_string(), err)),
        }
    }

    /// Removes `id` from both sets. Idempotent.
    pub fn remove_record(&mut self, id: &str) {
        self.paginated.retain(|b| b.id != id);
        self.scoped.retain(|b| b.id != id);
    }

    pub fn clear_errors(&mut self) {
        self.paginated_error = None;
        self.scoped_error = None;
        self.delete_error = None;
    }
}
