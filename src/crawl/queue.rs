//! In-memory crawl frontier with URL de-duplication.

use crate::crawl::request::Request;
use std::collections::{HashSet, VecDeque};
use tracing::trace;

/// Pending requests, in the order they will be handed out.
///
/// A URL is accepted once; later requests for it are dropped. Retries go
/// through [`RequestQueue::reclaim`], which skips that check.
#[derive(Debug, Default)]
pub struct RequestQueue {
    pending: VecDeque<Request>,
    seen: HashSet<String>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request. Returns false if its URL was already queued.
    pub fn add(&mut self, request: Request) -> bool {
        if !self.seen.insert(request.url.clone()) {
            trace!("Skipping duplicate request {}", request.url);
            return false;
        }
        self.pending.push_back(request);
        true
    }

    /// Puts a request ahead of everything pending. Returns false if its URL
    /// was already queued.
    pub fn add_forefront(&mut self, request: Request) -> bool {
        if !self.seen.insert(request.url.clone()) {
            trace!("Skipping duplicate request {}", request.url);
            return false;
        }
        self.pending.push_front(request);
        true
    }

    /// Adds every request in order. Returns how many were accepted.
    pub fn add_all(&mut self, requests: impl IntoIterator<Item = Request>) -> usize {
        requests.into_iter().filter(|r| self.add(r.clone())).count()
    }

    /// Re-queues a failed request for another attempt.
    pub fn reclaim(&mut self, request: Request) {
        self.pending.push_back(request);
    }

    pub fn pop(&mut self) -> Option<Request> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of distinct URLs ever accepted.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
