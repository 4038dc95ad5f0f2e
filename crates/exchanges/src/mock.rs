//! In-memory transport for tests
//!
//! Records every request it receives and answers from a handler closure or,
//! failing that, from a FIFO queue of canned responses.

use crate::errors::{ExchangeError, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::traits::Transport;

use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

type Handler = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse>>;

#[derive(Default)]
pub struct MockTransport {
    requests: RefCell<Vec<HttpRequest>>,
    queue: RefCell<VecDeque<Result<HttpResponse>>>,
    handler: Option<Handler>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every request by calling `handler`
    pub fn with_handler(handler: impl Fn(&HttpRequest) -> Result<HttpResponse> + 'static) -> Self {
        Self {
            handler: Some(Box::new(handler)),
            ..Self::default()
        }
    }

    /// Queue a response with the given status and body
    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        self.queue
            .borrow_mut()
            .push_back(Ok(HttpResponse::new(status, body.into().into_bytes())));
    }

    /// Queue a transport-level failure
    pub fn push_error(&self, err: ExchangeError) {
        self.queue.borrow_mut().push_back(Err(err));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.borrow().last().cloned()
    }
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.borrow_mut().push(request.clone());

        if let Some(handler) = &self.handler {
            return handler(&request);
        }
        self.queue
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ExchangeError::Transport(format!("no response queued for {}", request.url))))
    }
}

/// Path component of a request URL
pub fn request_path(request: &HttpRequest) -> String {
    url::Url::parse(&request.url)
        .map(|u| u.path().to_string())
        .unwrap_or_default()
}

/// Decoded query parameters of a request URL
pub fn query_params(request: &HttpRequest) -> HashMap<String, String> {
    url::Url::parse(&request.url)
        .map(|u| u.query_pairs().into_owned().collect())
        .unwrap_or_default()
}
