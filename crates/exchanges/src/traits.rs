//! Transport seam between the signed request pipeline and the wire

use crate::errors::Result;
use crate::http::{HttpRequest, HttpResponse};
use async_trait::async_trait;
use std::rc::Rc;

/// Executes one fully-built HTTP request.
///
/// Implementations return `Ok` for every response that arrived, whatever its
/// status; status classification belongs to the caller. Network, TLS and
/// deadline failures come back as `ExchangeError::Transport` / `Timeout`.
/// No implementation retries on its own.
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[async_trait(?Send)]
impl<T: Transport + ?Sized> Transport for Rc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        (**self).send(request).await
    }
}

#[async_trait(?Send)]
impl<'a, T: Transport + ?Sized> Transport for &'a T {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        (**self).send(request).await
    }
}
