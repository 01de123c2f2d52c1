use crate::errors::FeedError;
use crate::handler::FeedHandler;
use http_body_util::combinators::BoxBody;
use hyper::body::{Bytes, Incoming};
use hyper::service::Service;
use hyper::{Request, Response};
use shared::http::into_boxed_response;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Adapts the feed handler to hyper connections.
pub struct FeedService {
    handler: Arc<FeedHandler>,
}

impl FeedService {
    pub fn new(handler: FeedHandler) -> Self {
        FeedService {
            handler: Arc::new(handler),
        }
    }
}

impl Service<Request<Incoming>> for FeedService {
    type Response = Response<BoxBody<Bytes, FeedError>>;
    type Error = FeedError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let handler = self.handler.clone();
        // The feed is read-only, request bodies are ignored
        let request = req.map(|_| ());

        Box::pin(async move {
            let response = handler.handle(&request).await;
            Ok(into_boxed_response(response))
        })
    }
}
