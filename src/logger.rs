use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error,
};
use futures::future::LocalBoxFuture;
use log::{info, warn};
use std::rc::Rc;
use std::time::Instant;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

tokio::task_local! {
    static REQUEST_ID: String;
}

/// Id of the request being served, as sent back in `x-request-id`.
///
/// Outside a request (tests, startup) a fresh id is generated.
pub fn current_request_id() -> String {
    REQUEST_ID
        .try_with(|id| id.clone())
        .unwrap_or_else(|_| uuid::Uuid::new_v4().to_string())
}

/// Request logging middleware
///
/// Logs method, path, query and latency of every request, and tags the
/// response with an `x-request-id` header. The same id is visible to
/// handlers through `current_request_id` and ends up as `error_id` in error
/// bodies.
pub struct LoggerMiddleware;

impl<S, B> Transform<S, ServiceRequest> for LoggerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggerMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(LoggerMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct LoggerMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for LoggerMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();
        let request_id = uuid::Uuid::new_v4().to_string();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let query = req.query_string().to_string();
        let http_req = req.request().clone();

        info!(
            "[{}] Request started: {} {} query={:?}",
            request_id, method, path, query
        );

        let service = self.service.clone();

        Box::pin(async move {
            let outcome = REQUEST_ID
                .scope(request_id.clone(), async move { service.call(req).await })
                .await;

            // Errors raised by inner middleware are rendered here, while the
            // request id is still in scope
            let mut res = match outcome {
                Ok(res) => res.map_into_left_body(),
                Err(e) => {
                    let response =
                        REQUEST_ID.sync_scope(request_id.clone(), || e.error_response());
                    ServiceResponse::new(http_req, response).map_into_right_body()
                }
            };

            let elapsed = start_time.elapsed();
            let status = res.status();

            if let Ok(value) = HeaderValue::from_str(&request_id) {
                res.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }

            if status.is_client_error() || status.is_server_error() {
                warn!(
                    "[{}] Request failed: {} {} query={:?} - Status: {} ({}ms)",
                    request_id,
                    method,
                    path,
                    query,
                    status.as_u16(),
                    elapsed.as_millis()
                );
            } else {
                info!(
                    "[{}] Request completed: {} {} query={:?} - Status: {} ({}ms)",
                    request_id,
                    method,
                    path,
                    query,
                    status.as_u16(),
                    elapsed.as_millis()
                );
            }

            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_request_id_is_stable_inside_scope() {
        let seen = REQUEST_ID
            .scope("req-42".to_string(), async {
                (current_request_id(), current_request_id())
            })
            .await;

        assert_eq!(seen, ("req-42".to_string(), "req-42".to_string()));
    }

    #[test]
    fn test_request_id_outside_scope_is_fresh() {
        assert_ne!(current_request_id(), current_request_id());
    }
}
