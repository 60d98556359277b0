use crate::http::{make_boxed_error_response, make_boxed_response};
use http_body_util::combinators::BoxBody;
use hyper::body::Bytes;
use hyper::service::Service;
use hyper::{Method, Request, Response, StatusCode};
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

/// Serves `/health` and `/ready` on the admin listener.
pub struct AdminService<F, E> {
    is_ready: F,
    _error: PhantomData<fn() -> E>,
}

impl<F, E> AdminService<F, E>
where
    F: Fn() -> bool,
{
    pub fn new(is_ready: F) -> Self {
        Self {
            is_ready,
            _error: PhantomData,
        }
    }
}

impl<F, E, B> Service<Request<B>> for AdminService<F, E>
where
    F: Fn() -> bool,
    E: Send + 'static,
{
    type Response = Response<BoxBody<Bytes, E>>;
    type Error = E;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        let is_ready = (self.is_ready)();
        let is_get = req.method() == Method::GET;
        let path = req.uri().path().to_owned();

        Box::pin(async move {
            let ok = || make_boxed_response(StatusCode::OK, "text/plain;charset=utf-8", "ok\n");

            let res = match (path.as_str(), is_get) {
                ("/health" | "/ready", false) => {
                    make_boxed_error_response(StatusCode::METHOD_NOT_ALLOWED)
                }
                ("/health", true) => ok(),
                ("/ready", true) => match is_ready {
                    true => ok(),
                    false => make_boxed_error_response(StatusCode::SERVICE_UNAVAILABLE),
                },
                _ => make_boxed_error_response(StatusCode::NOT_FOUND),
            };
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn get(path: &str) -> Request<()> {
        Request::builder().uri(path).body(()).unwrap()
    }

    #[tokio::test]
    async fn test_health_and_readiness() {
        let ready = Arc::new(AtomicBool::new(false));
        let flag = ready.clone();
        let service = AdminService::<_, std::io::Error>::new(move || flag.load(Ordering::Relaxed));

        let health = service.call(get("/health")).await.unwrap();
        assert_eq!(health.status(), StatusCode::OK);
        let body = health.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), b"ok\n");

        let not_ready = service.call(get("/ready")).await.unwrap();
        assert_eq!(not_ready.status(), StatusCode::SERVICE_UNAVAILABLE);

        ready.store(true, Ordering::Relaxed);
        let now_ready = service.call(get("/ready")).await.unwrap();
        assert_eq!(now_ready.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_path_and_method() {
        let service = AdminService::<_, std::io::Error>::new(|| true);

        let missing = service.call(get("/metrics")).await.unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let post = Request::builder()
            .method(Method::POST)
            .uri("/health")
            .body(())
            .unwrap();
        let res = service.call(post).await.unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
