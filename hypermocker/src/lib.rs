//! HTTP server for tests. Requests have to be anticipated by the test, otherwise they are
//! answered with `418 I'm a teapot` and the server panics when dropped.
#![allow(clippy::unwrap_used)]

use http_body_util::Full;
use hyper::{Request, Response, server::conn::http1, service::Service};
use hyper_util::rt::TokioIo;
use std::{
    collections::HashMap,
    future::Future,
    net::SocketAddr,
    pin::Pin,
    sync::{Arc, Mutex},
};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

pub use hyper::{self, StatusCode, body::Bytes};

struct Reply {
    status: StatusCode,
    body: Bytes,
}

#[derive(Default)]
struct State {
    /// Made by [`Mock::anticipate`], keyed by path.
    anticipated: HashMap<String, oneshot::Receiver<Reply>>,

    /// Every request that came in, with its query.
    received: Vec<String>,

    unexpected: Vec<String>,
}

pub struct Mock {
    port: u16,
    state: Arc<Mutex<State>>,
    accept_loop: JoinHandle<()>,
}

impl Mock {
    /// Bind to a random port on the loopback interface.
    pub async fn bind() -> Mock {
        let state = Arc::new(Mutex::new(State::default()));

        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let listener = TcpListener::bind(addr).await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let accept_loop = tokio::spawn(accept(listener, Arc::clone(&state)));

        Mock {
            port,
            state,
            accept_loop,
        }
    }

    /// Full URL of `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }

    /// Get ready for a request to `path`. The request waits until the test responds, so it
    /// does not matter which comes first.
    pub fn anticipate(&self, path: impl Into<String>) -> AnticipatedRequest {
        let path = path.into();
        log::info!("Anticipating '{path}'.");
        let (tx, rx) = oneshot::channel();
        self.state.lock().unwrap().anticipated.insert(path, rx);
        AnticipatedRequest { tx }
    }

    /// URIs of all requests received so far, including their query.
    pub fn received(&self) -> Vec<String> {
        self.state.lock().unwrap().received.clone()
    }
}

impl Drop for Mock {
    fn drop(&mut self) {
        self.accept_loop.abort();

        let unexpected = std::mem::take(&mut self.state.lock().unwrap().unexpected);
        if !unexpected.is_empty() && !std::thread::panicking() {
            panic!("there were unexpected requests: {unexpected:?}");
        }
    }
}

async fn accept(listener: TcpListener, state: Arc<Mutex<State>>) {
    loop {
        let stream = match listener.accept().await {
            Ok((stream, _)) => stream,
            Err(err) => {
                log::error!("Could not accept a connection: {err}");
                return;
            }
        };

        let service = MockService {
            state: Arc::clone(&state),
        };
        tokio::spawn(async move {
            if let Err(err) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                log::warn!("Connection failed: {err}");
            }
        });
    }
}

#[must_use = "request will hang unless responded to"]
pub struct AnticipatedRequest {
    tx: oneshot::Sender<Reply>,
}

impl AnticipatedRequest {
    /// Respond with `200 OK` and given body.
    pub fn respond(self, body: impl Into<Bytes>) {
        self.reply(StatusCode::OK, body.into());
    }

    /// Respond with an empty body and given status.
    pub fn respond_with_status(self, status: StatusCode) {
        self.reply(status, Bytes::new());
    }

    fn reply(self, status: StatusCode, body: Bytes) {
        log::info!("Responding with {status}.");
        // Client might have given up already.
        let _ = self.tx.send(Reply { status, body });
    }
}

struct MockService {
    state: Arc<Mutex<State>>,
}

impl Service<Request<hyper::body::Incoming>> for MockService {
    type Response = Response<Full<Bytes>>;
    type Error = hyper::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, request: Request<hyper::body::Incoming>) -> Self::Future {
        let uri = request.uri().to_string();
        log::info!("Incoming request '{uri}'.");

        let anticipated = {
            let mut state = self.state.lock().unwrap();
            state.received.push(uri.clone());
            state.anticipated.remove(request.uri().path())
        };

        let state = Arc::clone(&self.state);
        Box::pin(async move {
            let reply = match anticipated {
                Some(rx) => rx.await.ok(),
                None => None,
            };

            let response = match reply {
                Some(Reply { status, body }) => {
                    let mut response = Response::new(Full::new(body));
                    *response.status_mut() = status;
                    response
                }
                None => {
                    log::warn!("Unexpected '{uri}'.");
                    state.lock().unwrap().unexpected.push(uri);
                    let mut response =
                        Response::new(Full::new(Bytes::from_static(b"unexpected")));
                    *response.status_mut() = StatusCode::IM_A_TEAPOT;
                    response
                }
            };

            Ok(response)
        })
    }
}
