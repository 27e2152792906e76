// ============================================================================
// RelayServer - tiny_http front end for the tweet relay
// ============================================================================
// Routes:
//   POST /tweet   body is posted verbatim; 200 with empty body on success
//   *    /tweet   405
//   *    *        404
//
// A failed body read or post is fatal: the fatal hook runs, and the default hook exits
// the process with status 1.
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use gotweet_core::{Relay, RelayError};
use tiny_http::{Header, Method, Request, Response, Server};
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

const TWEET_PATH: &str = "/tweet";

/// Called with the error that made a request fatal
pub type FatalHook = Arc<dyn Fn(&RelayError) + Send + Sync>;

/// Log and terminate the process
pub fn exit_process() -> FatalHook {
    Arc::new(|err| {
        error!("Fatal relay error, exiting: {}", err);
        std::process::exit(1);
    })
}

/// Stops a running [`RelayServer::run`] loop
#[derive(Clone)]
pub struct ShutdownHandle {
    server: Arc<Server>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.server.unblock();
    }
}

pub struct RelayServer {
    server: Arc<Server>,
    relay: Relay,
    on_fatal: FatalHook,
    runtime: Handle,
}

impl RelayServer {
    /// Bind `addr`. Must be called from within a tokio runtime; requests are
    /// driven on that runtime.
    pub fn bind(addr: &str, relay: Relay) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| anyhow!("RelayServer needs a tokio runtime: {}", e))?;
        let server = Server::http(addr).map_err(|e| anyhow!("Failed to listen on {}: {}", addr, e))?;

        Ok(Self {
            server: Arc::new(server),
            relay,
            on_fatal: exit_process(),
            runtime,
        })
    }

    pub fn with_fatal_hook(mut self, hook: FatalHook) -> Self {
        self.on_fatal = hook;
        self
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            server: self.server.clone(),
        }
    }

    /// Accept requests until shut down. Blocks the calling thread; each
    /// request is handled on its own blocking task.
    pub fn run(&self) {
        for request in self.server.incoming_requests() {
            let relay = self.relay.clone();
            let on_fatal = self.on_fatal.clone();
            let runtime = self.runtime.clone();

            self.runtime.spawn_blocking(move || {
                handle_request(request, &relay, &on_fatal, &runtime);
            });
        }
        info!("Relay server stopped accepting requests");
    }
}

fn handle_request(mut request: Request, relay: &Relay, on_fatal: &FatalHook, runtime: &Handle) {
    let path = request.url().split('?').next().unwrap_or_default();
    debug!("{} {}", request.method(), request.url());

    if path != TWEET_PATH {
        let _ = request.respond(Response::empty(404));
        return;
    }

    if *request.method() != Method::Post {
        warn!("Rejecting {} {}", request.method(), TWEET_PATH);
        let mut response = Response::empty(405);
        if let Ok(allow) = Header::from_bytes(&b"Allow"[..], &b"POST"[..]) {
            response = response.with_header(allow);
        }
        let _ = request.respond(response);
        return;
    }

    let mut body = Vec::new();
    let outcome = match request.as_reader().read_to_end(&mut body) {
        Ok(_) => runtime.block_on(relay.handle(body)),
        Err(e) => Err(RelayError::Read(e)),
    };

    match outcome {
        Ok(_) => {
            let _ = request.respond(Response::empty(200));
        }
        Err(err) => {
            error!("Tweet relay failed: {}", err);
            on_fatal(&err);
            // Only reached when the hook does not terminate the process
            let _ = request.respond(Response::empty(500));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use gotweet_core::{TweetPoster, TweetResult};
    use std::sync::{mpsc, Mutex};

    struct StubPoster {
        posted: Mutex<Vec<String>>,
        fail: bool,
    }

    impl StubPoster {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                posted: Mutex::new(Vec::new()),
                fail,
            })
        }
    }

    #[async_trait]
    impl TweetPoster for StubPoster {
        async fn post(&self, text: &str) -> anyhow::Result<TweetResult> {
            if self.fail {
                return Err(anyhow!("Twitter API error 401 Unauthorized"));
            }
            self.posted.lock().unwrap().push(text.to_string());
            Ok(TweetResult::new("42", text))
        }
    }

    fn client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    struct Running {
        base: String,
        shutdown: ShutdownHandle,
        fatal_rx: mpsc::Receiver<String>,
    }

    impl Drop for Running {
        fn drop(&mut self) {
            self.shutdown.shutdown();
        }
    }

    fn start(poster: Arc<StubPoster>) -> Running {
        let (tx, fatal_rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        let hook: FatalHook = Arc::new(move |err| {
            let _ = tx.lock().unwrap().send(err.to_string());
        });

        let server = RelayServer::bind("127.0.0.1:0", Relay::new(poster))
            .unwrap()
            .with_fatal_hook(hook);
        let addr = server.local_addr().unwrap();
        let shutdown = server.shutdown_handle();
        std::thread::spawn(move || server.run());

        Running {
            base: format!("http://{}", addr),
            shutdown,
            fatal_rx,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_post_tweet_relays_body() {
        let poster = StubPoster::new(false);
        let running = start(poster.clone());

        let response = client()
            .post(format!("{}/tweet", running.base))
            .body("just setting up my twttr")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await.unwrap(), "");
        assert_eq!(
            *poster.posted.lock().unwrap(),
            vec!["just setting up my twttr".to_string()]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_posts_all_relayed() {
        let poster = StubPoster::new(false);
        let running = start(poster.clone());
        let client = client();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                tokio::spawn(
                    client
                        .post(format!("{}/tweet", running.base))
                        .body(format!("tweet {}", i))
                        .send(),
                )
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().status(), 200);
        }

        let mut posted = poster.posted.lock().unwrap().clone();
        posted.sort();
        let mut expected: Vec<String> = (0..8).map(|i| format!("tweet {}", i)).collect();
        expected.sort();
        assert_eq!(posted, expected);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_invalid_utf8_body_is_not_fatal() {
        let poster = StubPoster::new(false);
        let running = start(poster.clone());

        let response = client()
            .post(format!("{}/tweet", running.base))
            .body(vec![0xff, b'h', b'i'])
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(*poster.posted.lock().unwrap(), vec!["\u{FFFD}hi".to_string()]);
        assert!(running.fatal_rx.try_recv().is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_post_failure_is_fatal() {
        let running = start(StubPoster::new(true));

        let response = client()
            .post(format!("{}/tweet", running.base))
            .body("doomed")
            .send()
            .await
            .unwrap();

        let fatal = running
            .fatal_rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .unwrap();
        assert!(fatal.contains("failed to post tweet"));
        assert!(fatal.contains("401"));
        assert_eq!(response.status(), 500);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unknown_path_and_method() {
        let poster = StubPoster::new(false);
        let running = start(poster.clone());
        let client = client();

        let not_found = client
            .post(format!("{}/tweets", running.base))
            .body("nope")
            .send()
            .await
            .unwrap();
        assert_eq!(not_found.status(), 404);

        let wrong_method = client
            .get(format!("{}/tweet", running.base))
            .send()
            .await
            .unwrap();
        assert_eq!(wrong_method.status(), 405);
        assert_eq!(wrong_method.headers()["allow"], "POST");

        assert!(poster.posted.lock().unwrap().is_empty());
        assert!(running.fatal_rx.try_recv().is_err());
    }
}
