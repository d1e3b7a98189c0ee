//! Managed thread for an IO runtime. Concrete implementation depends on the target.
#[cfg(not(target_arch = "wasm32"))]
pub(crate) use native::*;

#[cfg(target_arch = "wasm32")]
pub(crate) use web::*;

/// Bound for futures handed to the IO runtime. They have to be `Send` on native targets, where
/// the runtime lives on its own thread, but not in the browser.
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSend: Send {}

#[cfg(not(target_arch = "wasm32"))]
impl<T: Send> MaybeSend for T {}

/// Bound for futures handed to the IO runtime. They have to be `Send` on native targets, where
/// the runtime lives on its own thread, but not in the browser.
#[cfg(target_arch = "wasm32")]
pub trait MaybeSend {}

#[cfg(target_arch = "wasm32")]
impl<T> MaybeSend for T {}

#[cfg(target_arch = "wasm32")]
mod web {
    pub struct Runtime;

    impl Runtime {
        pub fn new() -> Self {
            Self {}
        }

        pub fn spawn<F>(&self, f: F)
        where
            F: std::future::Future<Output = ()> + 'static,
        {
            wasm_bindgen_futures::spawn_local(f);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    pub struct Runtime {
        handle: tokio::runtime::Handle,
        join_handle: Option<std::thread::JoinHandle<()>>,
        quit_tx: tokio::sync::mpsc::UnboundedSender<()>,
    }

    impl Runtime {
        pub fn new() -> Self {
            let (quit_tx, mut quit_rx) = tokio::sync::mpsc::unbounded_channel();

            #[allow(clippy::expect_used)]
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("could not create the Tokio runtime, overlays and search will not work");

            let handle = runtime.handle().to_owned();

            // Tasks spawned through the handle are driven by this thread only.
            let join_handle = std::thread::spawn(move || {
                runtime.block_on(quit_rx.recv());
            });

            Self {
                handle,
                join_handle: Some(join_handle),
                quit_tx,
            }
        }

        pub fn spawn<F>(&self, f: F)
        where
            F: std::future::Future<Output = ()> + Send + 'static,
        {
            self.handle.spawn(f);
        }
    }

    impl Drop for Runtime {
        fn drop(&mut self) {
            // Receiver is gone if the IO thread already exited.
            let _ = self.quit_tx.send(());

            if let Some(join_handle) = self.join_handle.take() {
                log::debug!("Waiting for the IO thread to exit.");
                if join_handle.join().is_err() {
                    log::warn!("IO thread panicked.");
                }
            }

            log::debug!("IO thread is down.");
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn spawned_futures_run_on_the_io_thread() {
        let runtime = Runtime::new();
        let (tx, rx) = std::sync::mpsc::channel();

        let caller = std::thread::current().id();
        runtime.spawn(async move {
            tx.send(std::thread::current().id()).unwrap();
        });

        let worker = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_ne!(caller, worker);
    }

    #[test]
    fn dropping_runtime_joins_the_thread() {
        let runtime = Runtime::new();
        runtime.spawn(async {});
        drop(runtime);
    }
}
