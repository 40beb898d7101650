use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

/// Cloneable stop flag shared between the signal handler and the loop.
#[derive(Clone, Default)]
pub struct Shutdown {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    pub fn is_requested(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep up to `timeout`. Returns `true` as soon as shutdown is requested.
    pub fn wait(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = cvar
            .wait_timeout_while(guard, timeout, |requested| !*requested)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn wait_times_out_without_request() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.wait(Duration::from_millis(20)));
        assert!(!shutdown.is_requested());
    }

    #[test]
    fn request_before_wait_returns_immediately() {
        let shutdown = Shutdown::new();
        shutdown.request();
        let start = Instant::now();
        assert!(shutdown.wait(Duration::from_secs(30)));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn request_from_other_thread_wakes_wait() {
        let shutdown = Shutdown::new();
        let handle = shutdown.clone();
        let start = Instant::now();
        let waker = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            handle.request();
        });
        assert!(shutdown.wait(Duration::from_secs(30)));
        assert!(start.elapsed() < Duration::from_secs(10));
        waker.join().unwrap();
    }
}
