use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Общий счётчик незавершённых операций пакета.
///
/// Каждая операция пакета держит `BatchTicket`; билет освобождает счётчик
/// ровно один раз при уничтожении, на любом терминальном пути.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    inner: Arc<BatchInner>,
}

#[derive(Debug, Default)]
struct BatchInner {
    pending: Mutex<usize>,
    all_done: Condvar,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Войти в пакет: счётчик увеличивается до постановки операции в очередь
    pub fn enter(&self) -> BatchTicket {
        *self.inner.pending.lock() += 1;
        BatchTicket {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn pending(&self) -> usize {
        *self.inner.pending.lock()
    }

    /// Заблокироваться, пока все операции пакета не завершатся
    pub fn wait(&self) {
        let mut pending = self.inner.pending.lock();
        while *pending > 0 {
            self.inner.all_done.wait(&mut pending);
        }
    }

    /// То же, что `wait`, но не дольше `timeout`. Возвращает true, если пакет завершён.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut pending = self.inner.pending.lock();
        while *pending > 0 {
            if self
                .inner
                .all_done
                .wait_until(&mut pending, deadline)
                .timed_out()
            {
                return *pending == 0;
            }
        }
        true
    }
}

/// Право одной операции на место в пакете
#[derive(Debug)]
#[must_use = "билет освобождает пакет при уничтожении"]
pub struct BatchTicket {
    inner: Arc<BatchInner>,
}

impl Drop for BatchTicket {
    fn drop(&mut self) {
        let mut pending = self.inner.pending.lock();
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            self.inner.all_done.notify_all();
        }
    }
}
