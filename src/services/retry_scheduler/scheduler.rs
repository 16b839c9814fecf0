use super::batch::{Batch, BatchTicket};
use super::policy::{DropReason, RetryDecision, RetryOutcome, RetryPolicy};
use super::timeout::global_timeout;
use crate::config::RetryConfig;
use crate::error::{AttributeError, Result};
use crate::{debug_if_enabled, trace_if_enabled, winsift_error};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Handle, Runtime};
use tokio::sync::Semaphore;
use tokio::task::spawn_blocking;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::{error, info};

/// Единица работы против источника атрибутов
pub type RetryableOperation =
    Box<dyn FnMut() -> std::result::Result<(), AttributeError> + Send + 'static>;

/// Сигнал об успешном завершении операции
pub type OnComplete = Box<dyn FnOnce() + Send + 'static>;

/// Необязательные параметры постановки операции
#[derive(Default)]
pub struct ScheduleOptions {
    timeout: Option<Duration>,
    on_complete: Option<OnComplete>,
    batch: Option<Batch>,
}

impl ScheduleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Переопределить глобальный таймаут для этой операции
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn on_complete(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn in_batch(mut self, batch: &Batch) -> Self {
        self.batch = Some(batch.clone());
        self
    }
}

/// Завершение операции: колбэк только при успехе, билет пакета на любом пути
struct Completion {
    on_complete: Option<OnComplete>,
    _ticket: Option<BatchTicket>,
}

impl Completion {
    fn succeed(mut self) {
        if let Some(callback) = self.on_complete.take() {
            callback();
        }
    }
}

/// Планировщик повторяемых запросов к источнику атрибутов.
///
/// Владеет выделенным runtime: попытки никогда не выполняются в потоке
/// вызывающего. Сам вызов источника блокирующий и идёт в пуле блокирующих
/// потоков; таймеры пауз и бюджета живут в асинхронной задаче и срабатывают,
/// даже когда все слоты заняты зависшими вызовами.
pub struct RetryScheduler {
    runtime: Option<Runtime>,
    handle: Handle,
    backoff: Duration,
    slots: Arc<Semaphore>,
}

impl RetryScheduler {
    pub fn new(config: &RetryConfig) -> Result<Self> {
        info!(
            "Инициализация RetryScheduler (одновременных вызовов: {}, пауза: {:?})",
            config.worker_threads,
            config.backoff()
        );

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.worker_threads)
            .thread_name("winsift-retry")
            .enable_time()
            .build()
            .map_err(|e| {
                winsift_error!(service_unavailable, "Не удалось запустить контекст повторов: {}", e)
            })?;

        Ok(Self {
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
            backoff: config.backoff(),
            slots: Arc::new(Semaphore::new(config.worker_threads)),
        })
    }

    /// Поставить операцию в очередь. Не блокирует вызывающего.
    pub fn schedule<F>(&self, operation: F, options: ScheduleOptions)
    where
        F: FnMut() -> std::result::Result<(), AttributeError> + Send + 'static,
    {
        let policy = self.policy_for(options.timeout);
        // Вход в пакет до постановки в очередь: ожидающий не увидит ложный ноль
        let completion = Completion {
            on_complete: options.on_complete,
            _ticket: options.batch.as_ref().map(Batch::enter),
        };

        self.handle.spawn(run_with_retry(
            Box::new(operation),
            policy,
            Arc::clone(&self.slots),
            completion,
        ));
    }

    /// Удобная форма: операция как часть пакета
    pub fn schedule_in_batch<F>(&self, batch: &Batch, operation: F, timeout: Option<Duration>)
    where
        F: FnMut() -> std::result::Result<(), AttributeError> + Send + 'static,
    {
        let mut options = ScheduleOptions::new().in_batch(batch);
        if let Some(timeout) = timeout {
            options = options.with_timeout(timeout);
        }
        self.schedule(operation, options);
    }

    fn policy_for(&self, timeout: Option<Duration>) -> RetryPolicy {
        RetryPolicy::new(self.backoff, timeout.unwrap_or_else(global_timeout))
    }
}

impl Drop for RetryScheduler {
    fn drop(&mut self) {
        info!("RetryScheduler завершает работу");
        // Незавершённые задачи уничтожаются вместе с runtime и освобождают свои пакеты
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

async fn run_with_retry(
    mut operation: RetryableOperation,
    policy: RetryPolicy,
    slots: Arc<Semaphore>,
    completion: Completion,
) -> RetryOutcome {
    let started = Instant::now();
    let deadline = started.checked_add(policy.timeout);
    let mut attempt = 1u32;

    loop {
        // Слот ждём не дольше бюджета: занятый источник не откладывает отказ
        let slot = Arc::clone(&slots).acquire_owned();
        let permit = match deadline {
            Some(deadline) => match timeout_at(deadline, slot).await {
                Ok(permit) => permit,
                Err(_) => {
                    debug_if_enabled!(
                        "Операция отброшена по таймауту {:?}: нет свободного слота для попытки #{}",
                        policy.timeout,
                        attempt
                    );
                    return RetryOutcome::Dropped(DropReason::TimedOut);
                }
            },
            None => slot.await,
        };
        let Ok(permit) = permit else {
            error!("Слоты вызовов закрыты, операция отброшена");
            return RetryOutcome::Dropped(DropReason::Failed);
        };

        // Операция уходит в блокирующий поток и возвращается вместе с результатом
        let finished = spawn_blocking(move || {
            let _permit = permit;
            let result = operation();
            (operation, result)
        })
        .await;

        let error = match finished {
            Ok((_, Ok(()))) => {
                trace_if_enabled!("Операция выполнена с попытки #{}", attempt);
                completion.succeed();
                return RetryOutcome::Succeeded;
            }
            Ok((returned, Err(error))) => {
                operation = returned;
                error
            }
            Err(e) => {
                error!("Операция аварийно завершилась на попытке #{}: {}", attempt, e);
                return RetryOutcome::Dropped(DropReason::Failed);
            }
        };

        match policy.decide(started.elapsed(), &error) {
            RetryDecision::RetryAfter(delay) => {
                trace_if_enabled!("Попытка #{} не удалась ({}), повтор через {:?}", attempt, error, delay);
                sleep(delay).await;
                attempt += 1;
            }
            RetryDecision::Drop(reason) => {
                match reason {
                    DropReason::Failed => {
                        error!("Операция отброшена после попытки #{}: {}", attempt, error);
                    }
                    DropReason::TimedOut => {
                        debug_if_enabled!(
                            "Операция отброшена по таймауту {:?} после {} попыток",
                            policy.timeout,
                            attempt
                        );
                    }
                    DropReason::Unsupported => {
                        trace_if_enabled!("Атрибут не поддерживается, операция отброшена");
                    }
                }
                return RetryOutcome::Dropped(reason);
            }
        }
    }
}
