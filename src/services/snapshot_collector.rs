use crate::attributes::{
    AppClass, ApplicationRegistry, AttributeSource, ElementHandle, Size, WindowLevel,
};
use crate::classifier::{OwnerApp, WindowAttributes};
use crate::debug_if_enabled;
use crate::error::AttributeError;
use crate::services::retry_scheduler::{Batch, RetryScheduler};
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

type Slot<T> = Arc<Mutex<Option<T>>>;

fn take<T>(slot: &Slot<T>) -> Option<T> {
    slot.lock().take()
}

/// Запрошенные, но ещё не собранные атрибуты одного объекта
struct PendingSnapshot {
    handle: ElementHandle,
    window_id: Slot<u32>,
    size: Slot<Size>,
    level: Slot<WindowLevel>,
    title: Slot<String>,
    subrole: Slot<String>,
    role: Slot<String>,
    pid: Slot<u32>,
}

impl PendingSnapshot {
    fn resolve(self, registry: &dyn ApplicationRegistry) -> WindowAttributes {
        let owner = match take(&self.pid) {
            Some(pid) => resolve_owner(registry, pid),
            None => OwnerApp::unknown(),
        };

        let attrs = WindowAttributes {
            window_id: take(&self.window_id),
            size: take(&self.size),
            level: take(&self.level),
            title: take(&self.title),
            subrole: take(&self.subrole),
            role: take(&self.role),
            owner,
        };
        debug_if_enabled!("Снимок {}: {}", self.handle, attrs);
        attrs
    }
}

fn resolve_owner(registry: &dyn ApplicationRegistry, pid: u32) -> OwnerApp {
    let state = registry.running_state(pid);
    match registry.application(pid) {
        Some(info) => {
            let classes: SmallVec<[AppClass; 2]> = AppClass::ALL
                .into_iter()
                .filter(|class| registry.is_running_application_classified(pid, *class))
                .collect();
            OwnerApp::from_application(info, classes, state)
        }
        None => {
            debug!("Владелец pid {} не найден в реестре приложений", pid);
            OwnerApp::unknown().with_pid(pid).with_state(state)
        }
    }
}

/// Собирает снимки атрибутов окон через планировщик повторов.
///
/// Каждый атрибут запрашивается отдельной операцией; атрибут, который не
/// удалось получить (таймаут или не поддерживается), остаётся неизвестным.
pub struct SnapshotCollector {
    source: Arc<dyn AttributeSource>,
    registry: Arc<dyn ApplicationRegistry>,
    scheduler: Arc<RetryScheduler>,
    timeout: Option<Duration>,
}

impl SnapshotCollector {
    pub fn new(
        source: Arc<dyn AttributeSource>,
        registry: Arc<dyn ApplicationRegistry>,
        scheduler: Arc<RetryScheduler>,
    ) -> Self {
        Self {
            source,
            registry,
            scheduler,
            timeout: None,
        }
    }

    /// Переопределить глобальный таймаут для запросов этого сборщика
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Собрать снимок одного объекта. Блокирует до завершения всех запросов.
    pub fn collect(&self, handle: ElementHandle) -> WindowAttributes {
        let batch = Batch::new();
        let pending = self.request(&batch, handle);
        batch.wait();
        pending.resolve(self.registry.as_ref())
    }

    /// Собрать снимки нескольких объектов; запросы идут вперемешку
    pub fn collect_all(&self, handles: &[ElementHandle]) -> Vec<(ElementHandle, WindowAttributes)> {
        let batch = Batch::new();
        let pending: Vec<PendingSnapshot> = handles
            .iter()
            .map(|handle| self.request(&batch, *handle))
            .collect();

        debug!(
            "Ожидание {} запросов атрибутов для {} объектов",
            batch.pending(),
            handles.len()
        );
        batch.wait();

        pending
            .into_iter()
            .map(|snapshot| (snapshot.handle, snapshot.resolve(self.registry.as_ref())))
            .collect()
    }

    fn request(&self, batch: &Batch, handle: ElementHandle) -> PendingSnapshot {
        PendingSnapshot {
            handle,
            window_id: self.query(batch, handle, |source, h| source.window_id(h)),
            size: self.query(batch, handle, |source, h| source.size(h)),
            level: self.query(batch, handle, |source, h| source.window_level(h)),
            title: self.query(batch, handle, |source, h| source.title(h)),
            subrole: self.query(batch, handle, |source, h| source.subrole(h)),
            role: self.query(batch, handle, |source, h| source.role(h)),
            pid: self.query(batch, handle, |source, h| source.process_id(h)),
        }
    }

    fn query<T, F>(&self, batch: &Batch, handle: ElementHandle, query: F) -> Slot<T>
    where
        T: Send + 'static,
        F: Fn(&dyn AttributeSource, ElementHandle) -> Result<T, AttributeError> + Send + 'static,
    {
        let slot: Slot<T> = Arc::new(Mutex::new(None));
        let out = Arc::clone(&slot);
        let source = Arc::clone(&self.source);

        self.scheduler.schedule_in_batch(
            batch,
            move || {
                let value = query(source.as_ref(), handle)?;
                *out.lock() = Some(value);
                Ok(())
            },
            self.timeout,
        );

        slot
    }
}
