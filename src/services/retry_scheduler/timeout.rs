use once_cell::sync::OnceCell;
use std::time::Duration;
use tracing::warn;

/// Бюджет по умолчанию: намного больше таймаута одного вызова (несколько секунд),
/// но зависший процесс не вызовет бесконечной серии повторов.
pub const DEFAULT_GLOBAL_TIMEOUT: Duration = Duration::from_secs(120);

static GLOBAL_TIMEOUT: OnceCell<Duration> = OnceCell::new();

/// Задать глобальный таймаут один раз при старте процесса.
///
/// Возвращает false, если значение уже было задано; оно не меняется.
pub fn init_global_timeout(timeout: Duration) -> bool {
    match GLOBAL_TIMEOUT.set(timeout) {
        Ok(()) => true,
        Err(rejected) => {
            warn!(
                "Глобальный таймаут уже задан ({:?}), значение {:?} проигнорировано",
                global_timeout(),
                rejected
            );
            false
        }
    }
}

/// Текущий глобальный таймаут (по умолчанию `DEFAULT_GLOBAL_TIMEOUT`)
pub fn global_timeout() -> Duration {
    *GLOBAL_TIMEOUT.get_or_init(|| DEFAULT_GLOBAL_TIMEOUT)
}
