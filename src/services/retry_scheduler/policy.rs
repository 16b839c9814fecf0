use crate::error::AttributeError;
use std::time::Duration;

/// Фиксированная пауза между попытками.
///
/// Собственный таймаут внешней системы на один вызов на порядок больше,
/// поэтому частые повторы ловят момент, когда она снова отвечает.
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(10);

/// Почему операция была отброшена
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Бюджет времени исчерпан на временных ошибках
    TimedOut,
    /// Атрибут не имеет смысла для объекта
    Unsupported,
    /// Некорректный запрос, повтор бессмысленен
    Failed,
}

/// Решение после неудачной попытки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    Drop(DropReason),
}

/// Итог жизни одной операции
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    Succeeded,
    Dropped(DropReason),
}

/// Политика повторов: фиксированная пауза и общий бюджет времени
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub backoff: Duration,
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn new(backoff: Duration, timeout: Duration) -> Self {
        Self { backoff, timeout }
    }

    /// Решить, что делать после ошибки `error`, если с первой попытки прошло `elapsed`
    pub fn decide(&self, elapsed: Duration, error: &AttributeError) -> RetryDecision {
        match error {
            AttributeError::Transient if elapsed < self.timeout => {
                RetryDecision::RetryAfter(self.backoff)
            }
            AttributeError::Transient => RetryDecision::Drop(DropReason::TimedOut),
            AttributeError::Unsupported => RetryDecision::Drop(DropReason::Unsupported),
            AttributeError::Malformed(_) => RetryDecision::Drop(DropReason::Failed),
        }
    }
}
