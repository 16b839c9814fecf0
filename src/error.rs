use thiserror::Error;

#[derive(Error, Debug)]
pub enum WinsiftError {
    #[error("Приложение не найдено: {0}")]
    ApplicationNotFound(String),

    #[error("Сервис недоступен: {0}")]
    ServiceUnavailable(String),
}

impl WinsiftError {
    pub fn application_not_found<T>(msg: impl Into<String>) -> Result<T> {
        Err(WinsiftError::ApplicationNotFound(msg.into()))
    }
}

/// Исход неудачного запроса к источнику атрибутов.
///
/// Только `Transient` повторяется планировщиком. `Unsupported` означает
/// "значения нет" и наружу как ошибка не выходит. `Malformed` фатальна и
/// не повторяется.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    #[error("источник атрибутов временно не отвечает")]
    Transient,

    #[error("атрибут не поддерживается объектом")]
    Unsupported,

    #[error("некорректный запрос атрибута: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, WinsiftError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! winsift_error {
    (service_unavailable, $($arg:tt)*) => {
        $crate::error::WinsiftError::ServiceUnavailable(format!($($arg)*))
    };
    (malformed, $($arg:tt)*) => {
        $crate::error::AttributeError::Malformed(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_macro_builds_variants() {
        let err = winsift_error!(malformed, "атрибут {} имеет тип {}", "AXSize", "Bool");
        assert_eq!(
            err,
            AttributeError::Malformed("атрибут AXSize имеет тип Bool".to_string())
        );

        let err = winsift_error!(service_unavailable, "потоков: {}", 0);
        assert!(matches!(err, WinsiftError::ServiceUnavailable(ref m) if m == "потоков: 0"));
    }

    #[test]
    fn test_application_not_found_helper() {
        let result: Result<()> = WinsiftError::application_not_found("pid 7");
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Приложение не найдено: pid 7");
    }
}
