use crate::error::AttributeError;
use crate::winsift_error;
use serde::Deserialize;
use smallvec::SmallVec;
use std::fmt;

/// Непрозрачная ссылка на удалённый объект, атрибуты которого запрашиваются
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub u64);

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Имена атрибутов, которые умеет отдавать источник
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeName {
    Position,
    Size,
    Role,
    Subrole,
    Title,
    Parent,
    Children,
    Minimized,
    Fullscreen,
    ProcessId,
    WindowId,
    WindowLevel,
}

impl AttributeName {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeName::Position => "AXPosition",
            AttributeName::Size => "AXSize",
            AttributeName::Role => "AXRole",
            AttributeName::Subrole => "AXSubrole",
            AttributeName::Title => "AXTitle",
            AttributeName::Parent => "AXParent",
            AttributeName::Children => "AXChildren",
            AttributeName::Minimized => "AXMinimized",
            AttributeName::Fullscreen => "AXFullScreen",
            AttributeName::ProcessId => "AXPid",
            AttributeName::WindowId => "AXWindowNumber",
            AttributeName::WindowLevel => "AXWindowLevel",
        }
    }
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Позиция окна на экране
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Размер окна
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Слой отрисовки окна (порядок наложения)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowLevel(pub i32);

impl WindowLevel {
    /// Обычный слой окон приложений
    pub const NORMAL: WindowLevel = WindowLevel(0);
    /// Слой плавающих окон ("поверх всех")
    pub const FLOATING: WindowLevel = WindowLevel(3);
}

impl fmt::Display for WindowLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Значение атрибута в том виде, в котором его вернул источник
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Bool(bool),
    Integer(i64),
    Text(String),
    Point(Point),
    Size(Size),
    Element(ElementHandle),
    Elements(SmallVec<[ElementHandle; 8]>),
}

impl AttributeValue {
    fn kind(&self) -> &'static str {
        match self {
            AttributeValue::Bool(_) => "Bool",
            AttributeValue::Integer(_) => "Integer",
            AttributeValue::Text(_) => "Text",
            AttributeValue::Point(_) => "Point",
            AttributeValue::Size(_) => "Size",
            AttributeValue::Element(_) => "Element",
            AttributeValue::Elements(_) => "Elements",
        }
    }

    fn mismatch(&self, expected: &str) -> AttributeError {
        winsift_error!(malformed, "ожидался {}, получен {}", expected, self.kind())
    }

    pub fn into_bool(self) -> Result<bool, AttributeError> {
        match self {
            AttributeValue::Bool(v) => Ok(v),
            other => Err(other.mismatch("Bool")),
        }
    }

    pub fn into_integer(self) -> Result<i64, AttributeError> {
        match self {
            AttributeValue::Integer(v) => Ok(v),
            other => Err(other.mismatch("Integer")),
        }
    }

    pub fn into_text(self) -> Result<String, AttributeError> {
        match self {
            AttributeValue::Text(v) => Ok(v),
            other => Err(other.mismatch("Text")),
        }
    }

    pub fn into_point(self) -> Result<Point, AttributeError> {
        match self {
            AttributeValue::Point(v) => Ok(v),
            other => Err(other.mismatch("Point")),
        }
    }

    pub fn into_size(self) -> Result<Size, AttributeError> {
        match self {
            AttributeValue::Size(v) => Ok(v),
            other => Err(other.mismatch("Size")),
        }
    }

    pub fn into_element(self) -> Result<ElementHandle, AttributeError> {
        match self {
            AttributeValue::Element(v) => Ok(v),
            other => Err(other.mismatch("Element")),
        }
    }

    pub fn into_elements(self) -> Result<SmallVec<[ElementHandle; 8]>, AttributeError> {
        match self {
            AttributeValue::Elements(v) => Ok(v),
            other => Err(other.mismatch("Elements")),
        }
    }
}

/// Результат одного обращения к источнику атрибутов
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeStatus<T> {
    Ok(T),
    TransientFailure,
    Unsupported,
}

impl<T> AttributeStatus<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> AttributeStatus<U> {
        match self {
            AttributeStatus::Ok(v) => AttributeStatus::Ok(f(v)),
            AttributeStatus::TransientFailure => AttributeStatus::TransientFailure,
            AttributeStatus::Unsupported => AttributeStatus::Unsupported,
        }
    }

    pub fn into_result(self) -> Result<T, AttributeError> {
        match self {
            AttributeStatus::Ok(v) => Ok(v),
            AttributeStatus::TransientFailure => Err(AttributeError::Transient),
            AttributeStatus::Unsupported => Err(AttributeError::Unsupported),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_into_result_keeps_failure_kind() {
        assert_eq!(AttributeStatus::Ok(5).into_result(), Ok(5));
        assert_eq!(
            AttributeStatus::<i32>::TransientFailure.into_result(),
            Err(AttributeError::Transient)
        );
        assert_eq!(
            AttributeStatus::<i32>::Unsupported.into_result(),
            Err(AttributeError::Unsupported)
        );
    }

    #[test]
    fn test_status_map_preserves_failures() {
        let status: AttributeStatus<i32> = AttributeStatus::TransientFailure;
        assert_eq!(status.map(|v| v * 2), AttributeStatus::TransientFailure);
        assert_eq!(AttributeStatus::Ok(21).map(|v| v * 2), AttributeStatus::Ok(42));
    }

    #[test]
    fn test_value_type_mismatch_is_malformed() {
        let err = AttributeValue::Bool(true).into_size().unwrap_err();
        assert_eq!(
            err,
            AttributeError::Malformed("ожидался Size, получен Bool".to_string())
        );
        assert_eq!(
            AttributeValue::Text("Library".into()).into_text(),
            Ok("Library".to_string())
        );
    }

    #[test]
    fn test_attribute_names_render_as_ax_keys() {
        assert_eq!(AttributeName::Subrole.to_string(), "AXSubrole");
        assert_eq!(AttributeName::Fullscreen.as_str(), "AXFullScreen");
    }
}
