use super::value::{
    AttributeName, AttributeStatus, AttributeValue, ElementHandle, Point, Size, WindowLevel,
};
use crate::error::AttributeError;
use crate::winsift_error;
use smallvec::SmallVec;

/// Источник атрибутов: внешняя система, которая может подвисать под нагрузкой.
///
/// Реализация отвечает только за один вызов. Повторы, таймауты и решения
/// о том, что считать окном, находятся снаружи.
pub trait AttributeSource: Send + Sync {
    /// Запросить атрибут `name` у объекта `handle`
    fn attribute(&self, handle: ElementHandle, name: AttributeName)
        -> AttributeStatus<AttributeValue>;

    fn position(&self, handle: ElementHandle) -> Result<Point, AttributeError> {
        self.attribute(handle, AttributeName::Position)
            .into_result()?
            .into_point()
    }

    fn size(&self, handle: ElementHandle) -> Result<Size, AttributeError> {
        self.attribute(handle, AttributeName::Size)
            .into_result()?
            .into_size()
    }

    fn role(&self, handle: ElementHandle) -> Result<String, AttributeError> {
        self.attribute(handle, AttributeName::Role)
            .into_result()?
            .into_text()
    }

    fn subrole(&self, handle: ElementHandle) -> Result<String, AttributeError> {
        self.attribute(handle, AttributeName::Subrole)
            .into_result()?
            .into_text()
    }

    fn title(&self, handle: ElementHandle) -> Result<String, AttributeError> {
        self.attribute(handle, AttributeName::Title)
            .into_result()?
            .into_text()
    }

    fn parent(&self, handle: ElementHandle) -> Result<ElementHandle, AttributeError> {
        self.attribute(handle, AttributeName::Parent)
            .into_result()?
            .into_element()
    }

    fn children(
        &self,
        handle: ElementHandle,
    ) -> Result<SmallVec<[ElementHandle; 8]>, AttributeError> {
        self.attribute(handle, AttributeName::Children)
            .into_result()?
            .into_elements()
    }

    fn minimized(&self, handle: ElementHandle) -> Result<bool, AttributeError> {
        self.attribute(handle, AttributeName::Minimized)
            .into_result()?
            .into_bool()
    }

    fn fullscreen(&self, handle: ElementHandle) -> Result<bool, AttributeError> {
        self.attribute(handle, AttributeName::Fullscreen)
            .into_result()?
            .into_bool()
    }

    fn process_id(&self, handle: ElementHandle) -> Result<u32, AttributeError> {
        let raw = self
            .attribute(handle, AttributeName::ProcessId)
            .into_result()?
            .into_integer()?;
        u32::try_from(raw).map_err(|_| winsift_error!(malformed, "недопустимый pid {}", raw))
    }

    fn window_id(&self, handle: ElementHandle) -> Result<u32, AttributeError> {
        let raw = self
            .attribute(handle, AttributeName::WindowId)
            .into_result()?
            .into_integer()?;
        u32::try_from(raw)
            .map_err(|_| winsift_error!(malformed, "недопустимый идентификатор окна {}", raw))
    }

    fn window_level(&self, handle: ElementHandle) -> Result<WindowLevel, AttributeError> {
        let raw = self
            .attribute(handle, AttributeName::WindowLevel)
            .into_result()?
            .into_integer()?;
        i32::try_from(raw)
            .map(WindowLevel)
            .map_err(|_| winsift_error!(malformed, "недопустимый слой окна {}", raw))
    }
}
