use crate::attributes::{AppClass, ApplicationInfo, RunningState, Size, WindowLevel};
use smallvec::SmallVec;
use std::fmt;

pub const AX_WINDOW_ROLE: &str = "AXWindow";
pub const AX_STANDARD_WINDOW_SUBROLE: &str = "AXStandardWindow";
pub const AX_DIALOG_SUBROLE: &str = "AXDialog";
pub const AX_FLOATING_WINDOW_SUBROLE: &str = "AXFloatingWindow";
pub const AX_UNKNOWN_SUBROLE: &str = "AXUnknown";
/// Недокументированный subrole, который использует AutoCAD
pub const AX_DOCUMENT_WINDOW_SUBROLE: &str = "AXDocumentWindow";

/// Суброли, которые считаются обычными окнами
pub const STANDARD_SUBROLES: [&str; 2] = [AX_STANDARD_WINDOW_SUBROLE, AX_DIALOG_SUBROLE];

/// Владелец окна, каким его видит классификатор
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OwnerApp {
    pub(crate) pid: Option<u32>,
    pub(crate) bundle_id: Option<String>,
    pub(crate) localized_name: Option<String>,
    pub(crate) executable_path: Option<String>,
    pub(crate) classes: SmallVec<[AppClass; 2]>,
    pub(crate) state: RunningState,
}

impl OwnerApp {
    /// Владелец неизвестен
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn from_bundle_id(bundle_id: impl Into<String>) -> Self {
        Self::default().with_bundle_id(bundle_id)
    }

    /// Собрать владельца из ответа реестра приложений
    pub fn from_application(
        info: ApplicationInfo,
        classes: SmallVec<[AppClass; 2]>,
        state: RunningState,
    ) -> Self {
        Self {
            pid: Some(info.pid),
            bundle_id: info.bundle_id,
            localized_name: info.localized_name,
            executable_path: info.executable_path,
            classes,
            state,
        }
    }

    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    pub fn with_bundle_id(mut self, bundle_id: impl Into<String>) -> Self {
        self.bundle_id = Some(bundle_id.into());
        self
    }

    pub fn with_localized_name(mut self, name: impl Into<String>) -> Self {
        self.localized_name = Some(name.into());
        self
    }

    pub fn with_executable_path(mut self, path: impl Into<String>) -> Self {
        self.executable_path = Some(path.into());
        self
    }

    pub fn with_class(mut self, class: AppClass) -> Self {
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    pub fn with_state(mut self, state: RunningState) -> Self {
        self.state = state;
        self
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn bundle_id(&self) -> Option<&str> {
        self.bundle_id.as_deref()
    }

    pub fn localized_name(&self) -> Option<&str> {
        self.localized_name.as_deref()
    }

    pub fn executable_path(&self) -> Option<&str> {
        self.executable_path.as_deref()
    }

    pub fn is_classified(&self, class: AppClass) -> bool {
        self.classes.contains(&class)
    }

    pub fn state(&self) -> RunningState {
        self.state
    }
}

impl fmt::Display for OwnerApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.bundle_id, &self.localized_name) {
            (Some(id), _) => write!(f, "{}", id),
            (None, Some(name)) => write!(f, "\"{}\"", name),
            (None, None) => write!(f, "<неизвестно>"),
        }
    }
}

/// Снимок атрибутов окна.
///
/// Каждое поле запрашивается отдельно и может отсутствовать; отсутствие
/// означает "неизвестно", а не "нет". Снимок не меняется после сборки:
/// методы `with_*` возвращают новый снимок.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowAttributes {
    pub(crate) window_id: Option<u32>,
    pub(crate) size: Option<Size>,
    pub(crate) level: Option<WindowLevel>,
    pub(crate) title: Option<String>,
    pub(crate) subrole: Option<String>,
    pub(crate) role: Option<String>,
    pub(crate) owner: OwnerApp,
}

impl WindowAttributes {
    /// Снимок, в котором ничего не известно
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window_id(mut self, window_id: u32) -> Self {
        self.window_id = Some(window_id);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Some(Size::new(width, height));
        self
    }

    pub fn with_level(mut self, level: WindowLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_subrole(mut self, subrole: impl Into<String>) -> Self {
        self.subrole = Some(subrole.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_owner(mut self, owner: OwnerApp) -> Self {
        self.owner = owner;
        self
    }

    pub fn window_id(&self) -> Option<u32> {
        self.window_id
    }

    pub fn size(&self) -> Option<Size> {
        self.size
    }

    pub fn level(&self) -> Option<WindowLevel> {
        self.level
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn subrole(&self) -> Option<&str> {
        self.subrole.as_deref()
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn owner(&self) -> &OwnerApp {
        &self.owner
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role() == Some(role)
    }

    pub fn has_subrole(&self, subrole: &str) -> bool {
        self.subrole() == Some(subrole)
    }

    pub fn has_standard_subrole(&self) -> bool {
        self.subrole()
            .is_some_and(|subrole| STANDARD_SUBROLES.contains(&subrole))
    }

    /// Заголовок известен и не пуст
    pub fn has_nonempty_title(&self) -> bool {
        self.title().is_some_and(|title| !title.is_empty())
    }

    pub fn is_on_level(&self, level: WindowLevel) -> bool {
        self.level == Some(level)
    }
}

impl fmt::Display for WindowAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn show<T: fmt::Display>(value: &Option<T>) -> String {
            value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "?".to_string())
        }

        let title = match self.title() {
            Some(title) => format!("\"{}\"", title),
            None => "?".to_string(),
        };

        write!(
            f,
            "окно {} {} [{}] размер {} слой {} role {} subrole {}",
            show(&self.window_id),
            title,
            self.owner,
            show(&self.size),
            show(&self.level),
            show(&self.role),
            show(&self.subrole)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_snapshot_is_all_unknown() {
        let attrs = WindowAttributes::new();
        assert_eq!(attrs.window_id(), None);
        assert_eq!(attrs.size(), None);
        assert_eq!(attrs.title(), None);
        assert!(!attrs.has_standard_subrole());
        assert!(!attrs.has_nonempty_title());
        assert_eq!(attrs.owner().bundle_id(), None);
    }

    #[test]
    fn test_empty_title_differs_from_absent_title() {
        let empty = WindowAttributes::new().with_title("");
        let absent = WindowAttributes::new();
        assert_eq!(empty.title(), Some(""));
        assert_eq!(absent.title(), None);
        assert!(!empty.has_nonempty_title());
        assert_ne!(empty, absent);
    }

    #[test]
    fn test_builders_return_new_snapshot() {
        let base = WindowAttributes::new().with_window_id(42);
        let titled = base.clone().with_title("Library");
        assert_eq!(base.title(), None);
        assert_eq!(titled.title(), Some("Library"));
        assert_eq!(titled.window_id(), Some(42));
    }

    #[test]
    fn test_standard_subroles() {
        assert!(WindowAttributes::new().with_subrole(AX_STANDARD_WINDOW_SUBROLE).has_standard_subrole());
        assert!(WindowAttributes::new().with_subrole(AX_DIALOG_SUBROLE).has_standard_subrole());
        assert!(!WindowAttributes::new().with_subrole(AX_UNKNOWN_SUBROLE).has_standard_subrole());
    }

    #[test]
    fn test_owner_from_application() {
        let info = ApplicationInfo::new(12).with_bundle_id("org.videolan.vlc");
        let owner = OwnerApp::from_application(info, SmallVec::new(), RunningState::Running);
        assert_eq!(owner.pid(), Some(12));
        assert_eq!(owner.bundle_id(), Some("org.videolan.vlc"));
        assert_eq!(owner.state(), RunningState::Running);
        assert!(!owner.is_classified(AppClass::AndroidEmulator));
    }

    #[test]
    fn test_display_marks_unknown_fields() {
        let attrs = WindowAttributes::new()
            .with_window_id(7)
            .with_owner(OwnerApp::from_bundle_id("com.example.app"));
        assert_eq!(
            attrs.to_string(),
            "окно 7 ? [com.example.app] размер ? слой ? role ? subrole ?"
        );
    }
}
