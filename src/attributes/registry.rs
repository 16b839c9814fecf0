use serde::Deserialize;
use smallvec::SmallVec;
use std::fmt;

/// Сведения о процессе-владельце окна
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApplicationInfo {
    pub pid: u32,
    pub bundle_id: Option<String>,
    pub localized_name: Option<String>,
    pub executable_path: Option<String>,
}

impl ApplicationInfo {
    pub fn new(pid: u32) -> Self {
        Self {
            pid,
            ..Self::default()
        }
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

    /// Имя исполняемого файла без пути
    pub fn executable_name(&self) -> Option<&str> {
        self.executable_path
            .as_deref()
            .map(|path| path.rsplit('/').next().unwrap_or(path))
    }
}

impl fmt::Display for ApplicationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.bundle_id, &self.localized_name) {
            (Some(id), _) => write!(f, "{} (pid {})", id, self.pid),
            (None, Some(name)) => write!(f, "\"{}\" (pid {})", name, self.pid),
            (None, None) => write!(f, "pid {}", self.pid),
        }
    }
}

/// Состояние процесса-владельца
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunningState {
    Running,
    Terminated,
    #[default]
    Unknown,
}

/// Классы приложений, которые реестр умеет распознавать
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppClass {
    AndroidEmulator,
}

impl AppClass {
    pub const ALL: [AppClass; 1] = [AppClass::AndroidEmulator];

    /// Распознать классы приложения по его метаданным.
    ///
    /// Эмулятор Android не имеет bundle id и запускается бинарником qemu-system-*.
    pub fn detect(info: &ApplicationInfo) -> SmallVec<[AppClass; 2]> {
        let mut classes = SmallVec::new();
        if info.bundle_id.is_none()
            && info
                .executable_name()
                .is_some_and(|name| name.starts_with("qemu-system"))
        {
            classes.push(AppClass::AndroidEmulator);
        }
        classes
    }
}

/// Реестр запущенных приложений
pub trait ApplicationRegistry: Send + Sync {
    fn application(&self, pid: u32) -> Option<ApplicationInfo>;

    fn running_state(&self, pid: u32) -> RunningState;

    fn is_running_application_classified(&self, pid: u32, class: AppClass) -> bool;
}
