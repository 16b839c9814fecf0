//! Scripted attribute source and application registry.
//!
//! Both answer from in-memory tables filled from a fixture file or by tests.
//! The source can simulate a busy peer: a number of stalled calls before the
//! first real answer, or a peer that never answers at all.

use super::registry::{AppClass, ApplicationInfo, ApplicationRegistry, RunningState};
use super::value::{AttributeName, AttributeStatus, AttributeValue, ElementHandle, Size};
use crate::error::{Result, WinsiftError};
use anyhow::Context;
use dashmap::DashMap;
use figment::{
    providers::{Format, Toml},
    Figment,
};
use serde::Deserialize;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, info};

/// Объект с заранее заданными ответами
#[derive(Debug, Default)]
pub struct ScriptedElement {
    values: HashMap<AttributeName, AttributeValue>,
    stalls: AtomicU32,
    hung: bool,
    calls: AtomicU32,
}

impl ScriptedElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: AttributeName, value: AttributeValue) -> Self {
        self.values.insert(name, value);
        self
    }

    /// Первые `stalls` обращений вернут TransientFailure
    pub fn with_stalls(self, stalls: u32) -> Self {
        self.stalls.store(stalls, Ordering::SeqCst);
        self
    }

    /// Объект никогда не отвечает (зависший процесс)
    pub fn hung(mut self) -> Self {
        self.hung = true;
        self
    }
}

#[derive(Debug, Default)]
pub struct ScriptedAttributeSource {
    elements: DashMap<ElementHandle, ScriptedElement>,
}

impl ScriptedAttributeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, handle: ElementHandle, element: ScriptedElement) {
        self.elements.insert(handle, element);
    }

    /// Сколько раз к объекту обращались
    pub fn calls(&self, handle: ElementHandle) -> u32 {
        self.elements
            .get(&handle)
            .map(|element| element.calls.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn handles(&self) -> Vec<ElementHandle> {
        let mut handles: Vec<ElementHandle> = self.elements.iter().map(|e| *e.key()).collect();
        handles.sort_by_key(|h| h.0);
        handles
    }
}

impl super::AttributeSource for ScriptedAttributeSource {
    fn attribute(
        &self,
        handle: ElementHandle,
        name: AttributeName,
    ) -> AttributeStatus<AttributeValue> {
        // Исчезнувший объект ведёт себя как объект без атрибутов
        let Some(element) = self.elements.get(&handle) else {
            return AttributeStatus::Unsupported;
        };
        element.calls.fetch_add(1, Ordering::SeqCst);

        if element.hung {
            return AttributeStatus::TransientFailure;
        }

        let stalled = element
            .stalls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if stalled {
            return AttributeStatus::TransientFailure;
        }

        match element.values.get(&name) {
            Some(value) => AttributeStatus::Ok(value.clone()),
            None => AttributeStatus::Unsupported,
        }
    }
}

#[derive(Debug, Clone)]
struct RegisteredApp {
    info: ApplicationInfo,
    state: RunningState,
    classes: SmallVec<[AppClass; 2]>,
}

#[derive(Debug, Default)]
pub struct StaticApplicationRegistry {
    apps: DashMap<u32, RegisteredApp>,
}

impl StaticApplicationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Зарегистрировать приложение; классы распознаются по метаданным
    pub fn register(&self, info: ApplicationInfo, state: RunningState) {
        let classes = AppClass::detect(&info);
        debug!("Регистрация приложения {} ({:?}, классы: {:?})", info, state, classes);
        self.apps.insert(
            info.pid,
            RegisteredApp {
                info,
                state,
                classes,
            },
        );
    }

    /// Явно отнести приложение к классу
    pub fn classify(&self, pid: u32, class: AppClass) -> Result<()> {
        let Some(mut app) = self.apps.get_mut(&pid) else {
            return WinsiftError::application_not_found(format!("pid {}", pid));
        };
        if !app.classes.contains(&class) {
            app.classes.push(class);
        }
        Ok(())
    }
}

impl ApplicationRegistry for StaticApplicationRegistry {
    fn application(&self, pid: u32) -> Option<ApplicationInfo> {
        self.apps.get(&pid).map(|app| app.info.clone())
    }

    fn running_state(&self, pid: u32) -> RunningState {
        self.apps
            .get(&pid)
            .map(|app| app.state)
            .unwrap_or(RunningState::Unknown)
    }

    fn is_running_application_classified(&self, pid: u32, class: AppClass) -> bool {
        self.apps
            .get(&pid)
            .map(|app| app.state != RunningState::Terminated && app.classes.contains(&class))
            .unwrap_or(false)
    }
}

/// Описание приложения в файле фикстур
#[derive(Debug, Clone, Deserialize)]
pub struct AppFixture {
    pub pid: u32,
    pub bundle_id: Option<String>,
    pub localized_name: Option<String>,
    pub executable_path: Option<String>,
    #[serde(default = "default_state")]
    pub state: RunningState,
    #[serde(default)]
    pub classes: Vec<AppClass>,
}

fn default_state() -> RunningState {
    RunningState::Running
}

/// Описание окна в файле фикстур
#[derive(Debug, Clone, Deserialize)]
pub struct WindowFixture {
    pub handle: u64,
    pub pid: Option<u32>,
    pub window_id: Option<u32>,
    pub size: Option<Size>,
    pub level: Option<i32>,
    pub title: Option<String>,
    pub role: Option<String>,
    pub subrole: Option<String>,
    #[serde(default)]
    pub stalls: u32,
    #[serde(default)]
    pub hung: bool,
}

impl WindowFixture {
    fn into_element(self) -> ScriptedElement {
        let mut element = ScriptedElement::new().with_stalls(self.stalls);
        if self.hung {
            element = element.hung();
        }
        if let Some(pid) = self.pid {
            element = element.with(AttributeName::ProcessId, AttributeValue::Integer(pid.into()));
        }
        if let Some(id) = self.window_id {
            element = element.with(AttributeName::WindowId, AttributeValue::Integer(id.into()));
        }
        if let Some(size) = self.size {
            element = element.with(AttributeName::Size, AttributeValue::Size(size));
        }
        if let Some(level) = self.level {
            element = element.with(AttributeName::WindowLevel, AttributeValue::Integer(level.into()));
        }
        for (name, text) in [
            (AttributeName::Title, self.title),
            (AttributeName::Role, self.role),
            (AttributeName::Subrole, self.subrole),
        ] {
            if let Some(text) = text {
                element = element.with(name, AttributeValue::Text(text));
            }
        }
        element
    }
}

/// Набор фикстур: приложения и их окна
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureSet {
    #[serde(default)]
    pub apps: Vec<AppFixture>,
    #[serde(default)]
    pub windows: Vec<WindowFixture>,
}

impl FixtureSet {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let fixtures: FixtureSet = Figment::new()
            .merge(Toml::file(path))
            .extract()
            .with_context(|| format!("Не удалось загрузить фикстуры из {:?}", path))?;

        info!(
            "Загружено фикстур: {} приложений, {} окон",
            fixtures.apps.len(),
            fixtures.windows.len()
        );
        Ok(fixtures)
    }

    pub fn into_parts(self) -> Result<(ScriptedAttributeSource, StaticApplicationRegistry)> {
        let registry = StaticApplicationRegistry::new();
        for app in self.apps {
            let mut info = ApplicationInfo::new(app.pid);
            info.bundle_id = app.bundle_id;
            info.localized_name = app.localized_name;
            info.executable_path = app.executable_path;
            registry.register(info, app.state);
            for class in app.classes {
                registry.classify(app.pid, class)?;
            }
        }

        let source = ScriptedAttributeSource::new();
        for window in self.windows {
            let handle = ElementHandle(window.handle);
            source.insert(handle, window.into_element());
        }

        Ok((source, registry))
    }
}
