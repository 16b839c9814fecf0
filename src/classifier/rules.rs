use super::snapshot::{OwnerApp, WindowAttributes};
use crate::attributes::AppClass;
use std::fmt;

/// Место правила в порядке проверки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Окно принимается независимо от слоя
    AlwaysAllow,
    /// Окно на обычном слое принимается, даже если subrole нестандартный
    AllowOnNormalLevel,
    /// Обязательное условие для окон приложения на обычном слое
    RequireOnNormalLevel,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleKind::AlwaysAllow => "всегда",
            RuleKind::AllowOnNormalLevel => "разрешает",
            RuleKind::RequireOnNormalLevel => "требует",
        };
        f.write_str(name)
    }
}

/// К какому приложению относится правило
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMatcher {
    BundleId(&'static str),
    BundleIdPrefix(&'static str),
    AnyBundleIdPrefix(&'static [&'static str]),
    LocalizedName(&'static str),
    Classified(AppClass),
    /// Процесс Wine (CrossOver) без bundle id
    WineLoader,
}

impl AppMatcher {
    pub fn matches(&self, owner: &OwnerApp) -> bool {
        match self {
            AppMatcher::BundleId(id) => owner.bundle_id() == Some(*id),
            AppMatcher::BundleIdPrefix(prefix) => owner
                .bundle_id()
                .is_some_and(|id| id.starts_with(prefix)),
            AppMatcher::AnyBundleIdPrefix(prefixes) => owner
                .bundle_id()
                .is_some_and(|id| prefixes.iter().any(|prefix| id.starts_with(prefix))),
            AppMatcher::LocalizedName(name) => owner.localized_name() == Some(*name),
            AppMatcher::Classified(class) => owner.is_classified(*class),
            AppMatcher::WineLoader => {
                owner.bundle_id().is_none()
                    && (owner.localized_name() == Some("wine64-preloader")
                        || owner
                            .executable_path()
                            .is_some_and(|path| path.contains("/winetemp-")))
            }
        }
    }
}

impl fmt::Display for AppMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppMatcher::BundleId(id) => write!(f, "{}", id),
            AppMatcher::BundleIdPrefix(prefix) => write!(f, "{}*", prefix),
            AppMatcher::AnyBundleIdPrefix(prefixes) => {
                let joined: Vec<String> = prefixes.iter().map(|p| format!("{}*", p)).collect();
                write!(f, "{}", joined.join("|"))
            }
            AppMatcher::LocalizedName(name) => write!(f, "\"{}\"", name),
            AppMatcher::Classified(class) => write!(f, "{:?}", class),
            AppMatcher::WineLoader => write!(f, "wine"),
        }
    }
}

/// Именованное правило классификации.
///
/// Правило рассматривается только для окон приложения, которое выбирает
/// `app`; поэтому новое правило не влияет на окна других приложений.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    pub name: &'static str,
    /// Наблюдаемый симптом, который исправляет правило
    pub symptom: &'static str,
    pub kind: RuleKind,
    pub app: AppMatcher,
    pub predicate: fn(&WindowAttributes) -> bool,
}

impl ClassificationRule {
    pub fn applies_to(&self, attrs: &WindowAttributes) -> bool {
        self.app.matches(attrs.owner())
    }

    pub fn holds(&self, attrs: &WindowAttributes) -> bool {
        (self.predicate)(attrs)
    }
}

impl fmt::Display for ClassificationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}, {}]: {}", self.name, self.kind, self.app, self.symptom)
    }
}
