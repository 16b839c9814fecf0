use super::quirks::DEFAULT_RULES;
use super::rules::{ClassificationRule, RuleKind};
use super::snapshot::WindowAttributes;
use crate::attributes::{Size, WindowLevel};
use std::fmt;

/// Окна не больше этого размера по любой стороне не считаются окнами
pub const MIN_WINDOW_DIMENSION: f64 = 100.0;

/// Почему снимок признан окном
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Acceptance {
    AllowListed(&'static str),
    StandardSubrole,
    Quirk(&'static str),
}

/// Почему снимок не признан окном
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    NoWindowId,
    UnknownSize,
    TooSmall(Size),
    NotNormalLevel(Option<WindowLevel>),
    NoRuleMatched,
    Vetoed(&'static str),
}

/// Решение классификатора с причиной
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    Window(Acceptance),
    NotWindow(Rejection),
}

impl Verdict {
    pub fn is_window(&self) -> bool {
        matches!(self, Verdict::Window(_))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Window(Acceptance::AllowListed(rule)) => {
                write!(f, "окно (правило {} без проверки слоя)", rule)
            }
            Verdict::Window(Acceptance::StandardSubrole) => write!(f, "окно (стандартный subrole)"),
            Verdict::Window(Acceptance::Quirk(rule)) => write!(f, "окно (правило {})", rule),
            Verdict::NotWindow(Rejection::NoWindowId) => write!(f, "не окно (нет идентификатора)"),
            Verdict::NotWindow(Rejection::UnknownSize) => write!(f, "не окно (размер неизвестен)"),
            Verdict::NotWindow(Rejection::TooSmall(size)) => {
                write!(f, "не окно (слишком маленькое: {})", size)
            }
            Verdict::NotWindow(Rejection::NotNormalLevel(Some(level))) => {
                write!(f, "не окно (слой {})", level)
            }
            Verdict::NotWindow(Rejection::NotNormalLevel(None)) => {
                write!(f, "не окно (слой неизвестен)")
            }
            Verdict::NotWindow(Rejection::NoRuleMatched) => {
                write!(f, "не окно (нестандартный subrole)")
            }
            Verdict::NotWindow(Rejection::Vetoed(rule)) => {
                write!(f, "не окно (отклонено правилом {})", rule)
            }
        }
    }
}

/// Чистая функция классификации над таблицей правил
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    rules: &'a [ClassificationRule],
}

impl Default for Classifier<'static> {
    fn default() -> Self {
        Self::new(DEFAULT_RULES)
    }
}

impl<'a> Classifier<'a> {
    pub fn new(rules: &'a [ClassificationRule]) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'a [ClassificationRule] {
        self.rules
    }

    pub fn is_actual_window(&self, attrs: &WindowAttributes) -> bool {
        self.classify(attrs).is_window()
    }

    pub fn classify(&self, attrs: &WindowAttributes) -> Verdict {
        if let Some(rejection) = hard_disqualifier(attrs) {
            return Verdict::NotWindow(rejection);
        }

        let applicable = || self.rules.iter().filter(|rule| rule.applies_to(attrs));

        if let Some(rule) = applicable()
            .find(|rule| rule.kind == RuleKind::AlwaysAllow && rule.holds(attrs))
        {
            return Verdict::Window(Acceptance::AllowListed(rule.name));
        }

        if !attrs.is_on_level(WindowLevel::NORMAL) {
            return Verdict::NotWindow(Rejection::NotNormalLevel(attrs.level()));
        }

        let acceptance = if attrs.has_standard_subrole() {
            Acceptance::StandardSubrole
        } else if let Some(rule) = applicable()
            .find(|rule| rule.kind == RuleKind::AllowOnNormalLevel && rule.holds(attrs))
        {
            Acceptance::Quirk(rule.name)
        } else {
            return Verdict::NotWindow(Rejection::NoRuleMatched);
        };

        if let Some(rule) = applicable()
            .find(|rule| rule.kind == RuleKind::RequireOnNormalLevel && !rule.holds(attrs))
        {
            return Verdict::NotWindow(Rejection::Vetoed(rule.name));
        }

        Verdict::Window(acceptance)
    }
}

fn hard_disqualifier(attrs: &WindowAttributes) -> Option<Rejection> {
    match attrs.window_id() {
        None | Some(0) => return Some(Rejection::NoWindowId),
        Some(_) => {}
    }
    match attrs.size() {
        None => Some(Rejection::UnknownSize),
        // NaN не проходит ни одно сравнение и отклоняется
        Some(size) if !(size.width > MIN_WINDOW_DIMENSION && size.height > MIN_WINDOW_DIMENSION) => {
            Some(Rejection::TooSmall(size))
        }
        Some(_) => None,
    }
}

/// Является ли снимок настоящим окном по таблице правил по умолчанию
pub fn is_actual_window(attrs: &WindowAttributes) -> bool {
    Classifier::default().is_actual_window(attrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AppClass;
    use crate::classifier::rules::AppMatcher;
    use crate::classifier::snapshot::*;

    /// Окно с нормальной геометрией и слоем, без subrole и заголовка
    fn window_of(owner: OwnerApp) -> WindowAttributes {
        WindowAttributes::new()
            .with_window_id(42)
            .with_size(800.0, 600.0)
            .with_level(WindowLevel::NORMAL)
            .with_role(AX_WINDOW_ROLE)
            .with_owner(owner)
    }

    fn app(bundle_id: &str) -> WindowAttributes {
        window_of(OwnerApp::from_bundle_id(bundle_id))
    }

    fn perfect() -> WindowAttributes {
        app("com.example.anyapp").with_subrole(AX_STANDARD_WINDOW_SUBROLE)
    }

    #[test]
    fn standard_window_is_accepted() {
        assert!(is_actual_window(&perfect()));
        assert_eq!(
            Classifier::default().classify(&perfect()),
            Verdict::Window(Acceptance::StandardSubrole)
        );
        assert!(is_actual_window(
            &app("com.example.anyapp").with_subrole(AX_DIALOG_SUBROLE)
        ));
    }

    #[test]
    fn zero_window_id_is_rejected_regardless_of_other_fields() {
        for attrs in [
            perfect().with_window_id(0),
            app("com.apple.iBooksX").with_window_id(0),
            app("com.colliderli.iina").with_window_id(0).with_level(WindowLevel(2)),
        ] {
            assert_eq!(
                Classifier::default().classify(&attrs),
                Verdict::NotWindow(Rejection::NoWindowId)
            );
        }
        let mut unknown_id = perfect();
        unknown_id.window_id = None;
        assert!(!is_actual_window(&unknown_id));
    }

    #[test]
    fn small_or_unknown_size_is_rejected() {
        assert!(!is_actual_window(&perfect().with_size(50.0, 50.0)));
        assert!(!is_actual_window(&perfect().with_size(100.0, 600.0)));
        assert!(!is_actual_window(&perfect().with_size(800.0, 100.0)));
        assert!(is_actual_window(&perfect().with_size(101.0, 101.0)));
        // Правило без проверки слоя не обходит минимальный размер
        assert!(!is_actual_window(&app("com.apple.iBooksX").with_size(50.0, 50.0)));

        // Испорченная геометрия считается слишком маленькой
        for (width, height) in [(f64::NAN, f64::NAN), (f64::NAN, 600.0), (800.0, f64::NAN)] {
            let attrs = perfect().with_size(width, height);
            assert!(matches!(
                Classifier::default().classify(&attrs),
                Verdict::NotWindow(Rejection::TooSmall(_))
            ));
        }
        assert!(!is_actual_window(&app("com.apple.iBooksX").with_size(f64::NAN, 600.0)));

        let mut unknown_size = perfect();
        unknown_size.size = None;
        assert_eq!(
            Classifier::default().classify(&unknown_size),
            Verdict::NotWindow(Rejection::UnknownSize)
        );
    }

    #[test]
    fn non_normal_or_unknown_level_is_rejected_on_default_path() {
        let floating = perfect().with_level(WindowLevel::FLOATING);
        assert_eq!(
            Classifier::default().classify(&floating),
            Verdict::NotWindow(Rejection::NotNormalLevel(Some(WindowLevel::FLOATING)))
        );

        let mut unknown_level = perfect();
        unknown_level.level = None;
        assert!(!is_actual_window(&unknown_level));
    }

    #[test]
    fn nonstandard_subrole_is_rejected_without_quirk() {
        assert!(!is_actual_window(&app("com.example.anyapp").with_subrole(AX_UNKNOWN_SUBROLE)));
        // Отсутствующий subrole не считается стандартным
        assert!(!is_actual_window(&app("com.example.anyapp")));
    }

    #[test]
    fn allow_list_ignores_level() {
        for bundle in ["com.apple.iBooksX", "com.apple.iWork.Keynote", "com.colliderli.iina"] {
            let attrs = app(bundle).with_level(WindowLevel(2)).with_subrole(AX_UNKNOWN_SUBROLE);
            assert!(is_actual_window(&attrs), "{}", bundle);
        }
        let mut unknown_level = app("com.apple.iBooksX");
        unknown_level.level = None;
        assert!(is_actual_window(&unknown_level));
    }

    #[test]
    fn preview_requires_standard_subrole_even_off_level() {
        let off_level = app("com.apple.Preview").with_level(WindowLevel(8));
        assert!(is_actual_window(&off_level.clone().with_subrole(AX_DIALOG_SUBROLE)));
        assert!(!is_actual_window(&off_level.with_subrole(AX_UNKNOWN_SUBROLE)));
    }

    #[test]
    fn fl_studio_requires_title() {
        let fl = app("com.image-line.flstudio").with_level(WindowLevel(5));
        assert!(is_actual_window(&fl.clone().with_title("Pattern 1")));
        assert!(!is_actual_window(&fl.clone().with_title("")));
        assert!(!is_actual_window(&fl));
    }

    #[test]
    fn crossover_windows_need_wine_loader_and_unknown_subrole() {
        let wine = window_of(OwnerApp::unknown().with_localized_name("wine64-preloader"));
        assert_eq!(
            Classifier::default().classify(&wine.clone().with_subrole(AX_UNKNOWN_SUBROLE)),
            Verdict::Window(Acceptance::AllowListed("crossover"))
        );
        assert!(!is_actual_window(
            &wine.with_subrole(AX_UNKNOWN_SUBROLE).with_level(WindowLevel::FLOATING)
        ));
        let other = window_of(OwnerApp::unknown().with_localized_name("wine"));
        assert!(!is_actual_window(&other.with_subrole(AX_UNKNOWN_SUBROLE)));
    }

    #[test]
    fn scrcpy_on_top_is_accepted_on_floating_level() {
        let scrcpy = window_of(OwnerApp::unknown().with_localized_name("scrcpy"))
            .with_subrole(AX_STANDARD_WINDOW_SUBROLE)
            .with_level(WindowLevel::FLOATING);
        assert!(is_actual_window(&scrcpy));
        assert!(!is_actual_window(&scrcpy.with_level(WindowLevel(8))));
    }

    #[test]
    fn steam_requires_nonempty_title() {
        let steam = app("com.valvesoftware.steam").with_subrole(AX_STANDARD_WINDOW_SUBROLE);
        assert_eq!(
            Classifier::default().classify(&steam.clone().with_title("")),
            Verdict::NotWindow(Rejection::Vetoed("steam-dropdown"))
        );

        let library = app("com.valvesoftware.steam").with_title("Library");
        assert_eq!(
            Classifier::default().classify(&library),
            Verdict::Window(Acceptance::Quirk("steam"))
        );
        // Без заголовка не срабатывает уже само правило steam
        assert_eq!(
            Classifier::default().classify(&app("com.valvesoftware.steam")),
            Verdict::NotWindow(Rejection::NoRuleMatched)
        );

        let mut roleless = library.clone();
        roleless.role = None;
        assert!(!is_actual_window(&roleless.with_subrole(AX_STANDARD_WINDOW_SUBROLE)));
    }

    #[test]
    fn floating_subrole_quirks_for_adobe() {
        for bundle in ["com.adobe.Audition", "com.adobe.AfterEffects"] {
            assert!(is_actual_window(&app(bundle).with_subrole(AX_FLOATING_WINDOW_SUBROLE)));
            assert!(!is_actual_window(&app(bundle).with_subrole(AX_UNKNOWN_SUBROLE)));
        }
        // Чужое плавающее окно не принимается
        assert!(!is_actual_window(&app("com.example.anyapp").with_subrole(AX_FLOATING_WINDOW_SUBROLE)));
    }

    #[test]
    fn role_based_quirks_require_window_role() {
        for bundle in [
            "com.blizzard.worldofwarcraft",
            "net.battle.bootstrapper",
            "org.videolan.vlc",
        ] {
            let attrs = app(bundle).with_subrole(AX_UNKNOWN_SUBROLE);
            assert!(is_actual_window(&attrs), "{}", bundle);
            assert!(!is_actual_window(&attrs.with_role("AXSheet")), "{}", bundle);
        }
    }

    #[test]
    fn firefox_rejects_short_tooltips() {
        let video = app("org.mozilla.firefoxdeveloperedition").with_subrole(AX_UNKNOWN_SUBROLE);
        assert!(is_actual_window(&video));
        assert!(!is_actual_window(&video.with_size(300.0, 250.0)));
    }

    #[test]
    fn ported_apps_are_accepted_on_normal_level() {
        for bundle in [
            "org.oe-f.OpenBoard",
            "SanGuoShaAirWD",
            "com.goland.dvdfab.macos",
            "com.ssworks.drbetotte",
        ] {
            let attrs = app(bundle).with_subrole(AX_UNKNOWN_SUBROLE);
            assert!(is_actual_window(&attrs), "{}", bundle);
            assert!(!is_actual_window(&attrs.with_level(WindowLevel::FLOATING)), "{}", bundle);
        }
    }

    #[test]
    fn android_emulator_needs_registry_classification_and_title() {
        let title = "Android Emulator - pixel_3a_API_30:5554";
        let emulator = window_of(OwnerApp::unknown().with_class(AppClass::AndroidEmulator))
            .with_subrole(AX_UNKNOWN_SUBROLE);
        assert!(is_actual_window(&emulator.clone().with_title(title)));
        assert!(!is_actual_window(&emulator));

        let unclassified = window_of(OwnerApp::unknown()).with_subrole(AX_UNKNOWN_SUBROLE);
        assert!(!is_actual_window(&unclassified.with_title(title)));
    }

    #[test]
    fn autocad_document_windows() {
        let drawing = app("com.autodesk.AutoCAD2025").with_subrole(AX_DOCUMENT_WINDOW_SUBROLE);
        assert!(is_actual_window(&drawing));
        assert!(!is_actual_window(
            &app("com.example.anyapp").with_subrole(AX_DOCUMENT_WINDOW_SUBROLE)
        ));
    }

    #[test]
    fn jetbrains_untitled_windows_are_vetoed() {
        let ide = app("com.jetbrains.intellij");
        assert!(is_actual_window(&ide.clone().with_subrole(AX_STANDARD_WINDOW_SUBROLE)));
        assert!(is_actual_window(&ide.clone().with_subrole(AX_DIALOG_SUBROLE).with_title("Settings")));
        assert_eq!(
            Classifier::default().classify(&ide.with_subrole(AX_DIALOG_SUBROLE)),
            Verdict::NotWindow(Rejection::Vetoed("jetbrains-untitled"))
        );
        let studio = app("com.google.android.studio").with_subrole(AX_DIALOG_SUBROLE).with_title("");
        assert!(!is_actual_window(&studio));
    }

    #[test]
    fn colorslurp_requires_standard_window_subrole() {
        let picker = app("com.IdeaPunch.ColorSlurp");
        assert!(is_actual_window(&picker.clone().with_subrole(AX_STANDARD_WINDOW_SUBROLE)));
        assert!(!is_actual_window(&picker.with_subrole(AX_DIALOG_SUBROLE)));
    }

    fn isolation_samples() -> Vec<WindowAttributes> {
        let mut samples = Vec::new();
        for bundle in [
            "com.example.anyapp",
            "com.valvesoftware.steam",
            "org.mozilla.firefox",
            "com.jetbrains.intellij",
            "com.apple.iBooksX",
            "com.example.newapp.helper",
        ] {
            for subrole in [None, Some(AX_STANDARD_WINDOW_SUBROLE), Some(AX_UNKNOWN_SUBROLE)] {
                for title in [None, Some(""), Some("Main")] {
                    for level in [WindowLevel::NORMAL, WindowLevel::FLOATING] {
                        let mut attrs = app(bundle).with_level(level);
                        if let Some(subrole) = subrole {
                            attrs = attrs.with_subrole(subrole);
                        }
                        if let Some(title) = title {
                            attrs = attrs.with_title(title);
                        }
                        samples.push(attrs);
                    }
                }
            }
        }
        samples
    }

    #[test]
    fn new_rule_does_not_change_other_apps() {
        fn never(_: &WindowAttributes) -> bool {
            false
        }
        fn always(_: &WindowAttributes) -> bool {
            true
        }

        let mut extended = DEFAULT_RULES.to_vec();
        extended.push(ClassificationRule {
            name: "newapp-allow",
            symptom: "тест",
            kind: RuleKind::AlwaysAllow,
            app: AppMatcher::BundleId("com.example.newapp"),
            predicate: always,
        });
        extended.push(ClassificationRule {
            name: "newapp-veto",
            symptom: "тест",
            kind: RuleKind::RequireOnNormalLevel,
            app: AppMatcher::BundleId("com.example.newapp"),
            predicate: never,
        });

        let base = Classifier::default();
        let with_new = Classifier::new(&extended);
        for attrs in isolation_samples() {
            assert_eq!(base.classify(&attrs), with_new.classify(&attrs), "{}", attrs);
        }

        // Для самого приложения правило действует
        let newapp = app("com.example.newapp").with_level(WindowLevel(20));
        assert!(!base.is_actual_window(&newapp));
        assert!(with_new.is_actual_window(&newapp));
    }

    #[test]
    fn classification_is_deterministic() {
        let classifier = Classifier::default();
        for attrs in isolation_samples() {
            assert_eq!(classifier.classify(&attrs), classifier.classify(&attrs.clone()));
        }
    }
}
