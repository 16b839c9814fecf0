//! Known quirks of specific applications.
//!
//! The role/subrole/level vocabulary is only loosely followed by third-party
//! apps. Each entry corrects one observed false positive or false negative
//! and only ever looks at windows of its own application.

use super::rules::{AppMatcher, ClassificationRule, RuleKind};
use super::snapshot::{
    WindowAttributes, AX_DOCUMENT_WINDOW_SUBROLE, AX_FLOATING_WINDOW_SUBROLE,
    AX_STANDARD_WINDOW_SUBROLE, AX_UNKNOWN_SUBROLE, AX_WINDOW_ROLE,
};
use crate::attributes::{AppClass, WindowLevel};

pub static DEFAULT_RULES: &[ClassificationRule] = &[
    // Окна вне обычного слоя
    ClassificationRule {
        name: "books",
        symptom: "анимация открытия: окно создаётся с AXUnknown и не на обычном слое",
        kind: RuleKind::AlwaysAllow,
        app: AppMatcher::BundleId("com.apple.iBooksX"),
        predicate: always,
    },
    ClassificationRule {
        name: "keynote",
        symptom: "режим презентации закрывает экран окном AXUnknown вместо полноэкранного режима",
        kind: RuleKind::AlwaysAllow,
        app: AppMatcher::BundleId("com.apple.iWork.Keynote"),
        predicate: always,
    },
    ClassificationRule {
        name: "preview",
        symptom: "окна документов в полноэкранном режиме уходят с обычного слоя",
        kind: RuleKind::AlwaysAllow,
        app: AppMatcher::BundleId("com.apple.Preview"),
        predicate: standard_subrole,
    },
    ClassificationRule {
        name: "iina",
        symptom: "плавающее видео живёт на слое 2, при анимациях меняет атрибуты",
        kind: RuleKind::AlwaysAllow,
        app: AppMatcher::BundleId("com.colliderli.iina"),
        predicate: always,
    },
    ClassificationRule {
        name: "fl-studio",
        symptom: "портированное приложение без стандартных окон; служебные окна без заголовка",
        kind: RuleKind::AlwaysAllow,
        app: AppMatcher::BundleId("com.image-line.flstudio"),
        predicate: nonempty_title,
    },
    ClassificationRule {
        name: "crossover",
        symptom: "окна Wine приходят с subrole AXUnknown и без bundle id",
        kind: RuleKind::AlwaysAllow,
        app: AppMatcher::WineLoader,
        predicate: wine_window,
    },
    ClassificationRule {
        name: "scrcpy",
        symptom: "режим \"поверх всех\" переносит окно на плавающий слой",
        kind: RuleKind::AlwaysAllow,
        app: AppMatcher::LocalizedName("scrcpy"),
        predicate: floating_standard_window,
    },
    // Нестандартный subrole на обычном слое
    ClassificationRule {
        name: "openboard",
        symptom: "портированное приложение не использует стандартные окна",
        kind: RuleKind::AllowOnNormalLevel,
        app: AppMatcher::BundleId("org.oe-f.OpenBoard"),
        predicate: always,
    },
    ClassificationRule {
        name: "adobe-audition",
        symptom: "главное окно имеет subrole AXFloatingWindow",
        kind: RuleKind::AllowOnNormalLevel,
        app: AppMatcher::BundleId("com.adobe.Audition"),
        predicate: floating_subrole,
    },
    ClassificationRule {
        name: "adobe-after-effects",
        symptom: "главное окно имеет subrole AXFloatingWindow",
        kind: RuleKind::AllowOnNormalLevel,
        app: AppMatcher::BundleId("com.adobe.AfterEffects"),
        predicate: floating_subrole,
    },
    ClassificationRule {
        name: "steam",
        symptom: "все окна имеют subrole AXUnknown",
        kind: RuleKind::AllowOnNormalLevel,
        app: AppMatcher::BundleId("com.valvesoftware.steam"),
        predicate: titled_with_role,
    },
    ClassificationRule {
        name: "world-of-warcraft",
        symptom: "игровое окно имеет subrole AXUnknown",
        kind: RuleKind::AllowOnNormalLevel,
        app: AppMatcher::BundleId("com.blizzard.worldofwarcraft"),
        predicate: window_role,
    },
    ClassificationRule {
        name: "battle-net-bootstrapper",
        symptom: "окна загрузчика имеют subrole AXUnknown",
        kind: RuleKind::AllowOnNormalLevel,
        app: AppMatcher::BundleId("net.battle.bootstrapper"),
        predicate: window_role,
    },
    ClassificationRule {
        name: "firefox",
        symptom: "полноэкранное видео получает AXUnknown; подсказки тоже AXUnknown, но низкие",
        kind: RuleKind::AllowOnNormalLevel,
        app: AppMatcher::BundleIdPrefix("org.mozilla.firefox"),
        predicate: firefox_window,
    },
    ClassificationRule {
        name: "vlc",
        symptom: "полноэкранное видео имеет subrole AXUnknown",
        kind: RuleKind::AllowOnNormalLevel,
        app: AppMatcher::BundleIdPrefix("org.videolan.vlc"),
        predicate: window_role,
    },
    ClassificationRule {
        name: "sanguosha",
        symptom: "игровое окно не сообщает стандартный subrole",
        kind: RuleKind::AllowOnNormalLevel,
        app: AppMatcher::BundleId("SanGuoShaAirWD"),
        predicate: always,
    },
    ClassificationRule {
        name: "dvdfab",
        symptom: "главное окно не сообщает стандартный subrole",
        kind: RuleKind::AllowOnNormalLevel,
        app: AppMatcher::BundleId("com.goland.dvdfab.macos"),
        predicate: always,
    },
    ClassificationRule {
        name: "dr-betotte",
        symptom: "игровое окно не сообщает стандартный subrole",
        kind: RuleKind::AllowOnNormalLevel,
        app: AppMatcher::BundleId("com.ssworks.drbetotte"),
        predicate: always,
    },
    ClassificationRule {
        name: "android-emulator",
        symptom: "главное окно эмулятора имеет subrole AXUnknown, боковые панели без заголовка",
        kind: RuleKind::AllowOnNormalLevel,
        app: AppMatcher::Classified(AppClass::AndroidEmulator),
        predicate: android_emulator_title,
    },
    ClassificationRule {
        name: "autocad",
        symptom: "окна чертежей используют subrole AXDocumentWindow",
        kind: RuleKind::AllowOnNormalLevel,
        app: AppMatcher::BundleIdPrefix("com.autodesk.AutoCAD"),
        predicate: document_subrole,
    },
    // Обязательные условия
    ClassificationRule {
        name: "jetbrains-untitled",
        symptom: "IDE порождают служебные окна без заголовка, проходящие общие проверки",
        kind: RuleKind::RequireOnNormalLevel,
        app: AppMatcher::AnyBundleIdPrefix(&["com.jetbrains.", "com.google."]),
        predicate: standard_window_or_titled,
    },
    ClassificationRule {
        name: "steam-dropdown",
        symptom: "выпадающие меню имеют пустой заголовок или на миг теряют role",
        kind: RuleKind::RequireOnNormalLevel,
        app: AppMatcher::BundleId("com.valvesoftware.steam"),
        predicate: titled_with_role,
    },
    ClassificationRule {
        name: "colorslurp",
        symptom: "пипетка рисует окно AXUnknown поверх экрана",
        kind: RuleKind::RequireOnNormalLevel,
        app: AppMatcher::BundleId("com.IdeaPunch.ColorSlurp"),
        predicate: standard_window_subrole,
    },
];

/// Минимальная высота окна Firefox; подсказки ниже
const FIREFOX_MIN_HEIGHT: f64 = 400.0;

fn always(_: &WindowAttributes) -> bool {
    true
}

fn standard_subrole(attrs: &WindowAttributes) -> bool {
    attrs.has_standard_subrole()
}

fn standard_window_subrole(attrs: &WindowAttributes) -> bool {
    attrs.has_subrole(AX_STANDARD_WINDOW_SUBROLE)
}

fn nonempty_title(attrs: &WindowAttributes) -> bool {
    attrs.has_nonempty_title()
}

fn window_role(attrs: &WindowAttributes) -> bool {
    attrs.has_role(AX_WINDOW_ROLE)
}

fn floating_subrole(attrs: &WindowAttributes) -> bool {
    attrs.has_subrole(AX_FLOATING_WINDOW_SUBROLE)
}

fn document_subrole(attrs: &WindowAttributes) -> bool {
    attrs.has_subrole(AX_DOCUMENT_WINDOW_SUBROLE)
}

fn wine_window(attrs: &WindowAttributes) -> bool {
    attrs.has_role(AX_WINDOW_ROLE)
        && attrs.has_subrole(AX_UNKNOWN_SUBROLE)
        && attrs.is_on_level(WindowLevel::NORMAL)
}

fn floating_standard_window(attrs: &WindowAttributes) -> bool {
    attrs.is_on_level(WindowLevel::FLOATING)
        && attrs.has_role(AX_WINDOW_ROLE)
        && attrs.has_subrole(AX_STANDARD_WINDOW_SUBROLE)
}

fn titled_with_role(attrs: &WindowAttributes) -> bool {
    attrs.has_nonempty_title() && attrs.role().is_some()
}

fn firefox_window(attrs: &WindowAttributes) -> bool {
    attrs.has_role(AX_WINDOW_ROLE)
        && attrs
            .size()
            .is_some_and(|size| size.height > FIREFOX_MIN_HEIGHT)
}

fn android_emulator_title(attrs: &WindowAttributes) -> bool {
    attrs
        .title()
        .is_some_and(|title| title.contains("Android Emulator"))
}

fn standard_window_or_titled(attrs: &WindowAttributes) -> bool {
    attrs.has_subrole(AX_STANDARD_WINDOW_SUBROLE) || attrs.has_nonempty_title()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rule_names_are_unique() {
        let names: HashSet<&str> = DEFAULT_RULES.iter().map(|rule| rule.name).collect();
        assert_eq!(names.len(), DEFAULT_RULES.len());
    }

    #[test]
    fn test_every_rule_documents_its_symptom() {
        assert!(DEFAULT_RULES.iter().all(|rule| !rule.symptom.is_empty()));
    }

    #[test]
    fn test_table_covers_all_kinds() {
        for kind in [
            RuleKind::AlwaysAllow,
            RuleKind::AllowOnNormalLevel,
            RuleKind::RequireOnNormalLevel,
        ] {
            assert!(DEFAULT_RULES.iter().any(|rule| rule.kind == kind));
        }
    }

    #[test]
    fn test_titled_with_role_needs_both() {
        let absent = WindowAttributes::new().with_role(AX_WINDOW_ROLE);
        assert!(!titled_with_role(&absent));
        assert!(!titled_with_role(&absent.clone().with_title("")));
        assert!(titled_with_role(&absent.with_title("Library")));
        assert!(!titled_with_role(&WindowAttributes::new().with_title("Library")));
    }
}
