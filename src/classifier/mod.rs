//! WindowClassifier: decides whether an attribute snapshot is a real,
//! user-facing top-level window.
//!
//! Pure and deterministic: no I/O, no hidden state. Everything the rules need,
//! including registry lookups, is resolved into the snapshot beforehand.

mod classify;
mod quirks;
mod rules;
mod snapshot;

pub use classify::{is_actual_window, Acceptance, Classifier, Rejection, Verdict, MIN_WINDOW_DIMENSION};
pub use quirks::DEFAULT_RULES;
pub use rules::{AppMatcher, ClassificationRule, RuleKind};
pub use snapshot::{
    OwnerApp, WindowAttributes, AX_DIALOG_SUBROLE, AX_DOCUMENT_WINDOW_SUBROLE,
    AX_FLOATING_WINDOW_SUBROLE, AX_STANDARD_WINDOW_SUBROLE, AX_UNKNOWN_SUBROLE, AX_WINDOW_ROLE,
    STANDARD_SUBROLES,
};
