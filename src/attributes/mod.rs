//! Attributes: everything the core consumes from the outside world.
//!
//! The attribute source answers single queries about remote objects and may
//! stall. The application registry answers questions about owning processes.
//! Neither performs retries; that belongs to the retry scheduler.

mod registry;
mod scripted;
mod source;
mod value;

pub use registry::{AppClass, ApplicationInfo, ApplicationRegistry, RunningState};
pub use scripted::{
    AppFixture, FixtureSet, ScriptedAttributeSource, ScriptedElement, StaticApplicationRegistry,
    WindowFixture,
};
pub use source::AttributeSource;
pub use value::{
    AttributeName, AttributeStatus, AttributeValue, ElementHandle, Point, Size, WindowLevel,
};
