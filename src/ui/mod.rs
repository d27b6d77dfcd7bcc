pub mod cards;
pub mod document;
pub mod icons;
pub mod progress;
pub mod teleprompter;

pub use progress::WorkflowUI;
