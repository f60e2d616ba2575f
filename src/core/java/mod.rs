pub mod runtime;

pub use runtime::{check_java_for_minecraft, resolve_java_binary};
