pub mod context;
pub mod curse;
pub mod installer;
pub mod server_zip;

pub use context::PackContext;
pub use installer::{PackInfo, PackInstaller, PackType};
