pub mod forge;

pub use forge::{detect_server_entry, ForgeContext, ForgeInstall, ForgeInstaller, ServerEntry};
