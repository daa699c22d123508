pub mod classifier;
pub mod gpo_identity;
pub mod memory_registry;
pub mod policy_manager;
pub mod registry;
pub mod settings_walker;
#[cfg(windows)]
pub mod windows_registry;

pub use classifier::*;
pub use gpo_identity::*;
pub use memory_registry::*;
pub use policy_manager::*;
pub use registry::*;
pub use settings_walker::*;
#[cfg(windows)]
pub use windows_registry::*;

/// Registry store used outside of tests
#[cfg(windows)]
pub type SystemRegistry = WindowsRegistry;

/// Non-Windows fallback - an empty, process-local store
#[cfg(not(windows))]
pub type SystemRegistry = MemoryRegistry;
