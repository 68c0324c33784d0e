//! External tools: the capability registries and the invoker that calls them.

pub mod registry;
pub mod invoker;

pub use invoker::{ToolInvoker, ToolOutcome};
pub use registry::{Capability, RegistryTool, SupportTool};
