pub mod executable;
pub mod launch;
pub mod session;

pub use executable::{ExecutableResolver, LaunchEnvironment, ResolvedExecutable};
pub use session::BrowserSession;
