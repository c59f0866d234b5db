//! Process lifecycle: signals and cooperative quit

mod quit;
mod shutdown;

pub use quit::QuitFlag;
pub use shutdown::ShutdownSignal;
