//! 具体渠道实现

pub mod desktop;
pub mod stdout;

pub use desktop::DesktopChannel;
pub use stdout::StdoutChannel;
