//! CLI command handling

pub mod createconfig;
pub mod run;
pub mod version;

pub use createconfig::*;
pub use run::*;
pub use version::*;
