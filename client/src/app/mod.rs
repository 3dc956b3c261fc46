pub mod bootstrap;
pub mod plugins;
