//! Screen rendering modules

pub mod configure;
pub mod install;
pub mod main_menu;
pub mod test;
pub mod uninstall;
