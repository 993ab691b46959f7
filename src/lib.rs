pub mod composer;
pub mod config;
pub mod demo_roster;
pub mod export;
pub mod formation;
pub mod points;
pub mod roster;
pub mod session;
pub mod settings;
pub mod state;
pub mod store;
