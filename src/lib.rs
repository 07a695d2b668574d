pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod highlight;
pub mod logging;
pub mod model;
pub mod rate;
pub mod search;
pub mod session;
pub mod table;
pub mod validate;
pub mod weight;
