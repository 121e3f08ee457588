pub mod boundary;
pub mod config;
pub mod fetch;
pub mod join;
pub mod map;
pub mod normalize;
pub mod pipeline;
pub mod projection;
pub mod table;
