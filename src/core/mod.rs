pub mod access;
pub mod aggregator;
pub mod calculator;
pub mod clock;
pub mod live;
pub mod locks;
pub mod log;
pub mod logic;
pub mod overrides;
pub mod service;
