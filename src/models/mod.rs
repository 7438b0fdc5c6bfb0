pub mod actor;
pub mod day_summary;
pub mod device_type;
pub mod event;
pub mod event_type;
pub mod override_record;
