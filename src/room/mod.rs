//! Rooms: records, registry, coordinator and views.

pub mod manager;
pub mod model;
pub mod registry;
pub mod view;
