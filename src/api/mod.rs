// API module - HTTP endpoints

pub mod events;
pub mod health;
pub mod middleware;
pub mod orders;
pub mod raffles;
pub mod rsvps;
pub mod submissions;
