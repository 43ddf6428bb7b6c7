// Models module - Database entity representations

pub mod artist;
pub mod event;
pub mod order;
pub mod raffle;
pub mod rsvp;
pub mod submission;
pub mod ticket;
pub mod user;

pub use artist::Artist;
pub use event::Event;
pub use order::Order;
pub use raffle::{Raffle, RaffleArtist};
pub use rsvp::Rsvp;
pub use submission::Submission;
pub use ticket::Ticket;
pub use user::User;
