// Services module - Business logic

pub mod admission;
pub mod mailer;
pub mod payments;
pub mod ticket_allocator;
pub mod ticket_issuer;
pub mod winner_selector;
