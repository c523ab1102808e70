pub mod contracts;
pub mod gig_tags;
pub mod gigs;
pub mod messages;
pub mod notifications;
pub mod proposals;
pub mod ratings;
pub mod service_requests;
pub mod services;
pub mod users;
