pub mod dashboard;
pub mod equipment;
pub mod hierarchy;
pub mod incidents;
pub mod notifications;
pub mod users;
pub mod visits;
