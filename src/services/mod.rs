pub mod api;
pub mod catalog;
pub mod payments;
pub mod reconciler;
pub mod session;
pub mod validation;
