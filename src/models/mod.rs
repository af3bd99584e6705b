pub mod booking;
pub mod payment;
pub mod session;
pub mod user;
pub mod validation;

pub use booking::{BookingForm, BookingRequest, BookingSurface};
pub use payment::{PaymentRecord, PaymentStatus, PaymentView};
pub use session::{RememberedSession, SessionData, SessionToken};
pub use user::User;
pub use validation::{ErrorCode, Field, FieldError, ValidationResult};
