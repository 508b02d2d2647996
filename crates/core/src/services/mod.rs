//! Business logic services.

pub mod auth;
pub mod class;
pub mod person;
pub mod quote;
pub mod user;

pub use auth::{AuthService, LoginInput, RegisterInput};
pub use class::ClassService;
pub use person::PersonService;
pub use quote::{CreateQuoteInput, EditQuoteInput, QuoteSearchInput, QuoteService};
pub use user::{SelfEditInput, UserService};
