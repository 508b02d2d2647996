//! Core business logic for quotebook.
//!
//! Everything the routing layer calls lives here: the permission resolver,
//! the quote state machine, field validation, the prepared projections, and
//! the services that tie them to the repositories.

pub mod credentials;
pub mod permission;
pub mod prepare;
pub mod services;
pub mod validate;

pub use prepare::{PreparedClass, PreparedPerson, PreparedQuote, PreparedReaction, PreparedUser};
pub use services::{
    AuthService, ClassService, CreateQuoteInput, EditQuoteInput, LoginInput, PersonService,
    QuoteSearchInput, QuoteService, RegisterInput, SelfEditInput, UserService,
};
