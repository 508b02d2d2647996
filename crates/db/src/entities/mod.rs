//! Database entities.

pub mod class;
pub mod person;
pub mod quote;
pub mod reaction;
pub mod user;

pub use class::Entity as Class;
pub use person::Entity as Person;
pub use quote::Entity as Quote;
pub use reaction::Entity as Reaction;
pub use user::Entity as User;
