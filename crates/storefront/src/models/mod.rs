//! Domain models for the storefront.
//!
//! These are the entity records the repositories read and write, plus the
//! derived views the services hand to route handlers.

pub mod cart;
pub mod pearl;
pub mod session;
pub mod user;

pub use cart::{Cart, CartLine, CartLineView, CartView};
pub use pearl::{NewPearl, Pearl, PearlQuery, PearlUpdate};
pub use session::Session;
pub use user::{NewUser, PublicUser, User};
