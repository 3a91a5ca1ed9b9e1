//! Endpoint facades: one method per vendor operation.
//!
//! Each facade borrows the `ApiClient`, posts one request type to one path
//! and relabels vendor errors with the facade's `Endpoint`, so
//! `ApiError::BadRequest` never escapes a facade.

mod auth;
mod calculations;
mod marking;
mod orders;
mod printing;

pub use auth::Auth;
pub use calculations::Calculations;
pub use marking::Marking;
pub use orders::Orders;
pub use printing::Printing;

pub const AUTH_PATH: &str = "/auth/login";
pub const CALCULATE_PATH: &str = "/calculator/calculate";
pub const ORDER_CREATE_PATH: &str = "/orders/create";
pub const ORDER_CANCEL_PATH: &str = "/orders/cancel";
pub const ORDER_SEARCH_PATH: &str = "/orders/search";
pub const ORDER_HISTORY_PATH: &str = "/orders/history";
pub const MARKING_PATH: &str = "/marking/cargo";
pub const PRINT_PATH: &str = "/print/labels";
