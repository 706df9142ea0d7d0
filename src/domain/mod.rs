pub mod user;

pub use user::{NewUser, StoreError, User, UserStore};
