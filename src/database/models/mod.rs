pub mod invite;
pub mod item;
pub mod shopping_list;
pub mod user;

pub use invite::{Invite, InviteRole};
pub use item::{Item, ItemChanges, NewItem};
pub use shopping_list::ShoppingList;
pub use user::{User, UserProfile};
