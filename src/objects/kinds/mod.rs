//! Concrete object kinds
//!
//! One module per kind: the payload struct, its property table, and its
//! checked-downcast registration. Kind structs hold plain data; invariants
//! that span more than one object live in [`crate::world`].

pub(crate) mod area;
pub(crate) mod character;
pub(crate) mod event;
pub(crate) mod exit;
pub(crate) mod item;
pub(crate) mod player;
pub(crate) mod room;

pub use area::Area;
pub use character::Character;
pub use event::GameEvent;
pub use exit::Exit;
pub use item::Item;
pub use player::Player;
pub use room::Room;
