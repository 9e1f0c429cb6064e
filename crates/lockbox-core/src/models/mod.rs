mod entity;
mod enums;
mod structs;

pub use entity::Entity;
pub use enums::{DeletedItemKind, EnumParseError};
pub use structs::{DeletedItem, Item, ItemContent, Tag, VaultBackup};
