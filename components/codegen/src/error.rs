//! Codegen error helpers

use core_types::{ErrorKind, LuaError};

/// A short name was assigned twice or shadows a reserved name
pub fn rename_collision(message: impl Into<String>) -> LuaError {
    LuaError::new(ErrorKind::RenameCollision, message)
}
