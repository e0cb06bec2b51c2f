use std::fmt;

/// A table was asked to pack more records than its block declares.
///
/// Records are never dropped silently; the builder refuses and leaves the
/// buffer empty.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TableError {
    TooManyMaterials { count: usize, capacity: usize },
    TooManyLights { count: usize, capacity: usize },
    TooManyInstances { count: usize, capacity: usize },
    MaterialOutOfRange { id: u32, capacity: usize },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyMaterials { count, capacity } => {
                write!(f, "material table overflow: {count} materials, capacity {capacity}")
            }
            Self::TooManyLights { count, capacity } => {
                write!(f, "light table overflow: {count} lights, capacity {capacity}")
            }
            Self::TooManyInstances { count, capacity } => {
                write!(f, "instance table overflow: {count} instances, capacity {capacity}")
            }
            Self::MaterialOutOfRange { id, capacity } => {
                write!(f, "material id {id} out of range (capacity {capacity})")
            }
        }
    }
}

impl std::error::Error for TableError {}
