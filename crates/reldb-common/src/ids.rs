use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
        pub struct $name(pub u32);

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifies a table within a schema.
    TableId
);
id_type!(
    /// Identifies a column within a table, 0-based ordinal position.
    ColId
);
id_type!(
    /// Identifies an index of a table; index 0 is always the primary index when one exists.
    IndexId
);
id_type!(
    /// Identifies a constraint of a table; index 0 is the primary-key constraint when present.
    ConstraintId
);
id_type!(
    /// Identifies an identity/auto-increment sequence.
    SequenceId
);

/// A schema identifier, e.g. `PUBLIC`.
pub type SchemaId = String;
