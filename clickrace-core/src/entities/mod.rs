//! Database entities and the query structs operating on them.

pub mod players;
