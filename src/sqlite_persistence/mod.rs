mod table;

pub use table::{Column, ForeignKey, SqlType, Table, DEFAULT_TIMESTAMP};
