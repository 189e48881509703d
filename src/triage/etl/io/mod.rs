pub mod csv_read;
pub mod sqlite_read;
pub mod sqlite_write;
