pub mod delete;
pub mod list;
pub mod read;
pub mod version;
pub mod write;

pub use delete::Delete;
pub use list::List;
pub use read::Read;
pub use version::Version;
pub use write::Write;
