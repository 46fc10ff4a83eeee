//! Command implementations.

pub mod check_schema;
pub mod extract;
pub mod history;
pub mod status;
pub mod tokens;

pub use self::check_schema::execute_check_schema;
pub use self::extract::execute_extract;
pub use self::history::execute_history;
pub use self::status::execute_status;
pub use self::tokens::execute_tokens;
