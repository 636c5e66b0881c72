pub mod docs;
pub mod intern;
pub mod primary;
pub mod secondary;
