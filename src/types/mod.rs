pub mod pagination;
pub mod question;
pub mod quiz;
