pub mod question;
pub mod quiz;
