pub mod builder_dto;
pub mod remote_dto;
