pub mod document_store;
pub mod publish_service;
pub mod quiz_command;
pub mod remote_service;
pub mod sync_service;
pub mod transfer_service;
pub mod workspace_service;
