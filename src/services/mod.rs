pub mod object_store;
pub mod record_store;
pub mod submission_service;
pub mod uploader;
pub mod validator;
