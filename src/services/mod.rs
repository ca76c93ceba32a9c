pub mod attempt_service;
pub mod branch_service;
pub mod grading_service;
pub mod paging_service;
pub mod selection_service;
pub mod session_service;
pub mod validation_service;
