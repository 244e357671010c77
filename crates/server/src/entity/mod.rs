pub mod admin;
pub mod comment;
pub mod grade;
pub mod guide;
pub mod native_place;
pub mod notice;
pub mod paper;
pub mod process_status;
pub mod school_class;
pub mod student;
pub mod teacher;
