pub mod bulk_load;
pub mod health;
pub mod jobs;
pub mod learning_standards;
