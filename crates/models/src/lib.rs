pub mod errors;
pub mod db;
pub mod user;
pub mod user_credentials;
pub mod company_profile;
pub mod post;
pub mod application;
pub mod topic;
pub mod message;
pub mod report;
pub mod site_counter;
