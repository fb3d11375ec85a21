pub mod errors;
pub mod pagination;

pub mod auth;
pub mod mailer;
pub mod uploads;

pub mod application_service;
pub mod company_service;
pub mod forum_service;
pub mod post_service;
pub mod report_service;
pub mod stats_service;

#[cfg(test)]
mod test_support;
