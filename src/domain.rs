pub mod backend;
pub mod dispatch;
pub mod email_configuration;
pub mod site;
