pub mod configurations;
pub mod emails;
pub mod health_check;
pub mod sites;

pub use configurations::{
    create_configuration, delete_configuration, get_configuration, list_configurations,
    update_configuration,
};
pub use emails::{send_batch, send_email};
pub use health_check::health_check;
pub use sites::{delete_site, list_sites, register_site};
