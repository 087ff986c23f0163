use crate::domain::backend::service::EmailBackend;
use crate::domain::dispatch::ports::DispatchService;
use crate::domain::email_configuration::ports::ConfigurationService;
use std::sync::Arc;

#[derive(Debug)]
pub struct DispatchState<DS: DispatchService> {
    dispatch_service: Arc<DS>,
    backend: EmailBackend<DS>,
}

#[derive(Debug)]
pub struct SharedDispatchState<DS: DispatchService>(Arc<DispatchState<DS>>);

impl<DS: DispatchService> Clone for SharedDispatchState<DS> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<DS: DispatchService> SharedDispatchState<DS> {
    pub fn new(dispatch_service: Arc<DS>) -> Self {
        let backend = EmailBackend::new(Arc::clone(&dispatch_service));
        Self(Arc::new(DispatchState {
            dispatch_service,
            backend,
        }))
    }

    pub fn dispatch_service(&self) -> &DS {
        &self.0.dispatch_service
    }

    pub fn backend(&self) -> &EmailBackend<DS> {
        &self.0.backend
    }
}

pub struct ConfigurationState<CS: ConfigurationService> {
    configuration_service: Arc<CS>,
}

pub struct SharedConfigurationState<CS: ConfigurationService>(Arc<ConfigurationState<CS>>);

impl<CS: ConfigurationService> Clone for SharedConfigurationState<CS> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<CS: ConfigurationService> SharedConfigurationState<CS> {
    pub fn new(configuration_service: Arc<CS>) -> Self {
        Self(Arc::new(ConfigurationState {
            configuration_service,
        }))
    }

    pub fn configuration_service(&self) -> &CS {
        &self.0.configuration_service
    }
}
