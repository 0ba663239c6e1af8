// Service Catalog - in-memory registry of services

use std::sync::Arc;

use tracing::info;

use crate::domain::{Service, ServiceDraft};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, ServiceInfo, ServiceRegistry};

/// Services in creation order
pub struct ServiceCatalog {
    services: Vec<Service>,
    id_provider: Arc<dyn IdProvider>,
}

impl ServiceCatalog {
    pub fn new(id_provider: Arc<dyn IdProvider>) -> Self {
        Self {
            services: Vec::new(),
            id_provider,
        }
    }

    /// Validate and add a new (open) service
    pub fn create(&mut self, draft: &ServiceDraft) -> Result<Service> {
        let fields = draft.validate()?;
        let service = Service::from_fields(self.id_provider.generate_id(), fields);

        info!(service_id = %service.id, name = %service.name, "Service created");
        self.services.push(service.clone());
        Ok(service)
    }

    /// Validate and add a service under a caller-chosen id (seeding)
    pub fn register(
        &mut self,
        service_id: impl Into<String>,
        draft: &ServiceDraft,
    ) -> Result<Service> {
        let service_id = service_id.into();
        if self.get(&service_id).is_some() {
            return Err(AppError::Conflict(format!(
                "Service {} already exists",
                service_id
            )));
        }
        let service = Service::from_fields(service_id, draft.validate()?);

        info!(service_id = %service.id, name = %service.name, "Service registered");
        self.services.push(service.clone());
        Ok(service)
    }

    /// Replace editable fields; id and open state are kept
    pub fn update(&mut self, service_id: &str, draft: &ServiceDraft) -> Result<Service> {
        let fields = draft.validate()?;
        let service = self.get_mut(service_id)?;
        service.apply(fields);

        info!(service_id = %service_id, "Service updated");
        Ok(service.clone())
    }

    pub fn remove(&mut self, service_id: &str) -> Result<Service> {
        let index = self
            .services
            .iter()
            .position(|s| s.id == service_id)
            .ok_or_else(|| not_found(service_id))?;

        info!(service_id = %service_id, "Service removed");
        Ok(self.services.remove(index))
    }

    pub fn set_open(&mut self, service_id: &str, is_open: bool) -> Result<()> {
        self.get_mut(service_id)?.is_open = is_open;
        info!(service_id = %service_id, is_open, "Service availability changed");
        Ok(())
    }

    /// Flip open/closed, returning the new state
    pub fn toggle_open(&mut self, service_id: &str) -> Result<bool> {
        let is_open = !self.get_mut(service_id)?.is_open;
        self.set_open(service_id, is_open)?;
        Ok(is_open)
    }

    pub fn get(&self, service_id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == service_id)
    }

    pub fn list(&self) -> &[Service] {
        &self.services
    }

    fn get_mut(&mut self, service_id: &str) -> Result<&mut Service> {
        self.services
            .iter_mut()
            .find(|s| s.id == service_id)
            .ok_or_else(|| not_found(service_id))
    }
}

impl ServiceRegistry for ServiceCatalog {
    fn lookup(&self, service_id: &str) -> Option<ServiceInfo> {
        self.get(service_id).map(|s| ServiceInfo {
            is_open: s.is_open,
            average_duration_minutes: s.expected_duration_minutes,
        })
    }
}

fn not_found(service_id: &str) -> AppError {
    AppError::NotFound(format!("Service {}", service_id))
}
