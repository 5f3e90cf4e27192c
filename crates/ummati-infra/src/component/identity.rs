use tracing::info;
use ummati_common::settings::Settings;
use ummati_common::tags::Tags;
use ummati_common::Result;

use super::require_argument;
use crate::output::Output;
use crate::provisioner::{Provisioner, RegisteredResource};
use crate::resource::{ApplicationSpec, ResourceSpec, ServicePrincipalPasswordSpec, ServicePrincipalSpec};
use crate::secret::Secret;

/// Azure AD application and service principal a cluster runs as
#[derive(Clone, Debug)]
pub struct IdentityResource {
    /// Component name
    pub name: String,
    /// Directory application
    pub application: RegisteredResource,
    /// Service principal of the application
    pub service_principal: RegisteredResource,
    /// Client secret of the service principal
    pub password: RegisteredResource,
}

impl IdentityResource {
    /// Register the application, its service principal and a client secret
    pub fn new(
        name: &str,
        location: &str,
        settings: &dyn Settings,
        provisioner: &dyn Provisioner,
    ) -> Result<Self> {
        require_argument("name", name)?;
        require_argument("location", location)?;

        let application_name = settings.application_name()?;
        let environment = settings.environment()?;
        let tags = Tags::new(&application_name, &environment, location);

        let application = provisioner.create_or_update(ResourceSpec::Application(ApplicationSpec {
            name: format!("application-{location}-{environment}"),
            display_name: format!("{application_name}-{location}-{environment}"),
            tags: tags.clone(),
        }))?;

        let service_principal =
            provisioner.create_or_update(ResourceSpec::ServicePrincipal(ServicePrincipalSpec {
                name: format!("serviceprincipal-{location}-{environment}"),
                application_id: application.output("applicationId"),
                tags,
            }))?;

        let password = provisioner.create_or_update(ResourceSpec::ServicePrincipalPassword(
            ServicePrincipalPasswordSpec {
                name: format!("serviceprincipalpassword-{location}-{environment}"),
                service_principal_id: service_principal.output("objectId"),
                end_date: None,
            },
        ))?;

        info!(component = %name, location = %location, "registered identity");
        Ok(Self {
            name: name.to_string(),
            application,
            service_principal,
            password,
        })
    }

    /// Client id the cluster authenticates with
    pub fn client_id(&self) -> Output<String> {
        self.application.output("applicationId")
    }

    /// Client secret the cluster authenticates with
    pub fn client_secret(&self) -> Output<Secret> {
        self.password.secret_output("value")
    }
}
