pub mod requests;
pub mod service;

pub use requests::{AddMember, CreateOrganization, InviteMember, UpdateOrganization, validate_slug};
pub use service::OrganizationService;
