pub mod vehicle_service;
pub mod vehicle_service_impl;
pub use vehicle_service::{VehicleError, VehicleService};
pub use vehicle_service_impl::SeaOrmVehicleService;

pub mod lead_service;
pub mod lead_service_impl;
pub use lead_service::{LeadError, LeadService};
pub use lead_service_impl::SeaOrmLeadService;

pub mod testimonial_service;
pub mod testimonial_service_impl;
pub use testimonial_service::{TestimonialError, TestimonialService};
pub use testimonial_service_impl::SeaOrmTestimonialService;

pub mod settings_service;
pub mod settings_service_impl;
pub use settings_service::{SettingsError, SettingsService};
pub use settings_service_impl::SeaOrmSettingsService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService};
pub use auth_service_impl::SeaOrmAuthService;

pub mod upload;
pub use upload::{SignedUpload, UploadError, UploadService};

pub mod rate_limit;
pub use rate_limit::{Bucket, RateLimitService};

pub mod housekeeping;
pub use housekeeping::{Housekeeping, HousekeepingReport};
