pub use super::leads::Entity as Leads;
pub use super::login_tokens::Entity as LoginTokens;
pub use super::site_settings::Entity as SiteSettings;
pub use super::testimonials::Entity as Testimonials;
pub use super::users::Entity as Users;
pub use super::vehicles::Entity as Vehicles;
