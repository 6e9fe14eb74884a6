pub mod prelude;

pub mod leads;
pub mod login_tokens;
pub mod site_settings;
pub mod testimonials;
pub mod users;
pub mod vehicles;
