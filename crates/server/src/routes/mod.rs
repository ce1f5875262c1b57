pub mod catalogue;
pub mod dashboard;
pub mod health;
pub mod journal;
pub mod leads;
pub mod payments;
pub mod products;
pub mod projects;
pub mod seo;
pub mod studio;
pub mod uploads;
