pub mod assets;
pub mod catalogue;
pub mod dashboard;
pub mod gateway;
pub mod genai;
pub mod invoice;
pub mod leads;
pub mod payments;
pub mod seo;
pub mod studio;
