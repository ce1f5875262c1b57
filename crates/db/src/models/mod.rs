pub mod city_page;
pub mod journal;
pub mod lead;
pub mod payment_link;
pub mod product;
pub mod project;
