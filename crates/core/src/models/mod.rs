pub mod currency;
pub mod investment;
pub mod preset;
pub mod price;
pub mod projection;
pub mod settings;
