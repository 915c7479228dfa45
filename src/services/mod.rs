pub mod allocation;
pub mod catalog;
pub mod forecast;
pub mod openweathermap;
pub mod scheduler;
pub mod suitability;
pub mod window;
