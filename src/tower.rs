pub mod controller;


pub use controller::TrafficController;
