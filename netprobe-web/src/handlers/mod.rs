pub mod dns;
pub mod health;
pub mod ip;
pub mod port_scan;
