pub mod coarse;
pub mod fine;
pub mod oracle;
pub mod peaks;
