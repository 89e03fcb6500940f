pub mod config;
pub mod dashboard;
pub mod data;
pub mod monitoring;
pub mod wallet;

#[cfg(test)]
mod test_support;
