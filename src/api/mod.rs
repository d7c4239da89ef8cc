pub mod client;
pub mod contract;
pub mod toast;

#[cfg(test)]
pub(crate) mod testing;
