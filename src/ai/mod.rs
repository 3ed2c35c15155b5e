mod veracity;

#[cfg(test)]
pub(crate) use veracity::testing;
pub use veracity::{ModelHandle, RemoteClassifier};
