pub mod fakes;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use fakes::{FakeProvider, RecordingNotifier};
#[allow(unused_imports)]
pub use setup::{codes, TestApp, TestAppBuilder};
