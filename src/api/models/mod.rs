pub mod cut;

pub use cut::{Cut, SamplePoint};
