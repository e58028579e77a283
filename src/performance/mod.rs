pub mod measure;
pub mod pick_fastest;
pub mod probe;

pub use measure::measure_probe;
pub use pick_fastest::{order_fastest, pick_fastest};
pub use probe::{BlockNumberProbe, FnProbe, Probe};
