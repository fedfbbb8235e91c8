#![no_main]

use libfuzzer_sys::fuzz_target;
use math_tuples::{Inclusion, MathTuples, NodeKind, Thresholds, TupleConfig, Window};

fuzz_target!(|data: &str| {
    // Every tuple kind, unbounded, so that all extraction paths are reached.
    let mut thresholds = Thresholds::none();
    for kind in NodeKind::ALL {
        thresholds.set(kind, Inclusion::Unlimited);
    }
    let converter = MathTuples::new(TupleConfig {
        window: Window::Unbounded,
        thresholds,
        synonyms: true,
        ..Default::default()
    });
    // Errors are fine; panics are not.
    let _ = converter.convert_mathml(data);
});
