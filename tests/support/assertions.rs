use trademem::domain::QueryResult;

pub fn assert_f64_near(actual: f64, expected: f64, tolerance: f64) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "expected {} ± {}, got {}",
        expected,
        tolerance,
        actual
    );
}

/// Keys of the results, in order.
pub fn result_keys(results: &[QueryResult]) -> Vec<String> {
    results
        .iter()
        .filter_map(|result| result.key().map(str::to_string))
        .collect()
}
