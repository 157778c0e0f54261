// Recorded requests over clients * requests_per_minute, None with no clients
pub fn load_ratio<I>(history_lengths: I, requests_per_minute: u32) -> Option<f64>
where
    I: IntoIterator<Item = usize>,
{
    let (clients, total) = history_lengths
        .into_iter()
        .fold((0usize, 0usize), |(clients, total), len| (clients + 1, total + len));

    let capacity = clients as f64 * f64::from(requests_per_minute);
    if capacity > 0.0 {
        Some(total as f64 / capacity)
    } else {
        None
    }
}

pub fn exceeds_threshold(ratio: f64, threshold: f64) -> bool {
    ratio >= threshold
}
