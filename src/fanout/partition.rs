/// Splits `total` requests across `workers` shares.
///
/// Every worker but the last gets `min(ceil(total / workers), remaining)`;
/// the last gets whatever is left. Shares always sum to `total`, and trailing
/// workers get `0` once the total is exhausted.
pub fn partition(total: usize, workers: usize) -> Vec<usize> {
    let workers = workers.max(1);
    let base = total.div_ceil(workers);

    (0..workers)
        .map(|index| {
            let remaining = total.saturating_sub(base.saturating_mul(index));
            if index == workers - 1 {
                remaining
            } else {
                base.min(remaining)
            }
        })
        .collect()
}
