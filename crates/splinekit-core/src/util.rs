//! Small numeric utilities shared by the evaluation routines.

/// Binomial coefficient C(n, k), computed multiplicatively.
///
/// Returns 0 when `k > n`. Exact for every pair that a derivative
/// elimination loop can request (derivative orders are small).
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut c: u64 = 1;
    for i in 0..k {
        c = c * (n - i) as u64 / (i + 1) as u64;
    }
    c
}

/// Rows `0..=n` of Pascal's triangle: `table[n][k] == binomial(n, k)`.
///
/// The derivative elimination recursions request the same small set of
/// coefficients repeatedly, so callers build this once per evaluation.
pub fn binomial_table(n: usize) -> Vec<Vec<u64>> {
    let mut table = Vec::with_capacity(n + 1);
    table.push(vec![1]);
    for i in 1..=n {
        let prev: &Vec<u64> = &table[i - 1];
        let mut row = Vec::with_capacity(i + 1);
        row.push(1);
        for k in 1..i {
            row.push(prev[k - 1] + prev[k]);
        }
        row.push(1);
        table.push(row);
    }
    table
}
