/// Insert `separator` between every adjacent pair of `items`.
///
/// Nothing is added before the first or after the last item, so zero or
/// one items come back unchanged.
pub fn interleave<T: Clone>(items: Vec<T>, separator: T) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len().saturating_mul(2));
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            out.push(separator.clone());
        }
        out.push(item);
    }
    out
}
