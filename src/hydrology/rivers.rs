//! River extraction from flow accumulation.

/// Picks the accumulation threshold at the given percentile of the land
/// distribution, so rivers stay visually meaningful at any grid size.
pub fn river_threshold(flow_accum: &[f32], ocean_mask: &[bool], percentile: f32) -> f32 {
    let mut land: Vec<f32> = flow_accum
        .iter()
        .zip(ocean_mask.iter())
        .filter(|(_, &ocean)| !ocean)
        .map(|(&a, _)| a)
        .collect();

    if land.is_empty() {
        return f32::INFINITY;
    }

    land.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let idx = ((land.len() as f32 * percentile) as usize).min(land.len() - 1);
    land[idx]
}

/// Marks land cells whose accumulation meets the threshold as rivers.
pub fn river_mask(flow_accum: &[f32], ocean_mask: &[bool], threshold: f32) -> Vec<bool> {
    flow_accum
        .iter()
        .zip(ocean_mask.iter())
        .map(|(&a, &ocean)| !ocean && a >= threshold)
        .collect()
}

/// Sanity helper used by invariant checks: rivers must sit on land and
/// carry at least the threshold flow.
pub fn rivers_are_consistent(
    river_mask: &[bool],
    flow_accum: &[f32],
    ocean_mask: &[bool],
    threshold: f32,
) -> bool {
    river_mask
        .iter()
        .enumerate()
        .all(|(idx, &river)| !river || (!ocean_mask[idx] && flow_accum[idx] >= threshold))
}
