//! Model references, rack positions and hostnames.

use std::collections::HashMap;

use racker_core::RackConfig;

use super::fuzzy::fuzzy_match;
use super::ValidationResult;
use crate::loader::DescriptorCatalog;

pub(super) fn validate_models(rack: &RackConfig, catalog: &DescriptorCatalog, result: &mut ValidationResult) {
    let known = catalog.model_ids();
    let candidates: Vec<&str> = known.iter().map(String::as_str).collect();

    for (i, equipment) in rack.equipment.iter().enumerate() {
        if catalog.model(&equipment.model).is_some() {
            continue;
        }
        let path = format!("equipment[{}].model", i);
        match catalog.model_error(&equipment.model) {
            Some(error) => result.error(path, error),
            None => {
                let suggestion =
                    fuzzy_match(&equipment.model, &candidates).map(|s| format!("Did you mean '{}'?", s));
                result.error_with_suggestion(path, format!("unknown model '{}'", equipment.model), suggestion);
            }
        }
    }
}

/// Units occupied by a device, as `(lowest, highest)` in the rack's own
/// numbering. Unflipped racks grow down from `topu`, flipped racks grow up.
fn occupied_units(topu: u32, rack_u: u32, flip: bool) -> (u32, u32) {
    let span = rack_u.max(1) - 1;
    if flip {
        (topu, topu.saturating_add(span))
    } else {
        (topu.saturating_sub(span), topu)
    }
}

pub(super) fn validate_positions(rack: &RackConfig, catalog: &DescriptorCatalog, result: &mut ValidationResult) {
    let height = rack.rack_height;
    let mut placed: Vec<(usize, (u32, u32))> = Vec::new();

    for (i, equipment) in rack.equipment.iter().enumerate() {
        let Some(topu) = equipment.position_topu else {
            continue;
        };
        let path = format!("equipment[{}].position_topu", i);

        if topu == 0 || topu > height {
            result.error(path, format!("position_topu {} is outside 1..={}", topu, height));
            continue;
        }
        let Some(model) = catalog.model(&equipment.model) else {
            continue;
        };

        let (low, high) = occupied_units(topu, model.rack_u, rack.flip);
        if low == 0 || high > height {
            result.error(
                path,
                format!(
                    "{}U model '{}' does not fit at position_topu {} in a {}U rack",
                    model.rack_u, equipment.model, topu, height
                ),
            );
            continue;
        }

        for &(other, (other_low, other_high)) in &placed {
            if low <= other_high && other_low <= high {
                result.warn(
                    path.clone(),
                    format!(
                        "U{}-U{} overlaps equipment[{}] ({})",
                        low,
                        high,
                        other,
                        rack.equipment[other].label()
                    ),
                );
            }
        }
        placed.push((i, (low, high)));
    }
}

pub(super) fn validate_hostnames(rack: &RackConfig, result: &mut ValidationResult) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (i, equipment) in rack.equipment.iter().enumerate() {
        let Some(hostname) = equipment.hostname.as_deref() else {
            continue;
        };
        if let Some(first) = seen.get(hostname) {
            result.warn(
                format!("equipment[{}].hostname", i),
                format!("duplicate hostname '{}' (also equipment[{}])", hostname, first),
            );
        } else {
            seen.insert(hostname, i);
        }
    }
}
