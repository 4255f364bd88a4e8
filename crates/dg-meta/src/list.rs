//! Label-indexed list blocks shared by the ephemeris and attitude readers.
//!
//! Every element child holds `label v0 v1 ... v(P-1)`. The label is a float
//! which, rounded to the nearest integer, is the one-based slot number.

use dg_xml::Element;
use tracing::trace;

use crate::{IndexPolicy, MetaError};

/// Convert an index label into a zero-based slot.
pub(crate) fn label_to_index(label: &str) -> Result<usize, MetaError> {
    let value: f64 = label
        .parse()
        .map_err(|_| MetaError::Argument(format!("Failed to parse index label: {label}")))?;
    if !value.is_finite() {
        return Err(MetaError::Argument(format!(
            "Failed to parse index label: {label}"
        )));
    }
    let one_based = (value + 0.5).floor();
    if one_based < 1.0 {
        return Err(MetaError::Argument(format!(
            "index label {label} is below the first slot"
        )));
    }
    Ok(one_based as usize - 1)
}

fn parse_entry<const P: usize>(element: &Element) -> Result<(usize, [f64; P]), MetaError> {
    let mut tokens = element.text().split_whitespace();
    let label = tokens.next().ok_or_else(|| {
        MetaError::Argument(format!("empty <{}> entry without index label", element.name()))
    })?;
    let index = label_to_index(label)?;

    let values: Vec<&str> = tokens.collect();
    if values.len() != P {
        return Err(MetaError::Argument(format!(
            "<{}> entry {label} holds {} values, expected {P}",
            element.name(),
            values.len()
        )));
    }
    let mut payload = [0.0; P];
    for (slot, token) in payload.iter_mut().zip(values) {
        *slot = token.parse().map_err(|_| {
            MetaError::Argument(format!(
                "<{}> entry {label} has malformed value {token:?}",
                element.name()
            ))
        })?;
    }
    Ok((index, payload))
}

/// Read the element children of `node` into `declared` slots of `P` scalars.
///
/// The total number of children must equal `declared` ([`MetaError::Io`]).
/// Labels outside `[0, declared)` fail with [`MetaError::Argument`]; under
/// [`IndexPolicy::Strict`] so do duplicated labels. With the count fixed and
/// every label in range, no duplicates means every slot is written.
pub(crate) fn read_labeled_list<const P: usize>(
    node: &Element,
    declared: usize,
    policy: IndexPolicy,
) -> Result<Vec<[f64; P]>, MetaError> {
    let entries = node
        .children()
        .map(parse_entry::<P>)
        .collect::<Result<Vec<_>, _>>()?;

    if entries.len() != declared {
        return Err(MetaError::Io(format!(
            "Read incorrect number of points in <{}>: found {}, declared {declared}",
            node.name(),
            entries.len()
        )));
    }

    let mut slots = vec![[0.0; P]; declared];
    let mut written = vec![false; declared];
    for (index, payload) in entries {
        if index >= declared {
            return Err(MetaError::Argument(format!(
                "index {} in <{}> exceeds declared count {declared}",
                index + 1,
                node.name()
            )));
        }
        if written[index] && policy == IndexPolicy::Strict {
            return Err(MetaError::Argument(format!(
                "index {} in <{}> appears more than once",
                index + 1,
                node.name()
            )));
        }
        slots[index] = payload;
        written[index] = true;
    }

    trace!(list = node.name(), count = declared, "read labeled list");
    Ok(slots)
}
