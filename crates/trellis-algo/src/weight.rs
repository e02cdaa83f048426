// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared edge-weight extraction.
use trellis_core::EdgeRecord;

/// Extracts an edge's weight for an algorithm.
///
/// Lookup order: the dedicated `weight` field, then a numeric
/// `data[weight_property]`, then `default_weight`. Every algorithm in this
/// crate resolves weights through this one function so the two storage
/// forms stay interchangeable.
#[must_use]
pub fn edge_weight(edge: &EdgeRecord, weight_property: &str, default_weight: f64) -> f64 {
    if let Some(weight) = edge.weight {
        return weight;
    }
    edge.data
        .get(weight_property)
        .and_then(serde_json::Value::as_f64)
        .unwrap_or(default_weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedicated_field_wins_over_data() {
        let edge = EdgeRecord::new("link", "a", "b")
            .with_weight(2.0)
            .attr("weight", 9.0);
        assert!((edge_weight(&edge, "weight", 1.0) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn data_property_is_the_fallback() {
        let edge = EdgeRecord::new("link", "a", "b").attr("cost", 4.5);
        assert!((edge_weight(&edge, "cost", 1.0) - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn non_numeric_data_falls_through_to_the_default() {
        let edge = EdgeRecord::new("link", "a", "b").attr("weight", "heavy");
        assert!((edge_weight(&edge, "weight", 1.0) - 1.0).abs() < f64::EPSILON);
    }
}
