//! JSON rendering
//!
//! Categories are emitted as an array so their order survives; each row
//! keeps its own column order.

use super::ReportError;
use chrono::{DateTime, Utc};
use cloud_inventory_common::ReportBundle;

pub(super) fn render_json(
    bundle: &ReportBundle,
    written_at: DateTime<Utc>,
) -> Result<Vec<u8>, ReportError> {
    let categories: Vec<_> = bundle
        .iter()
        .map(|(label, rows)| {
            serde_json::json!({
                "category": label,
                "count": rows.len(),
                "rows": rows,
            })
        })
        .collect();

    let output = serde_json::json!({
        "written_at": written_at.to_rfc3339(),
        "total_rows": bundle.total_rows(),
        "categories": categories,
    });

    Ok(serde_json::to_vec_pretty(&output)?)
}
