// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn recording_a_reconciliation_is_reflected_in_render() {
    let metrics = Metrics::new();
    metrics.record_reconciliation("clusterextension", "success", Duration::from_millis(50));
    metrics.record_requeue("clusterextension", "rolling_out");

    let rendered = render().expect("render succeeds");
    assert!(rendered.contains("clusterextension_io_reconciliations_total"));
    assert!(rendered.contains("clusterextension_io_requeues_total"));
}
