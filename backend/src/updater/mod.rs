use std::time::Instant;

use tracing::{debug, info, warn};

use crate::models::{BatchRequest, BatchResponse, CellUpdate, ItemOutcome};
use crate::sheets::SheetsClient;

/// Where in the spreadsheet availability flags live.
#[derive(Debug, Clone)]
pub struct SheetLayout {
    pub sheet_name: String,
    pub column: String,
}

/// Dispatches every change in the batch at once and waits for all of them
/// to settle. A failing item never cancels or affects its siblings.
///
/// Each item runs on its own detached task: if the caller is dropped
/// mid-batch, dispatched calls still run to completion.
pub async fn apply_batch(
    client: &SheetsClient,
    layout: &SheetLayout,
    batch: BatchRequest,
) -> BatchResponse {
    let start = Instant::now();
    let BatchRequest {
        changes,
        spreadsheet_id,
    } = batch;

    info!(total = changes.len(), spreadsheet_id = %spreadsheet_id, "Dispatching stock changes");

    let handles: Vec<_> = changes
        .into_iter()
        .map(|item| {
            let client = client.clone();
            let update =
                CellUpdate::for_item(&item, &spreadsheet_id, &layout.sheet_name, &layout.column);
            let product_id = item.product_id;

            let handle = tokio::spawn(async move {
                debug!(
                    product_id = item.product_id,
                    product_name = item.name.as_deref().unwrap_or(""),
                    range = %update.range,
                    value = update.value,
                    "Updating cell"
                );

                match client.update_cell(&update).await {
                    Ok(reply) => ItemOutcome::succeeded(&item, reply),
                    Err(e) => {
                        warn!(
                            product_id = item.product_id,
                            range = %update.range,
                            error = %e,
                            "Cell update failed"
                        );
                        ItemOutcome::failed(item.product_id, e.to_string())
                    }
                }
            });
            (product_id, handle)
        })
        .collect();

    // Awaiting in input order keeps `details` aligned with the request.
    let mut details = Vec::with_capacity(handles.len());
    for (product_id, handle) in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(product_id, error = %e, "Cell update task did not complete");
                ItemOutcome::failed(product_id, "update task aborted")
            }
        };
        details.push(outcome);
    }

    let response = BatchResponse::from_outcomes(details);
    info!(
        succeeded = response.success_count,
        failed = response.error_count,
        total = response.total,
        elapsed_ms = start.elapsed().as_millis(),
        "Batch finished"
    );
    response
}
