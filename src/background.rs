use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, info_span, Instrument};
use crate::state::AppState;

/// Keeps every schedulable staff member's slot horizon materialized.
pub async fn start_slot_generator(state: Arc<AppState>) {
    info!("Starting slot generator...");

    let horizon = state.config.slot_horizon_days;
    let interval = Duration::from_secs(state.config.slot_refresh_interval_secs.max(1));

    loop {
        match state.repos.staff_directory.list_schedulable().await {
            Ok(staff) => {
                for member in staff {
                    let span = info_span!(
                        "slot_generation",
                        staff_id = %member.id,
                        business_id = %member.business_id
                    );

                    let compiler = state.slot_compiler.clone();
                    async move {
                        match compiler.generate_slots(&member.id, horizon).await {
                            Ok(report) if report.inserted > 0 => info!("Generated {} new slots", report.inserted),
                            Ok(_) => {}
                            Err(e) => error!("Slot generation failed: {}", e),
                        }
                    }
                        .instrument(span)
                        .await;
                }
            }
            Err(e) => error!("Failed to list schedulable staff: {:?}", e),
        }
        sleep(interval).await;
    }
}
