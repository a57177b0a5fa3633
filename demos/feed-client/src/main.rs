//! Minimal Fieldsync client: connects to a challenge server, registers,
//! joins, and prints the activity feed as it arrives.
//!
//! ```text
//! feed-client [ws-url] [device-id] [challenge-guid]
//! ```

use fieldsync::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://127.0.0.1:9000/feed".into());
    let device_id = DeviceId::new(
        std::env::args()
            .nth(2)
            .unwrap_or_else(|| "demo-device".into()),
    );
    let challenge_id = match std::env::args().nth(3) {
        Some(raw) => ChallengeId(raw.parse::<uuid::Uuid>()?),
        None => ChallengeId::random(),
    };

    eprintln!("connecting to {url} as {device_id} for {challenge_id}");

    let transport = WebSocketTransport::new(url.as_str());
    let (controller, mut notifications) = SessionController::new(
        transport,
        SessionConfig::with_username("demo"),
    );

    controller.connect().await?;
    controller.register(device_id.clone(), challenge_id).await?;
    controller.join(challenge_id).await?;

    while let Some(notification) = notifications.recv().await {
        match notification {
            Notification::TimelineEntryReceived(entry) => {
                println!("[timeline] {}: {}", entry.username, entry.text);
            }
            Notification::MapObjectsChanged => {
                println!(
                    "[map] {} objects visible",
                    controller.map_objects().len()
                );
            }
            Notification::PlayerPositionsChanged => {
                for (name, pos) in controller.player_positions() {
                    println!(
                        "[pos] {name} @ {:.5},{:.5}",
                        pos.latitude, pos.longitude
                    );
                }
            }
            Notification::InvitationReceived { from, .. } => {
                println!("[invite] from {from}");
            }
            Notification::JoinAccepted { challenge_id } => {
                println!("[join] accepted into {challenge_id}");
            }
            Notification::JoinRejected {
                challenge_id,
                reason,
            } => {
                println!("[join] rejected from {challenge_id}: {reason}");
                break;
            }
            Notification::Reconnecting => {
                println!("[link] reconnecting...");
            }
            Notification::Reconnected => {
                // Registration does not survive the new link.
                println!("[link] reconnected, re-establishing context");
                controller.register(device_id.clone(), challenge_id).await?;
                controller.join(challenge_id).await?;
            }
            Notification::TransportError { detail } => {
                eprintln!("[link] fault: {detail}");
            }
            Notification::Closed { reason } => {
                println!("[link] closed: {reason}");
                break;
            }
        }
    }

    controller.deregister_and_disconnect().await?;
    Ok(())
}
