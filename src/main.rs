use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match eventhub::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("EventHub failed to start: {}", e);
            eprintln!("EventHub failed to start: {}", e);
            ExitCode::FAILURE
        }
    }
}
