//! Answer emission — one `NormalizedAnswer` per request.

use tracing::{debug, error};

use kgroute_core::error::RouterError;
use kgroute_core::stream::ResponseStream;
use kgroute_core::types::{NormalizedAnswer, SpeechRequest};
use kgroute_core::utils::truncate_string;

/// Wrap `spoken_text` for the request's session and device and send it.
pub async fn emit(
    request: &SpeechRequest,
    spoken_text: String,
    stream: &dyn ResponseStream,
) -> Result<(), RouterError> {
    let answer = NormalizedAnswer::for_request(request, spoken_text);
    debug!(
        session = %answer.session,
        device = %answer.device_id,
        text = %truncate_string(&answer.spoken_text, 120),
        "emitting answer"
    );

    stream.send(answer).await.map_err(|source| {
        error!(session = %request.session, error = %source, "response stream rejected answer");
        RouterError::ChannelClosed {
            session: request.session.clone(),
            source,
        }
    })
}
