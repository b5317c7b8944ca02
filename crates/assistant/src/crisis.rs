//! Crisis check. Runs every turn, before any handler.

use chrono::Utc;

use mh_domain::message::Message;
use mh_domain::route::Route;
use mh_domain::state::{SessionState, StateDelta};
use mh_domain::trace::TraceEvent;

pub const CRISIS_MESSAGE: &str = "\
I notice that you might be going through something really difficult right now. Your wellbeing is important, and there are people available to talk to you right away:

- National Suicide Prevention Lifeline: 988 or 1-800-273-8255 (Available 24/7)
- Crisis Text Line: Text HOME to 741741 (Available 24/7)
- If you're in immediate danger, please call emergency services (911 in the US)

Would you like me to continue providing support alongside these resources?";

/// Surface the hotline text when the analysis demands it or the turn was
/// routed to crisis resources. No oracle call.
pub fn stage(state: &SessionState) -> StateDelta {
    let routed = state.query_route == Route::CrisisResources;
    if !state.immediate_resources_needed && !routed {
        return StateDelta::new();
    }
    TraceEvent::CrisisFlagged {
        route: state.query_route.to_string(),
    }
    .emit();
    StateDelta {
        professional_referral: Some(Utc::now()),
        ..StateDelta::new().with_message(Message::assistant(CRISIS_MESSAGE))
    }
}
