#![no_main]

use chatops_slack::{parse_slack_event, SlackEvent};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    match parse_slack_event(data) {
        Ok(SlackEvent::WorkflowStep(command)) => {
            assert!(command.origin().is_automation());
            assert!(!command.parameters().is_empty());
        }
        Ok(SlackEvent::UrlVerification { .. }) => {}
        Err(error) => assert!(!error.to_string().trim().is_empty()),
    }
});
