#![no_main]

use chatops_domain::{Actor, CommandOrigin, CommandType, PLATFORM_SLACK};
use chatops_slack::{parse_command_text, CommandParseError};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let token_count = raw.split_whitespace().count();
    let parsed = parse_command_text(
        &raw,
        Actor::new("fuzz-user", PLATFORM_SLACK),
        CommandOrigin::channel(PLATFORM_SLACK, "fuzz-channel"),
    );

    match parsed {
        Ok(command) => {
            assert!(token_count >= 2);
            assert!(!command.parameters().is_empty());
            assert!(matches!(
                command.command_type(),
                CommandType::ManageRepository | CommandType::VerifyRepository
            ));
        }
        Err(CommandParseError::Format(got)) => assert_eq!(got, token_count),
        Err(error) => assert!(!error.to_string().trim().is_empty()),
    }
});
