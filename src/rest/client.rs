//! Exit-code contract for the external command-line client (§6 "CLI (thin;
//! external)"): the CLI itself composes JSON and POSTs it to the endpoints in
//! [`crate::rest::endpoints`], but is out of scope for this crate. What isn't out of
//! scope is the contract those exit codes form with whatever composes that CLI, so
//! it's kept here as a stable target. Grounded on spec.md §6's literal exit-code
//! table.

/// Exit codes `dvmcmd`-style clients are expected to return.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    BadAuth = 95,
    Timeout = 96,
    BadResponse = 97,
    Socket = 98,
    Internal = 100,
    MissingPassword = 403,
    MissingAddress = 404,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_exit_codes_match_contract() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::BadAuth.code(), 95);
        assert_eq!(ExitCode::Timeout.code(), 96);
        assert_eq!(ExitCode::BadResponse.code(), 97);
        assert_eq!(ExitCode::Socket.code(), 98);
        assert_eq!(ExitCode::Internal.code(), 100);
        assert_eq!(ExitCode::MissingPassword.code(), 403);
        assert_eq!(ExitCode::MissingAddress.code(), 404);
    }
}
