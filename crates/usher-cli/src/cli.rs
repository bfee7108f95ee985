//! CLI definition and pipeline invocation.

use std::convert::Infallible;

use clap::Parser;

use usher_common::error::Result;
use usher_core::store::EtcStore;

/// Usher — container entrypoint identity provisioner.
///
/// Reads `LOCAL_USER_ID`, `LOCAL_GROUP_ID`, `LOCAL_USER_NAME`, and
/// `LOCAL_GROUP_NAME` from the environment, ensures that identity exists in
/// the container's passwd/group databases, then execs COMMAND as that user.
#[derive(Parser, Debug)]
#[command(name = usher_common::constants::BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Workload command and arguments, passed through verbatim.
    #[arg(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        required = true,
        value_name = "COMMAND"
    )]
    pub command: Vec<String>,
}

/// Runs the provisioning pipeline against the container's own `/etc`.
///
/// # Errors
///
/// Returns the failing stage's error; on success control has already
/// transferred to the workload.
pub fn execute(cli: &Cli) -> Result<Infallible> {
    let mut store = EtcStore::system();
    usher_core::entry::run(&mut store, std::env::vars(), &cli.command)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use clap::Parser;

    use super::*;

    #[test]
    fn workload_argv_is_captured_verbatim() {
        let cli = Cli::try_parse_from(["ushr", "my-app", "--port", "8080"])
            .expect("should parse");
        assert_eq!(cli.command, vec!["my-app", "--port", "8080"]);
    }

    #[test]
    fn hyphenated_first_argument_belongs_to_the_workload() {
        let cli = Cli::try_parse_from(["ushr", "sh", "-c", "id -u"]).expect("should parse");
        assert_eq!(cli.command, vec!["sh", "-c", "id -u"]);
    }

    #[test]
    fn missing_command_is_a_usage_error() {
        assert!(Cli::try_parse_from(["ushr"]).is_err());
    }
}
