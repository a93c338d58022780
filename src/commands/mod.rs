//! Command implementations for docval.
//!
//! This module resolves the configuration, sets up logging, and routes CLI
//! commands to their implementations.

mod health;
mod output;
mod rules;
mod session;
mod validate;

use crate::cli::{Cli, Command, OutputFormat, SessionAction};
use crate::config::Config;
use crate::error::Result;
use crate::logging;
use tracing::debug;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: Config,
    pub format: OutputFormat,
}

/// Run a parsed command line.
///
/// This is the main entry point for command execution: it loads the config,
/// initializes logging, and dispatches the command.
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::resolve(cli.config.as_deref())?;
    logging::init(cli.verbose, config.debug);
    debug!(environment = %config.environment, session_dir = %config.session_dir, "resolved config");

    let ctx = CommandContext {
        config,
        format: cli.format,
    };
    dispatch(&ctx, cli.command)
}

/// Dispatch a command to its implementation.
pub fn dispatch(ctx: &CommandContext, command: Command) -> Result<()> {
    match command {
        Command::Validate(args) => validate::cmd_validate(ctx, args),
        Command::Rules(args) => rules::cmd_rules(ctx, args),
        Command::Session(session_cmd) => dispatch_session(ctx, session_cmd.action),
        Command::Health => health::cmd_health(ctx),
    }
}

/// Dispatch session subcommands.
fn dispatch_session(ctx: &CommandContext, action: SessionAction) -> Result<()> {
    match action {
        SessionAction::Add(args) => session::cmd_session_add(ctx, args),
        SessionAction::List => session::cmd_session_list(ctx),
        SessionAction::Remove(args) => session::cmd_session_remove(ctx, args),
        SessionAction::Validate(args) => session::cmd_session_validate(ctx, args),
        SessionAction::Report => session::cmd_session_report(ctx),
        SessionAction::Log => session::cmd_session_log(ctx),
        SessionAction::Clear(args) => session::cmd_session_clear(ctx, args),
        SessionAction::Unlock(args) => session::cmd_session_unlock(ctx, args),
    }
}
