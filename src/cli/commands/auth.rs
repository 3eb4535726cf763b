//! Account commands: registration, login and session inspection.

use crate::cli::core::{usage, CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::prompts;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "register",
            "Create a new account",
            "register \"<full name>\" <email> [password]",
            cmd_register,
        ),
        CommandEntry::new(
            "login",
            "Sign in and start a session",
            "login <email> [password]",
            cmd_login,
        ),
        CommandEntry::new("logout", "End the current session", "logout", cmd_logout),
        CommandEntry::new(
            "whoami",
            "Show the signed-in account",
            "whoami",
            cmd_whoami,
        ),
    ]
}

fn cmd_register(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 2 {
        return Err(usage("register \"<full name>\" <email> [password]"));
    }
    let password = password_arg(context, args.get(2).copied(), true)?;
    let user = context.api.register(args[0], args[1], &password)?;
    output::success(format!(
        "Account created for {}. Use `login {}` to sign in.",
        user.full_name, user.email
    ));
    Ok(())
}

fn cmd_login(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let email = args.first().ok_or_else(|| usage("login <email> [password]"))?;
    let password = password_arg(context, args.get(1).copied(), false)?;
    let user = context.api.login(email, &password)?;
    output::success(format!("Welcome back, {}.", user.full_name));
    Ok(())
}

fn cmd_logout(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.api.logout()? {
        output::success("Signed out.");
    } else {
        output::info("No active session.");
    }
    Ok(())
}

fn cmd_whoami(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let user = context.api.current_user()?;
    let session = context.api.session()?;
    output::section("Account");
    output::info(format!("  Name           : {}", user.full_name));
    output::info(format!("  Email          : {}", user.email));
    output::info(format!(
        "  Member since   : {}",
        user.created_at.format("%Y-%m-%d")
    ));
    if let Some(session) = session {
        output::info(format!(
            "  Session expires: {}",
            session.expires_at.format("%Y-%m-%d %H:%M UTC")
        ));
    }
    Ok(())
}

/// Uses the supplied password or asks for one when the shell is interactive.
fn password_arg(
    context: &ShellContext,
    supplied: Option<&str>,
    confirm: bool,
) -> Result<String, CommandError> {
    match supplied {
        Some(password) => Ok(password.to_string()),
        None if context.can_prompt() => prompts::password(&context.theme, "Password", confirm),
        None => Err(CommandError::InvalidArguments(
            "a password argument is required in script mode".into(),
        )),
    }
}
