// Entrypoint for the CLI application.
// - Keeps `main` small: settings, client and prompter in, exit code out.

use dear_rep::api::FormClient;
use dear_rep::config::Settings;
use dear_rep::prompt::{stdin_is_interactive, LinePrompter, TerminalPrompter};
use dear_rep::telemetry::{get_subscriber, init_subscriber};
use dear_rep::ui::Session;
use std::io;

fn main() -> anyhow::Result<()> {
    init_subscriber(get_subscriber("warn", io::stderr))?;

    // Endpoint comes from `DEAR_REP_ENDPOINT` or defaults to production.
    let settings = Settings::from_env();
    let client = FormClient::new(&settings.endpoint)?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    let interactive = stdin_is_interactive();
    let mut out = io::stdout();

    let outcome = if interactive {
        Session {
            settings: &settings,
            client: &client,
            prompter: &mut TerminalPrompter,
            out: &mut out,
            interactive,
        }
        .run(&args)?
    } else {
        // Piped stdin: answer field prompts line by line.
        let mut prompter = LinePrompter::new(io::stdin().lock(), io::stdout());
        Session {
            settings: &settings,
            client: &client,
            prompter: &mut prompter,
            out: &mut out,
            interactive,
        }
        .run(&args)?
    };

    let code = outcome.exit_code();
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
